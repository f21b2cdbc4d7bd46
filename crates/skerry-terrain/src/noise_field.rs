//! Seeded 2D noise fields normalized to `[0, 1]`.
//!
//! The sampler and the height pass only ever interpolate with noise values, so
//! every source here is remapped into the unit interval.

use glam::DVec2;
use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Distance scale of the per-octave coordinate offsets.
const OCTAVE_OFFSET_RANGE: f64 = 10_000.0;

/// A deterministic, seedable 2D noise function.
pub trait NoiseSource {
    /// Sample the field at `(x, y)`. The result lies in `[0, 1]`.
    fn value(&self, x: f64, y: f64) -> f64;

    /// Reseed the field. Sampling the same point after the same seed always
    /// returns the same value.
    fn set_seed(&mut self, seed: u32);

    /// Convenience wrapper over [`NoiseSource::value`].
    fn value_at(&self, p: DVec2) -> f64 {
        self.value(p.x, p.y)
    }
}

impl<N: NoiseSource + ?Sized> NoiseSource for Box<N> {
    fn value(&self, x: f64, y: f64) -> f64 {
        (**self).value(x, y)
    }

    fn set_seed(&mut self, seed: u32) {
        (**self).set_seed(seed);
    }
}

/// Configuration for [`PerlinNoise2D`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    /// Initial seed. [`NoiseSource::set_seed`] replaces it.
    pub seed: u32,
    /// Frequency of the first octave.
    pub scale: f64,
    /// Number of octaves. Zero yields a flat field of `0.5`.
    pub octaves: u32,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// World-space offset applied before scaling.
    pub offset: DVec2,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: 0.15,
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
            offset: DVec2::ZERO,
        }
    }
}

/// Fractal Brownian motion over Perlin noise.
///
/// Every octave samples at its own seed-derived offset so octaves do not share
/// lattice points.
#[derive(Clone, Debug)]
pub struct PerlinNoise2D {
    perlin: Perlin,
    settings: NoiseSettings,
    octave_offsets: Vec<DVec2>,
}

impl PerlinNoise2D {
    pub fn new(settings: NoiseSettings) -> Self {
        let mut noise = Self {
            perlin: Perlin::new(settings.seed),
            octave_offsets: Vec::with_capacity(settings.octaves as usize),
            settings,
        };
        noise.set_seed(noise.settings.seed);
        noise
    }

    pub fn settings(&self) -> &NoiseSettings {
        &self.settings
    }
}

impl Default for PerlinNoise2D {
    fn default() -> Self {
        Self::new(NoiseSettings::default())
    }
}

impl NoiseSource for PerlinNoise2D {
    fn value(&self, x: f64, y: f64) -> f64 {
        if self.settings.octaves == 0 {
            return 0.5;
        }

        let base = DVec2::new(x, y) + self.settings.offset;
        let mut total = 0.0;
        let mut max_amplitude = 0.0;
        let mut frequency = self.settings.scale;
        let mut amplitude = 1.0;

        for offset in &self.octave_offsets {
            let p = (base + *offset) * frequency;
            total += self.perlin.get([p.x, p.y]) * amplitude;
            max_amplitude += amplitude;

            frequency *= self.settings.lacunarity;
            amplitude *= self.settings.persistence;
        }

        if max_amplitude <= 0.0 {
            return 0.5;
        }
        ((total / max_amplitude + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    fn set_seed(&mut self, seed: u32) {
        self.settings.seed = seed;
        self.perlin = Perlin::new(seed);

        let mut rng = ChaCha8Rng::seed_from_u64(u64::from(seed));
        self.octave_offsets.clear();
        self.octave_offsets.extend((0..self.settings.octaves).map(|_| {
            DVec2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0))
                * OCTAVE_OFFSET_RANGE
        }));
    }
}

/// A flat field that returns the same value everywhere.
///
/// Handy for pinning the sampler to a fixed radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantNoise(pub f64);

impl NoiseSource for ConstantNoise {
    fn value(&self, _x: f64, _y: f64) -> f64 {
        self.0.clamp(0.0, 1.0)
    }

    fn set_seed(&mut self, _seed: u32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_determinism_same_seed_same_coord() {
        let a = PerlinNoise2D::new(NoiseSettings {
            seed: 42,
            ..Default::default()
        });
        let b = PerlinNoise2D::new(NoiseSettings {
            seed: 42,
            ..Default::default()
        });
        for i in 0..50 {
            let x = i as f64 * 0.37 - 9.0;
            let y = i as f64 * -0.91 + 4.0;
            assert!((a.value(x, y) - b.value(x, y)).abs() < EPSILON);
        }
    }

    #[test]
    fn test_values_stay_in_unit_interval() {
        let noise = PerlinNoise2D::new(NoiseSettings {
            seed: 7,
            octaves: 6,
            ..Default::default()
        });
        for ix in -40..40 {
            for iy in -40..40 {
                let v = noise.value(ix as f64 * 0.73, iy as f64 * 1.19);
                assert!((0.0..=1.0).contains(&v), "value {v} out of range");
            }
        }
    }

    #[test]
    fn test_reseeding_changes_field_and_is_reproducible() {
        let mut noise = PerlinNoise2D::default();
        noise.set_seed(1);
        let first: Vec<f64> = (0..20).map(|i| noise.value(i as f64 * 1.3, 0.7)).collect();
        noise.set_seed(2);
        let second: Vec<f64> = (0..20).map(|i| noise.value(i as f64 * 1.3, 0.7)).collect();
        noise.set_seed(1);
        let again: Vec<f64> = (0..20).map(|i| noise.value(i as f64 * 1.3, 0.7)).collect();

        assert_ne!(first, second);
        assert_eq!(first, again);
        assert_eq!(noise.settings().seed, 1);
    }

    #[test]
    fn test_zero_octaves_is_flat() {
        let noise = PerlinNoise2D::new(NoiseSettings {
            octaves: 0,
            ..Default::default()
        });
        assert_eq!(noise.value(3.0, -8.0), 0.5);
        assert_eq!(noise.value(-100.0, 0.25), 0.5);
    }

    #[test]
    fn test_constant_noise_is_clamped() {
        assert_eq!(ConstantNoise(0.3).value(1.0, 2.0), 0.3);
        assert_eq!(ConstantNoise(4.0).value_at(DVec2::ZERO), 1.0);
    }
}
