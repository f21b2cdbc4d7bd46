//! Island assembly: sample the disk forest, triangulate it, lift it.

use std::time::Instant;

use glam::{DVec2, DVec3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::graph::Edge;
use crate::heights::{HeightSettings, HeightSynthesizer};
use crate::noise_field::{NoiseSettings, NoiseSource};
use crate::sampler::{PoissonDiscSampler, PoissonDiscSettings};

/// Fewest points a triangulator can be handed.
pub const MIN_TRIANGULATION_NODES: usize = 3;

/// Output of a [`Triangulator`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertices in the same order as the input points.
    pub vertices: Vec<DVec2>,
    /// Index triples into `vertices` with consistent winding.
    pub triangles: Vec<[usize; 3]>,
}

/// Converts a point set into triangle topology.
///
/// Callers guarantee at least [`MIN_TRIANGULATION_NODES`] points.
pub trait Triangulator {
    fn triangulate(&self, points: &[DVec2]) -> Result<TriangleMesh, GenerationError>;
}

/// Everything needed to generate one island.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IslandSettings {
    /// Seeds both the noise field and the sampler's random source.
    pub seed: u32,
    pub poisson: PoissonDiscSettings,
    pub heights: HeightSettings,
    /// Noise shape. Its `seed` is replaced by [`IslandSettings::seed`] on
    /// every [`IslandGenerator::generate`] call.
    pub noise: NoiseSettings,
}

impl IslandSettings {
    pub fn validate(&self) -> Result<(), GenerationError> {
        self.poisson.validate()?;
        self.heights.validate()
    }
}

/// A generated island.
///
/// Vertex `x`/`z` carry the 2D node position and `y` its height. Vertices,
/// edges and roots share node indexing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Island {
    pub vertices: Vec<DVec3>,
    pub edges: Vec<Edge>,
    pub triangles: Vec<[usize; 3]>,
    pub roots: Vec<usize>,
}

impl Island {
    /// Lowest and highest vertex heights, or `None` for an empty island.
    pub fn height_range(&self) -> Option<(f64, f64)> {
        self.vertices.iter().map(|v| v.y).fold(None, |range, h| match range {
            None => Some((h, h)),
            Some((lo, hi)) => Some((lo.min(h), hi.max(h))),
        })
    }
}

/// Drives a sampler and a triangulator to produce [`Island`]s.
pub struct IslandGenerator<N, T> {
    sampler: PoissonDiscSampler<N>,
    triangulator: T,
}

impl<N: NoiseSource, T: Triangulator> IslandGenerator<N, T> {
    pub fn new(noise: N, triangulator: T) -> Self {
        Self {
            sampler: PoissonDiscSampler::new(noise),
            triangulator,
        }
    }

    pub fn sampler(&self) -> &PoissonDiscSampler<N> {
        &self.sampler
    }

    /// Generate an island. `seed_override` replaces `settings.seed` when set.
    pub fn generate(
        &mut self,
        settings: &IslandSettings,
        seed_override: Option<u32>,
    ) -> Result<Island, GenerationError> {
        let started = Instant::now();
        let seed = seed_override.unwrap_or(settings.seed);
        let synthesizer = HeightSynthesizer::new(settings.heights.clone())?;

        self.sampler.noise_mut().set_seed(seed);
        let mut rng = ChaCha8Rng::seed_from_u64(u64::from(seed));
        self.sampler.sample_points(&settings.poisson, &mut rng)?;
        let graph = self.sampler.graph();

        if graph.len() < MIN_TRIANGULATION_NODES {
            return Err(GenerationError::InsufficientNodes { found: graph.len() });
        }

        let mesh = self.triangulator.triangulate(&graph.positions())?;
        if mesh.vertices.len() != graph.len() {
            return Err(GenerationError::Triangulation(format!(
                "triangulator returned {} vertices for {} points",
                mesh.vertices.len(),
                graph.len()
            )));
        }

        let heights = synthesizer.synthesize(graph, self.sampler.noise());
        let vertices = mesh
            .vertices
            .iter()
            .zip(&heights)
            .map(|(p, &h)| DVec3::new(p.x, h, p.y))
            .collect();

        let island = Island {
            vertices,
            edges: graph.edges().to_vec(),
            triangles: mesh.triangles,
            roots: graph.roots().to_vec(),
        };

        tracing::info!(
            seed,
            nodes = island.vertices.len(),
            triangles = island.triangles.len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "island generated"
        );
        Ok(island)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise_field::{ConstantNoise, PerlinNoise2D};
    use crate::sampler::RootPlacement;

    /// Fans every point around the first one. Enough to exercise assembly.
    struct FanTriangulator;

    impl Triangulator for FanTriangulator {
        fn triangulate(&self, points: &[DVec2]) -> Result<TriangleMesh, GenerationError> {
            Ok(TriangleMesh {
                vertices: points.to_vec(),
                triangles: (1..points.len() - 1).map(|i| [0, i, i + 1]).collect(),
            })
        }
    }

    struct FailingTriangulator;

    impl Triangulator for FailingTriangulator {
        fn triangulate(&self, _points: &[DVec2]) -> Result<TriangleMesh, GenerationError> {
            Err(GenerationError::Triangulation("collinear input".into()))
        }
    }

    fn settings() -> IslandSettings {
        IslandSettings {
            seed: 12,
            poisson: PoissonDiscSettings {
                root_placement: RootPlacement::Origin,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_assembles_island() {
        let mut generator = IslandGenerator::new(PerlinNoise2D::default(), FanTriangulator);
        let island = generator.generate(&settings(), None).unwrap();

        assert!(island.vertices.len() >= MIN_TRIANGULATION_NODES);
        assert_eq!(island.edges.len() + island.roots.len(), island.vertices.len());
        assert_eq!(island.triangles.len(), island.vertices.len() - 2);
        assert_eq!(island.vertices[0].x, 0.0);
        assert_eq!(island.vertices[0].z, 0.0);

        let (lo, hi) = island.height_range().unwrap();
        assert!(lo >= 0.0 && hi <= 5.0);
    }

    #[test]
    fn test_seed_override_replaces_settings_seed() {
        let mut generator = IslandGenerator::new(PerlinNoise2D::default(), FanTriangulator);
        let base = generator.generate(&settings(), None).unwrap();
        let same = generator.generate(&settings(), Some(12)).unwrap();
        let other = generator.generate(&settings(), Some(13)).unwrap();

        assert_eq!(base, same);
        assert_ne!(base, other);
    }

    #[test]
    fn test_island_seed_wins_over_noise_seed() {
        let mut reseeded = settings();
        reseeded.noise.seed = 999;
        let noise = PerlinNoise2D::new(reseeded.noise.clone());
        let mut generator = IslandGenerator::new(noise, FanTriangulator);
        let island = generator.generate(&reseeded, None).unwrap();
        assert_eq!(generator.sampler().noise().settings().seed, 12);

        let mut generator = IslandGenerator::new(PerlinNoise2D::default(), FanTriangulator);
        assert_eq!(generator.generate(&settings(), None).unwrap(), island);
    }

    #[test]
    fn test_too_few_nodes_is_reported() {
        // A single max-size disk fills the tiny region.
        let settings = IslandSettings {
            poisson: PoissonDiscSettings {
                region_size: DVec2::new(1.0, 1.0),
                min_radius: 2.0,
                max_radius: 2.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut generator = IslandGenerator::new(ConstantNoise(0.5), FanTriangulator);
        let err = generator.generate(&settings, None).unwrap_err();
        assert_eq!(err, GenerationError::InsufficientNodes { found: 1 });
    }

    #[test]
    fn test_triangulation_failure_propagates() {
        let mut generator = IslandGenerator::new(PerlinNoise2D::default(), FailingTriangulator);
        let err = generator.generate(&settings(), None).unwrap_err();
        assert!(matches!(err, GenerationError::Triangulation(_)));
    }

    #[test]
    fn test_invalid_height_settings_fail_before_sampling() {
        let mut settings = settings();
        settings.heights.falloff_sigma = -1.0;
        let mut generator = IslandGenerator::new(PerlinNoise2D::default(), FanTriangulator);
        assert!(matches!(
            generator.generate(&settings, None),
            Err(GenerationError::InvalidConfiguration { .. })
        ));
        assert!(generator.sampler().graph().is_empty());
    }

    #[test]
    fn test_height_range_of_empty_island() {
        let island = Island {
            vertices: Vec::new(),
            edges: Vec::new(),
            triangles: Vec::new(),
            roots: Vec::new(),
        };
        assert_eq!(island.height_range(), None);
    }
}
