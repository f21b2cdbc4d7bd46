//! Slope-bounded elevation along the disk forest.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::graph::NodeGraph;
use crate::noise_field::NoiseSource;

/// Height bounds and shape controls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightSettings {
    /// Extents the radial falloff is normalized against.
    pub world_size: DVec2,
    pub min_height: f64,
    pub max_height: f64,
    /// Steepest grade allowed along an edge, in degrees.
    pub max_slope_degrees: f64,
    /// Width of the radial falloff in units of `world_size`.
    pub falloff_sigma: f64,
}

impl Default for HeightSettings {
    fn default() -> Self {
        Self {
            world_size: DVec2::new(10.0, 10.0),
            min_height: 0.0,
            max_height: 5.0,
            max_slope_degrees: 30.0,
            falloff_sigma: 0.35,
        }
    }
}

impl HeightSettings {
    pub fn validate(&self) -> Result<(), GenerationError> {
        if !(self.min_height.is_finite() && self.max_height.is_finite()) {
            return Err(GenerationError::invalid("height bounds must be finite"));
        }
        if self.min_height > self.max_height {
            return Err(GenerationError::invalid(format!(
                "min height {} exceeds max height {}",
                self.min_height, self.max_height
            )));
        }
        if !(self.falloff_sigma > 0.0 && self.falloff_sigma.is_finite()) {
            return Err(GenerationError::invalid(format!(
                "falloff sigma must be positive, got {}",
                self.falloff_sigma
            )));
        }
        if !(self.world_size.is_finite() && self.world_size.min_element() > 0.0) {
            return Err(GenerationError::invalid(format!(
                "world size must be positive and finite, got {}",
                self.world_size
            )));
        }
        if !(0.0..90.0).contains(&self.max_slope_degrees) {
            return Err(GenerationError::invalid(format!(
                "max slope must be in [0, 90) degrees, got {}",
                self.max_slope_degrees
            )));
        }
        Ok(())
    }
}

/// Assigns every graph node an elevation in `[min_height, max_height]`.
///
/// Roots start at the mid height scaled by a radial falloff. Children then
/// follow their parent at a noise-chosen grade, walking edges in insertion
/// order so each parent is settled before its children.
#[derive(Clone, Debug)]
pub struct HeightSynthesizer {
    settings: HeightSettings,
}

impl HeightSynthesizer {
    pub fn new(settings: HeightSettings) -> Result<Self, GenerationError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &HeightSettings {
        &self.settings
    }

    /// Gaussian decay with distance from the origin, normalized by world size.
    pub fn falloff(&self, position: DVec2) -> f64 {
        let sigma = self.settings.falloff_sigma;
        let normalized = position / self.settings.world_size;
        (-normalized.length_squared() / (2.0 * sigma * sigma)).exp()
    }

    /// Height of a root. Depends only on the root's position.
    pub fn root_height(&self, position: DVec2) -> f64 {
        let mid = (self.settings.min_height + self.settings.max_height) * 0.5;
        self.clamp(mid * self.falloff(position))
    }

    /// Heights indexed like `graph.nodes()`.
    pub fn synthesize<N: NoiseSource + ?Sized>(&self, graph: &NodeGraph, noise: &N) -> Vec<f64> {
        let nodes = graph.nodes();
        let mut heights = vec![self.settings.min_height; nodes.len()];

        for &root in graph.roots() {
            heights[root] = self.root_height(nodes[root].position());
        }

        let max_slope = self.settings.max_slope_degrees;
        for &(parent, child) in graph.edges() {
            let from = nodes[parent].position();
            let to = nodes[child].position();
            let t = noise.value_at(to);
            let slope = (-max_slope + 2.0 * max_slope * t).to_radians();

            let raised = heights[parent] + slope.tan() * from.distance(to);
            heights[child] = self.clamp(raised * self.falloff(to));
        }

        heights
    }

    fn clamp(&self, height: f64) -> f64 {
        height.clamp(self.settings.min_height, self.settings.max_height)
    }
}
