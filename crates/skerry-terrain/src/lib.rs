//! Procedural island skeletons: a forest of touching, non-overlapping disks grown
//! over a noise field, lifted into slope-bounded terrain heights.
//!
//! The pipeline is:
//!
//! 1. [`PoissonDiscSampler`] grows a [`NodeGraph`] inside the region, using a
//!    [`skerry_grid::SpatialHashGrid`] to reject overlapping candidates.
//! 2. A [`Triangulator`] turns the node centers into triangles.
//! 3. [`HeightSynthesizer`] walks the graph edges parent-first and assigns
//!    every node a height.
//!
//! [`IslandGenerator`] wires the three together.

mod error;
mod graph;
mod heights;
mod island;
mod noise_field;
mod sampler;

pub use error::GenerationError;
pub use graph::{Edge, GraphNode, NodeGraph};
pub use heights::{HeightSettings, HeightSynthesizer};
pub use island::{
    Island, IslandGenerator, IslandSettings, MIN_TRIANGULATION_NODES, TriangleMesh, Triangulator,
};
pub use noise_field::{ConstantNoise, NoiseSettings, NoiseSource, PerlinNoise2D};
pub use sampler::{
    CancelToken, NodeAccepted, PoissonDiscSampler, PoissonDiscSettings, RootPlacement, SamplingRun,
};
