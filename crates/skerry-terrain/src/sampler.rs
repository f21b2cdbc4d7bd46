//! Disk-graph growth by Poisson disc sampling.
//!
//! A generalized Bridson sampler: several seeded roots, a noise-modulated disk
//! radius, and explicit parent → child edges. Every accepted disk touches its
//! parent from the outside and overlaps nothing else, so the run ends once the
//! region is saturated.
//!
//! The same state machine is exposed three ways: [`PoissonDiscSampler::sample_points`]
//! runs to completion, [`PoissonDiscSampler::sample_points_with`] reports each
//! acceptance to a callback, and [`PoissonDiscSampler::begin`] hands back a lazy
//! [`SamplingRun`] iterator that can be paced and cancelled by the caller.

use std::collections::VecDeque;
use std::f64::consts::TAU;
use std::iter::FusedIterator;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use skerry_grid::{Disk, SpatialHashGrid};

use crate::error::GenerationError;
use crate::graph::{GraphNode, NodeGraph};
use crate::noise_field::NoiseSource;

/// Relative gap left between a child and its parent so the pair does not
/// count as touching.
const CONTACT_GAP: f64 = 1e-9;

/// How roots are positioned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RootPlacement {
    /// Every root is drawn at random inside the inner root ellipse.
    #[default]
    Scattered,
    /// The first root sits at the origin; any further roots are scattered.
    Origin,
}

/// Parameters of one sampling run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoissonDiscSettings {
    /// Full extents of the region, which is centered on the origin.
    pub region_size: DVec2,
    pub min_radius: f64,
    pub max_radius: f64,
    /// Candidate attempts per parent before it is retired.
    pub samples_before_rejection: u32,
    /// Radius/position refinement steps per candidate.
    pub noise_iterations: u32,
    pub root_count: u32,
    pub root_placement: RootPlacement,
    /// Attempts per root before giving up with an error.
    pub max_root_attempts: u32,
}

impl Default for PoissonDiscSettings {
    fn default() -> Self {
        Self {
            region_size: DVec2::new(10.0, 10.0),
            min_radius: 0.5,
            max_radius: 1.5,
            samples_before_rejection: 30,
            noise_iterations: 5,
            root_count: 1,
            root_placement: RootPlacement::Scattered,
            max_root_attempts: 1000,
        }
    }
}

impl PoissonDiscSettings {
    /// Check the settings describe a run that can make progress.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if !(self.region_size.is_finite() && self.region_size.min_element() > 0.0) {
            return Err(GenerationError::invalid(format!(
                "region size must be positive and finite, got {}",
                self.region_size
            )));
        }
        if !(self.min_radius > 0.0 && self.min_radius.is_finite()) {
            return Err(GenerationError::invalid(format!(
                "min radius must be positive and finite, got {}",
                self.min_radius
            )));
        }
        if !(self.max_radius >= self.min_radius && self.max_radius.is_finite()) {
            return Err(GenerationError::invalid(format!(
                "max radius {} must be finite and at least min radius {}",
                self.max_radius, self.min_radius
            )));
        }
        if self.root_count == 0 {
            return Err(GenerationError::invalid("root count must be at least 1"));
        }
        if self.samples_before_rejection == 0 {
            return Err(GenerationError::invalid(
                "samples before rejection must be at least 1",
            ));
        }
        if self.max_root_attempts == 0 {
            return Err(GenerationError::invalid("max root attempts must be at least 1"));
        }
        Ok(())
    }

    pub fn half_extents(&self) -> DVec2 {
        self.region_size * 0.5
    }

    /// True if `position` lies inside the region rectangle (edges included).
    pub fn contains(&self, position: DVec2) -> bool {
        let half = self.half_extents();
        position.x.abs() <= half.x && position.y.abs() <= half.y
    }

    fn radius_for(&self, noise: f64) -> f64 {
        self.min_radius + (self.max_radius - self.min_radius) * noise
    }
}

/// One accepted disk, in acceptance order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeAccepted {
    pub index: usize,
    /// `None` for roots.
    pub parent: Option<usize>,
    pub disk: Disk,
}

/// Shared flag used to stop a [`SamplingRun`] between steps.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Grows a [`NodeGraph`] of non-overlapping disks.
///
/// Owns its grid, noise field and graph; every run clears and reuses them.
pub struct PoissonDiscSampler<N> {
    grid: SpatialHashGrid<GraphNode>,
    noise: N,
    active: Vec<usize>,
    graph: NodeGraph,
}

impl<N: NoiseSource> PoissonDiscSampler<N> {
    pub fn new(noise: N) -> Self {
        Self {
            grid: SpatialHashGrid::default(),
            noise,
            active: Vec::new(),
            graph: NodeGraph::new(),
        }
    }

    /// The noise field that drives disk radii.
    pub fn noise(&self) -> &N {
        &self.noise
    }

    /// Mutable access to the noise field, e.g. to reseed it between runs.
    pub fn noise_mut(&mut self) -> &mut N {
        &mut self.noise
    }

    /// The graph of the most recent run.
    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    /// The spatial index of the most recent run.
    pub fn grid(&self) -> &SpatialHashGrid<GraphNode> {
        &self.grid
    }

    /// Run to completion and return the finished graph.
    pub fn sample_points<R: Rng>(
        &mut self,
        settings: &PoissonDiscSettings,
        rng: &mut R,
    ) -> Result<&NodeGraph, GenerationError> {
        self.sample_points_with(settings, rng, |_| {})
    }

    /// Run to completion, invoking `on_accept` for every disk in acceptance order.
    pub fn sample_points_with<R, F>(
        &mut self,
        settings: &PoissonDiscSettings,
        rng: &mut R,
        mut on_accept: F,
    ) -> Result<&NodeGraph, GenerationError>
    where
        R: Rng,
        F: FnMut(&NodeAccepted),
    {
        for accepted in self.begin(settings, rng)? {
            on_accept(&accepted);
        }
        Ok(&self.graph)
    }

    /// Start a run and return it as a lazy sequence of acceptances.
    ///
    /// Settings are validated and all roots are placed before this returns, so
    /// configuration errors surface here. Invalid settings leave the previous
    /// run untouched; a root that cannot be placed leaves the sampler empty.
    /// Root acceptances are yielded first.
    pub fn begin<'a, R: Rng>(
        &'a mut self,
        settings: &PoissonDiscSettings,
        rng: &'a mut R,
    ) -> Result<SamplingRun<'a, N, R>, GenerationError> {
        settings.validate()?;
        let started = Instant::now();

        self.reset(settings.max_radius);
        let mut pending = VecDeque::with_capacity(settings.root_count as usize);
        for root in 0..settings.root_count {
            match self.place_root(settings, rng, root) {
                Ok(accepted) => pending.push_back(accepted),
                Err(e) => {
                    self.reset(settings.max_radius);
                    return Err(e);
                }
            }
        }

        Ok(SamplingRun {
            sampler: self,
            rng,
            settings: settings.clone(),
            pending,
            cancel: None,
            cancelled: false,
            finished: false,
            started,
        })
    }

    fn reset(&mut self, cell_size: f64) {
        self.grid.clear();
        self.grid.resize_grid_cells(cell_size);
        self.active.clear();
        self.graph.clear();
    }

    fn place_root<R: Rng>(
        &mut self,
        settings: &PoissonDiscSettings,
        rng: &mut R,
        root: u32,
    ) -> Result<NodeAccepted, GenerationError> {
        if root == 0 && settings.root_placement == RootPlacement::Origin {
            let radius = settings.radius_for(self.noise.value_at(DVec2::ZERO));
            if self.is_valid(settings, DVec2::ZERO, radius) {
                return Ok(self.accept_root(Disk::new(DVec2::ZERO, radius)));
            }
        }

        // Roots are drawn from an inner ellipse a quarter of the region's
        // extents across so they do not start pinned against the boundary.
        let semi_axes = settings.region_size * 0.25;
        for _ in 0..settings.max_root_attempts {
            let angle = rng.random::<f64>() * TAU;
            let reach = rng.random::<f64>().sqrt();
            let position = DVec2::from_angle(angle) * reach * semi_axes;
            let radius = settings.radius_for(self.noise.value_at(position));
            if self.is_valid(settings, position, radius) {
                return Ok(self.accept_root(Disk::new(position, radius)));
            }
        }

        Err(GenerationError::invalid(format!(
            "could not place root {} of {} after {} attempts",
            root + 1,
            settings.root_count,
            settings.max_root_attempts
        )))
    }

    fn accept_root(&mut self, disk: Disk) -> NodeAccepted {
        let index = self.graph.push_root(disk);
        self.track(index, disk);
        NodeAccepted {
            index,
            parent: None,
            disk,
        }
    }

    fn track(&mut self, index: usize, disk: Disk) {
        self.grid.insert(GraphNode { index, disk });
        self.active.push(index);
    }

    fn is_valid(&self, settings: &PoissonDiscSettings, position: DVec2, radius: f64) -> bool {
        settings.contains(position) && self.grid.check_radius_empty(radius, position)
    }

    /// Advance until one disk is accepted or the active set runs dry.
    fn grow<R: Rng>(&mut self, settings: &PoissonDiscSettings, rng: &mut R) -> Option<NodeAccepted> {
        while !self.active.is_empty() {
            let slot = rng.random_range(0..self.active.len());
            let parent = self.active[slot];
            match self.spawn_candidate(settings, rng, parent) {
                Some(disk) => {
                    let index = self.graph.push_child(parent, disk);
                    self.track(index, disk);
                    return Some(NodeAccepted {
                        index,
                        parent: Some(parent),
                        disk,
                    });
                }
                None => {
                    self.active.remove(slot);
                }
            }
        }
        None
    }

    /// Try to place a child against `parent`.
    ///
    /// Each attempt draws one direction, then refines radius and position
    /// together: the radius follows the noise at the current position and the
    /// position follows the radius so the child always touches the parent.
    fn spawn_candidate<R: Rng>(
        &self,
        settings: &PoissonDiscSettings,
        rng: &mut R,
        parent: usize,
    ) -> Option<Disk> {
        let parent = self.graph.nodes()[parent];
        let place = |direction: DVec2, radius: f64| {
            parent.position() + direction * (parent.radius() + radius) * (1.0 + CONTACT_GAP)
        };

        for _ in 0..settings.samples_before_rejection {
            let direction = DVec2::from_angle(rng.random::<f64>() * TAU);
            let mut radius = settings.max_radius;
            let mut position = place(direction, radius);
            for _ in 0..settings.noise_iterations {
                radius = settings.radius_for(self.noise.value_at(position));
                position = place(direction, radius);
            }

            if self.is_valid(settings, position, radius) {
                return Some(Disk::new(position, radius));
            }
        }
        None
    }
}

/// An in-progress sampling run, yielding each accepted disk in order.
///
/// Single pass: once it returns `None` it stays exhausted. Dropping a run
/// early leaves a partial graph that is still a valid forest.
pub struct SamplingRun<'a, N, R> {
    sampler: &'a mut PoissonDiscSampler<N>,
    rng: &'a mut R,
    settings: PoissonDiscSettings,
    pending: VecDeque<NodeAccepted>,
    cancel: Option<CancelToken>,
    cancelled: bool,
    finished: bool,
    started: Instant,
}

impl<'a, N: NoiseSource, R: Rng> SamplingRun<'a, N, R> {
    /// Check `token` before every step.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// True if the run stopped because its token was cancelled.
    pub fn cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The graph as grown so far.
    pub fn graph(&self) -> &NodeGraph {
        &self.sampler.graph
    }

    fn finish(&mut self) {
        self.finished = true;
        let graph = &self.sampler.graph;
        tracing::debug!(
            nodes = graph.len(),
            edges = graph.edges().len(),
            roots = graph.roots().len(),
            cancelled = self.cancelled,
            elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0,
            "poisson disc sampling finished"
        );
    }
}

impl<N: NoiseSource, R: Rng> Iterator for SamplingRun<'_, N, R> {
    type Item = NodeAccepted;

    fn next(&mut self) -> Option<NodeAccepted> {
        if self.finished {
            return None;
        }
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            self.cancelled = true;
            self.finish();
            return None;
        }
        if let Some(root) = self.pending.pop_front() {
            return Some(root);
        }

        let accepted = self.sampler.grow(&self.settings, self.rng);
        if accepted.is_none() {
            self.finish();
        }
        accepted
    }
}

impl<N: NoiseSource, R: Rng> FusedIterator for SamplingRun<'_, N, R> {}
