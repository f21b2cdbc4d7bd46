//! Sparse chunked spatial hash grid over disks.
//!
//! The plane is cut into square cells of `cell_size`, grouped into
//! `CHUNK_SIZE × CHUNK_SIZE` chunks that are allocated on first use. Every
//! tracked object is registered in each cell its bounding rectangle overlaps.
//!
//! Circle queries classify each candidate cell against the query circle using
//! the cell's half-diagonal: cells far outside are skipped, cells well inside
//! are accepted in bulk, and only the boundary band is tested per object.

use std::f64::consts::SQRT_2;
use std::ops::ControlFlow;

use glam::{DVec2, IVec2};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::chunk::{CHUNK_SIZE, CellRange, Chunk, chunk_of, local_of};
use crate::{GridObject, GridObjectMut, ObjectId, Rect, circles_intersect};

/// Result sets that grew past this many entries are shrunk back after a query.
const RESULT_TRIM_THRESHOLD: usize = 16;

/// How a cell relates to a query circle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CellCoverage {
    /// Every occupant is guaranteed to intersect the query.
    Inside,
    /// No occupant can intersect the query through this cell.
    Outside,
    /// Occupants must be tested one by one.
    Partial,
}

/// A sparse chunked grid indexing objects by their bounding rectangle.
pub struct SpatialHashGrid<T> {
    /// Chunk coordinate -> cells.
    chunks: FxHashMap<IVec2, Chunk>,
    /// Every tracked object, keyed by id.
    objects: FxHashMap<ObjectId, T>,
    /// Reusable de-duplication set for range queries.
    unique_results: FxHashSet<ObjectId>,
    cell_size: f64,
    /// Half-diagonal of a cell.
    cell_radius: f64,
    /// Largest radius among tracked objects. Recomputed when the object
    /// holding it is removed.
    max_radius: f64,
}

impl<T> SpatialHashGrid<T> {
    /// Create an empty grid with square cells of `cell_size`.
    pub fn new(cell_size: f64) -> Self {
        assert_valid_cell_size(cell_size);
        Self {
            chunks: FxHashMap::default(),
            objects: FxHashMap::default(),
            unique_results: FxHashSet::default(),
            cell_size,
            cell_radius: half_diagonal(cell_size),
            max_radius: 0.0,
        }
    }

    /// Return the number of tracked objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Return true if the grid tracks no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Side length of a cell.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of chunks allocated so far (including ones that are now empty).
    pub fn allocated_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Return true if `id` is tracked.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Return a reference to a tracked object.
    pub fn get(&self, id: ObjectId) -> Option<&T> {
        self.objects.get(&id)
    }

    /// Iterate every tracked object in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.objects.values()
    }

    /// Cell coordinate containing `position` (component-wise floor).
    pub fn cell_of(&self, position: DVec2) -> IVec2 {
        cell_of(position, self.cell_size)
    }

    /// The inclusive range of cells a rectangle overlaps.
    pub fn covered_cells(&self, rect: &Rect) -> CellRange {
        covered_cells(rect, self.cell_size)
    }

    /// Cells `id` is actually registered in, row by row.
    ///
    /// Scans every allocated chunk; meant for tests and debug views.
    pub fn cells_containing(&self, id: ObjectId) -> Vec<IVec2> {
        let mut cells: Vec<IVec2> = self
            .chunks
            .iter()
            .flat_map(move |(&chunk_pos, chunk)| {
                chunk
                    .occupied()
                    .filter(move |(_, occupants)| occupants.contains(&id))
                    .map(move |(local, _)| chunk_pos * CHUNK_SIZE + local)
            })
            .collect();
        cells.sort_by_key(|c| (c.y, c.x));
        cells
    }

    /// Empty all cells and forget every tracked object.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.objects.clear();
        self.unique_results.clear();
        self.unique_results.shrink_to_fit();
        self.max_radius = 0.0;
    }

    /// Bounds of a cell in world space.
    fn cell_bounds(&self, cell: IVec2) -> Rect {
        let min = cell.as_dvec2() * self.cell_size;
        Rect {
            min,
            max: min + DVec2::splat(self.cell_size),
        }
    }

    fn cell_center(&self, cell: IVec2) -> DVec2 {
        (cell.as_dvec2() + DVec2::splat(0.5)) * self.cell_size
    }

    /// Classify a cell against a query circle.
    ///
    /// An occupant is only known to reach somewhere inside its bounding
    /// rectangle, whose corners sit up to `(sqrt(2) - 1) * radius` beyond the
    /// circle itself, so the bulk-accept band is narrowed by that much for the
    /// largest tracked radius.
    fn classify(&self, cell: IVec2, center: DVec2, radius: f64) -> CellCoverage {
        let distance = self.cell_center(cell).distance(center);
        let corner_slack = (SQRT_2 - 1.0) * self.max_radius;
        if distance <= radius - self.cell_radius - corner_slack {
            CellCoverage::Inside
        } else if distance > radius + self.cell_radius {
            CellCoverage::Outside
        } else {
            CellCoverage::Partial
        }
    }

    /// Visit every non-empty cell in `range`, skipping unallocated chunks.
    fn visit_cells<F>(&self, range: CellRange, mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(IVec2, &[ObjectId]) -> ControlFlow<()>,
    {
        for chunk_pos in range.chunks().iter() {
            let Some(chunk) = self.chunks.get(&chunk_pos) else {
                continue;
            };
            let origin = chunk_pos * CHUNK_SIZE;
            for local in range.local_span(chunk_pos).iter() {
                let occupants = chunk.cell(local);
                if occupants.is_empty() {
                    continue;
                }
                visit(origin + local, occupants)?;
            }
        }
        ControlFlow::Continue(())
    }

    /// Visit every non-empty cell in `range` without early exit.
    fn for_each_cell<F>(&self, range: CellRange, mut visit: F)
    where
        F: FnMut(IVec2, &[ObjectId]),
    {
        let flow = self.visit_cells(range, |cell, occupants| {
            visit(cell, occupants);
            ControlFlow::Continue(())
        });
        debug_assert!(flow.is_continue());
    }

    fn register(chunks: &mut FxHashMap<IVec2, Chunk>, range: CellRange, id: ObjectId) {
        for cell in range.iter() {
            add_to_cell(chunks, cell, id);
        }
    }
}

impl<T: GridObject> SpatialHashGrid<T> {
    /// Register an object in every cell its bounding rectangle overlaps.
    ///
    /// If an object with the same id is already tracked it is replaced.
    pub fn insert(&mut self, object: T) {
        let id = object.object_id();
        if self.objects.contains_key(&id) {
            self.remove(id);
        }
        let range = self.covered_cells(&object.rect());
        Self::register(&mut self.chunks, range, id);
        self.max_radius = self.max_radius.max(object.radius());
        self.objects.insert(id, object);
    }

    /// Unregister an object from all of its cells and return it.
    pub fn remove(&mut self, id: ObjectId) -> Option<T> {
        let object = self.objects.remove(&id)?;
        for cell in self.covered_cells(&object.rect()).iter() {
            remove_from_cell(&mut self.chunks, cell, id);
        }
        if object.radius() >= self.max_radius {
            self.max_radius = self
                .objects
                .values()
                .map(GridObject::radius)
                .fold(0.0, f64::max);
        }
        Some(object)
    }

    /// Re-register every tracked object under a new cell size.
    ///
    /// Cell contents are cleared but allocated chunks are kept for reuse.
    pub fn resize_grid_cells(&mut self, cell_size: f64) {
        assert_valid_cell_size(cell_size);
        self.cell_size = cell_size;
        self.cell_radius = half_diagonal(cell_size);

        for chunk in self.chunks.values_mut() {
            chunk.clear_cells();
        }

        let Self {
            chunks,
            objects,
            max_radius,
            ..
        } = self;
        *max_radius = 0.0;
        for (&id, object) in objects.iter() {
            Self::register(chunks, covered_cells(&object.rect(), cell_size), id);
            *max_radius = (*max_radius).max(object.radius());
        }

        tracing::debug!(
            cell_size,
            objects = self.objects.len(),
            chunks = self.chunks.len(),
            "resized grid cells"
        );
    }

    /// True iff no tracked object touches a circle of `radius` at `center`.
    ///
    /// Returns as soon as the first intersecting object is found.
    pub fn check_radius_empty(&self, radius: f64, center: DVec2) -> bool {
        debug_assert!(radius >= 0.0, "query radius must be non-negative");
        let range = self.covered_cells(&Rect::around_circle(center, radius));
        let found = self.visit_cells(range, |cell, occupants| {
            match self.classify(cell, center, radius) {
                CellCoverage::Inside => ControlFlow::Break(()),
                CellCoverage::Outside => ControlFlow::Continue(()),
                CellCoverage::Partial => {
                    if occupants
                        .iter()
                        .any(|id| self.intersects_circle(*id, center, radius))
                    {
                        ControlFlow::Break(())
                    } else {
                        ControlFlow::Continue(())
                    }
                }
            }
        });
        found.is_continue()
    }

    fn intersects_circle(&self, id: ObjectId, center: DVec2, radius: f64) -> bool {
        let object = &self.objects[&id];
        circles_intersect(object.position(), object.radius(), center, radius)
    }
}

impl<T: GridObject + Clone> SpatialHashGrid<T> {
    /// Append every object touching a circle of `radius` at `center` to `out`.
    ///
    /// Each object is reported once even if it spans several cells.
    pub fn radius_query(&mut self, radius: f64, center: DVec2, out: &mut Vec<T>) {
        debug_assert!(radius >= 0.0, "query radius must be non-negative");
        let mut results = std::mem::take(&mut self.unique_results);
        let range = self.covered_cells(&Rect::around_circle(center, radius));
        self.for_each_cell(range, |cell, occupants| {
            match self.classify(cell, center, radius) {
                CellCoverage::Inside => results.extend(occupants.iter().copied()),
                CellCoverage::Outside => {}
                CellCoverage::Partial => {
                    for &id in occupants {
                        if !results.contains(&id) && self.intersects_circle(id, center, radius) {
                            results.insert(id);
                        }
                    }
                }
            }
        });
        self.drain_results(results, out);
    }

    /// Append every object whose bounding rectangle overlaps `rect` to `out`.
    pub fn box_query(&mut self, rect: Rect, out: &mut Vec<T>) {
        let mut results = std::mem::take(&mut self.unique_results);
        let range = self.covered_cells(&rect);
        self.for_each_cell(range, |cell, occupants| {
            if rect.contains_rect(&self.cell_bounds(cell)) {
                results.extend(occupants.iter().copied());
            } else {
                for &id in occupants {
                    if !results.contains(&id) && self.objects[&id].rect().intersects(&rect) {
                        results.insert(id);
                    }
                }
            }
        });
        self.drain_results(results, out);
    }

    fn drain_results(&mut self, mut results: FxHashSet<ObjectId>, out: &mut Vec<T>) {
        let count = results.len();
        out.extend(results.drain().map(|id| self.objects[&id].clone()));
        if count > RESULT_TRIM_THRESHOLD {
            results.shrink_to(RESULT_TRIM_THRESHOLD);
        }
        self.unique_results = results;
    }
}

impl<T: GridObjectMut> SpatialHashGrid<T> {
    /// Move a tracked object by `displacement`.
    ///
    /// Only cells that leave or enter the object's coverage are touched. Returns
    /// false if `id` is not tracked.
    pub fn move_object(&mut self, id: ObjectId, displacement: DVec2) -> bool {
        let (old_rect, new_rect) = {
            let Some(object) = self.objects.get_mut(&id) else {
                return false;
            };
            let old_rect = object.rect();
            object.set_position(object.position() + displacement);
            (old_rect, object.rect())
        };

        let old = self.covered_cells(&old_rect);
        let new = self.covered_cells(&new_rect);
        if old == new {
            return true;
        }

        for cell in old.iter().filter(|&c| !new.contains(c)) {
            remove_from_cell(&mut self.chunks, cell, id);
        }
        for cell in new.iter().filter(|&c| !old.contains(c)) {
            add_to_cell(&mut self.chunks, cell, id);
        }
        true
    }
}

impl<T> Default for SpatialHashGrid<T> {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl<T> std::fmt::Debug for SpatialHashGrid<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialHashGrid")
            .field("cell_size", &self.cell_size)
            .field("objects", &self.objects.len())
            .field("chunks", &self.chunks.len())
            .field("max_radius", &self.max_radius)
            .finish_non_exhaustive()
    }
}

fn assert_valid_cell_size(cell_size: f64) {
    assert!(
        cell_size > 0.0 && cell_size.is_finite(),
        "cell size must be positive and finite, got {cell_size}"
    );
}

fn half_diagonal(cell_size: f64) -> f64 {
    0.5 * cell_size * SQRT_2
}

fn cell_of(position: DVec2, cell_size: f64) -> IVec2 {
    (position / cell_size).floor().as_ivec2()
}

fn covered_cells(rect: &Rect, cell_size: f64) -> CellRange {
    CellRange::new(cell_of(rect.min, cell_size), cell_of(rect.max, cell_size))
}

fn add_to_cell(chunks: &mut FxHashMap<IVec2, Chunk>, cell: IVec2, id: ObjectId) {
    chunks
        .entry(chunk_of(cell))
        .or_insert_with(Chunk::new)
        .add(local_of(cell), id);
}

fn remove_from_cell(chunks: &mut FxHashMap<IVec2, Chunk>, cell: IVec2, id: ObjectId) {
    if let Some(chunk) = chunks.get_mut(&chunk_of(cell)) {
        chunk.remove(local_of(cell), id);
    }
}
