//! Fixed-size blocks of grid cells and the integer coordinate math around them.

use glam::IVec2;

use crate::ObjectId;

/// Side length of a chunk in cells.
pub const CHUNK_SIZE: i32 = 32;

/// Total number of cells in a chunk (32²).
pub const CHUNK_AREA: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;

/// Chunk coordinate containing a cell coordinate (floor division).
#[inline]
pub fn chunk_of(cell: IVec2) -> IVec2 {
    IVec2::new(cell.x.div_euclid(CHUNK_SIZE), cell.y.div_euclid(CHUNK_SIZE))
}

/// Chunk-local coordinate of a cell, each component in `0..CHUNK_SIZE`.
#[inline]
pub fn local_of(cell: IVec2) -> IVec2 {
    IVec2::new(cell.x.rem_euclid(CHUNK_SIZE), cell.y.rem_euclid(CHUNK_SIZE))
}

/// Row-major index of a chunk-local coordinate.
///
/// An out-of-range local coordinate means the coordinate math upstream is broken.
#[inline]
fn linear_index(local: IVec2) -> usize {
    assert!(
        (0..CHUNK_SIZE).contains(&local.x) && (0..CHUNK_SIZE).contains(&local.y),
        "chunk-local cell coordinate out of range: {local}"
    );
    (local.y * CHUNK_SIZE + local.x) as usize
}

/// Inclusive rectangle of cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub min: IVec2,
    pub max: IVec2,
}

impl CellRange {
    pub fn new(min: IVec2, max: IVec2) -> Self {
        debug_assert!(min.x <= max.x && min.y <= max.y, "inverted cell range");
        Self { min, max }
    }

    pub fn contains(&self, cell: IVec2) -> bool {
        cell.x >= self.min.x && cell.x <= self.max.x && cell.y >= self.min.y && cell.y <= self.max.y
    }

    /// All covered cells, row by row.
    pub fn iter(&self) -> impl Iterator<Item = IVec2> + use<> {
        let Self { min, max } = *self;
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| IVec2::new(x, y)))
    }

    /// Range of chunk coordinates the cells fall into.
    pub fn chunks(&self) -> CellRange {
        CellRange::new(chunk_of(self.min), chunk_of(self.max))
    }

    /// The part of this range that lies in `chunk`, in chunk-local coordinates.
    pub fn local_span(&self, chunk: IVec2) -> CellRange {
        let chunk_min = chunk * CHUNK_SIZE;
        let chunk_max = chunk_min + IVec2::splat(CHUNK_SIZE - 1);
        CellRange::new(
            self.min.max(chunk_min) - chunk_min,
            self.max.min(chunk_max) - chunk_min,
        )
    }
}

/// A `CHUNK_SIZE × CHUNK_SIZE` block of cells, each listing the ids registered in it.
#[derive(Clone, Debug)]
pub(crate) struct Chunk {
    cells: Vec<Vec<ObjectId>>,
}

impl Chunk {
    pub(crate) fn new() -> Self {
        Self {
            cells: vec![Vec::new(); CHUNK_AREA],
        }
    }

    pub(crate) fn cell(&self, local: IVec2) -> &[ObjectId] {
        &self.cells[linear_index(local)]
    }

    /// Register `id` in a cell. Registering twice is a no-op.
    pub(crate) fn add(&mut self, local: IVec2, id: ObjectId) {
        let cell = &mut self.cells[linear_index(local)];
        if !cell.contains(&id) {
            cell.push(id);
        }
    }

    /// Unregister `id` from a cell. Returns true if it was present.
    pub(crate) fn remove(&mut self, local: IVec2, id: ObjectId) -> bool {
        let cell = &mut self.cells[linear_index(local)];
        if let Some(pos) = cell.iter().position(|&s| s == id) {
            cell.swap_remove(pos);
            true
        } else {
            false
        }
    }

    /// Empty every cell while keeping their allocations.
    pub(crate) fn clear_cells(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Iterate `(local coordinate, occupants)` for every non-empty cell.
    pub(crate) fn occupied(&self) -> impl Iterator<Item = (IVec2, &[ObjectId])> {
        self.cells.iter().enumerate().filter_map(|(i, cell)| {
            if cell.is_empty() {
                return None;
            }
            let i = i as i32;
            Some((IVec2::new(i % CHUNK_SIZE, i / CHUNK_SIZE), cell.as_slice()))
        })
    }
}
