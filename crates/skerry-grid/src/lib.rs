//! Sparse chunked spatial hash grid for disk overlap queries in the plane.
//!
//! Objects are indexed by their axis-aligned bounding rectangle in square
//! cells of a configurable size. Cells are grouped into 32×32 chunks that are
//! only allocated once something lands in them, so the grid is unbounded in
//! every direction, negative coordinates included.
//!
//! # Queries
//!
//! - [`SpatialHashGrid::check_radius_empty`] answers "does anything touch this
//!   circle?" and stops at the first hit.
//! - [`SpatialHashGrid::radius_query`] collects every object touching a circle.
//! - [`SpatialHashGrid::box_query`] collects every object whose bounding
//!   rectangle overlaps a rectangle.
//!
//! Touching counts as intersecting everywhere.
//!
//! ```rust
//! use glam::DVec2;
//! use skerry_grid::{GridObject, ObjectId, SpatialHashGrid};
//!
//! #[derive(Clone)]
//! struct Pebble(u64, DVec2);
//!
//! impl GridObject for Pebble {
//!     fn object_id(&self) -> ObjectId { ObjectId::new(self.0) }
//!     fn position(&self) -> DVec2 { self.1 }
//!     fn radius(&self) -> f64 { 0.5 }
//! }
//!
//! let mut grid = SpatialHashGrid::new(1.0);
//! grid.insert(Pebble(1, DVec2::new(-3.0, 2.0)));
//!
//! assert!(!grid.check_radius_empty(0.5, DVec2::new(-2.0, 2.0)));
//! assert!(grid.check_radius_empty(0.5, DVec2::new(5.0, 5.0)));
//! ```

mod chunk;
mod disk;
mod grid;
mod rect;

pub use chunk::{CHUNK_AREA, CHUNK_SIZE, CellRange, chunk_of, local_of};
pub use disk::{Disk, GridObject, GridObjectMut, ObjectId, circles_intersect};
pub use grid::SpatialHashGrid;
pub use rect::Rect;
