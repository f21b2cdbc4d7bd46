//! Disks and the object traits the grid indexes.

use glam::DVec2;

use crate::Rect;

/// Stable identifier for an object tracked by the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl ObjectId {
    /// Create a new object ID from a u64.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Trait that items stored in a [`SpatialHashGrid`](crate::SpatialHashGrid) must implement.
///
/// The grid registers an object in every cell its bounding rectangle overlaps and
/// tests it against query circles using its position and radius.
pub trait GridObject {
    /// Return the unique ID of this object.
    fn object_id(&self) -> ObjectId;

    /// Return the object's center.
    fn position(&self) -> DVec2;

    /// Return the object's bounding radius.
    fn radius(&self) -> f64;

    /// Axis-aligned bounds used for cell registration.
    fn rect(&self) -> Rect {
        Rect::around_circle(self.position(), self.radius())
    }
}

/// Grid objects that can be relocated in place.
pub trait GridObjectMut: GridObject {
    /// Update the object's center.
    fn set_position(&mut self, position: DVec2);
}

/// True if two circles touch or overlap.
///
/// Compares squared distances, so callers that need to agree with the grid on
/// boundary cases should use this rather than recomputing the test.
#[inline]
pub fn circles_intersect(a: DVec2, a_radius: f64, b: DVec2, b_radius: f64) -> bool {
    let reach = a_radius + b_radius;
    a.distance_squared(b) <= reach * reach
}

/// An immutable 2D disk: center, radius and the derived bounding rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Disk {
    position: DVec2,
    radius: f64,
    rect: Rect,
}

impl Disk {
    /// Create a disk. The radius must be positive and finite.
    pub fn new(position: DVec2, radius: f64) -> Self {
        debug_assert!(
            radius > 0.0 && radius.is_finite(),
            "disk radius must be positive and finite, got {radius}"
        );
        Self {
            position,
            radius,
            rect: Rect::around_circle(position, radius),
        }
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_rect_is_center_plus_minus_radius() {
        let d = Disk::new(DVec2::new(-3.0, 4.0), 1.5);
        assert_eq!(d.rect().min, DVec2::new(-4.5, 2.5));
        assert_eq!(d.rect().max, DVec2::new(-1.5, 5.5));
    }

    #[test]
    fn test_touching_circles_intersect() {
        assert!(circles_intersect(DVec2::ZERO, 1.0, DVec2::new(2.0, 0.0), 1.0));
        assert!(!circles_intersect(DVec2::ZERO, 1.0, DVec2::new(2.01, 0.0), 1.0));
    }

    #[test]
    fn test_object_id_creation_and_access() {
        let id = ObjectId::new(12345);
        assert_eq!(id.value(), 12345);
    }
}
