use glam::DVec2;

/// Axis-aligned rectangle in 2D world space.
///
/// Invariant: `min.x <= max.x` and `min.y <= max.y`.
/// The constructor enforces this by swapping components if needed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: DVec2,
    pub max: DVec2,
}

impl Rect {
    /// Create a rectangle from two corners. Automatically sorts
    /// components so that min <= max on both axes.
    pub fn new(a: DVec2, b: DVec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create a rectangle from a center point and half-extents.
    pub fn from_center_half_extents(center: DVec2, half: DVec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// The square that bounds a circle of `radius` around `center`.
    pub fn around_circle(center: DVec2, radius: f64) -> Self {
        Self::from_center_half_extents(center, DVec2::splat(radius))
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains_point(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Returns true if `other` lies entirely inside this rectangle
    /// (touching edges count as inside).
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// Returns true if this rectangle overlaps `other`
    /// (including touching edges).
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}
