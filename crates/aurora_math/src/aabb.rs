//! Axis-aligned bounding box.

use crate::common::*;
use crate::vector::Vec3;

/// Axis-aligned bounding box. May be infinite (lights at infinity) or empty.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Empty box (inverted bounds; unions fix it up).
    pub const EMPTY: Self = Self {
        min: Vec3::splat(INFINITY),
        max: Vec3::splat(-INFINITY),
    };

    /// Box covering all of space.
    pub const UNIVERSE: Self = Self {
        min: Vec3::splat(-INFINITY),
        max: Vec3::splat(INFINITY),
    };

    /// Create a new `Aabb` from explicit bounds.
    ///
    /// * `min` - Minimum corner.
    /// * `max` - Maximum corner.
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a box containing a single point.
    ///
    /// * `p` - The point.
    pub const fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Grow the box by a margin in every direction.
    ///
    /// * `margin` - The margin.
    pub fn expanded(&self, margin: Float) -> Self {
        Self::new(self.min - Vec3::splat(margin), self.max + Vec3::splat(margin))
    }

    /// Union with another box.
    ///
    /// * `other` - The other box.
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.min.min(&other.min), self.max.max(&other.max))
    }

    /// Returns true if every bound is finite.
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
