//! Ray type.

use crate::common::*;
use crate::vector::Vec3;
use std::fmt;

/// A ray with a precomputed reciprocal direction.
///
/// The direction is unit length to within `EPSILON` and `inv_dir` matches it
/// componentwise; both are established in `new` and preserved by transforms.
/// `time` is the shutter-relative instant in [0, 1) used for motion blur.
#[derive(Copy, Clone, Debug)]
pub struct Ray {
    /// Origin.
    pub origin: Vec3,

    /// Unit direction.
    pub dir: Vec3,

    /// Componentwise reciprocal of `dir`, used by slab-test traversal.
    pub inv_dir: Vec3,

    /// Time in [0, 1) for motion blur.
    pub time: Float,
}

impl Ray {
    /// Create a new `Ray`. The direction must already be unit length.
    ///
    /// * `origin` - Origin.
    /// * `dir`    - Unit direction.
    /// * `time`   - Time in [0, 1).
    pub fn new(origin: Vec3, dir: Vec3, time: Float) -> Self {
        debug_assert!(dir.is_normalized(), "ray direction must be unit length");
        Self {
            origin,
            dir,
            inv_dir: dir.recip(),
            time,
        }
    }

    /// Returns the point at parameter `t` along the ray.
    ///
    /// * `t` - Distance along the ray.
    #[inline(always)]
    pub fn at(&self, t: Float) -> Vec3 {
        self.origin + self.dir * t
    }
}

impl fmt::Display for Ray {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "o={} d={} t={}", self.origin, self.dir, self.time)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
