//! Rigid transform (translation + rotation).

use crate::common::*;
use crate::quaternion::Quaternion;
use crate::ray::Ray;
use crate::vector::Vec3;

/// A rigid 3-D transformation composed of a translation and a rotation.
///
/// Composition order matches quaternion composition:
/// `(a * b).transform_point(x) == a.transform_point(b.transform_point(x))`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quaternion,
}

impl Transform {
    /// Create a new `Transform`.
    ///
    /// * `translation` - Translation.
    /// * `rotation`    - Rotation.
    pub const fn new(translation: Vec3, rotation: Quaternion) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Create a pure translation.
    ///
    /// * `translation` - Translation.
    pub const fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quaternion::IDENTITY)
    }

    /// Create a pure rotation.
    ///
    /// * `rotation` - Rotation.
    pub const fn from_rotation(rotation: Quaternion) -> Self {
        Self::new(Vec3::ZERO, rotation)
    }

    /// Compose with another transform. The other transform is applied first.
    ///
    /// * `other` - The transform applied first.
    pub fn compose(&self, other: &Self) -> Self {
        Self::new(
            self.translation + self.rotation.rotate(&other.translation),
            self.rotation.compose(&other.rotation),
        )
    }

    /// Returns the inverse transform.
    pub fn inverse(&self) -> Self {
        let inv_rotation = self.rotation.conjugate();
        Self::new(-inv_rotation.rotate(&self.translation), inv_rotation)
    }

    /// Transform a 3-D point.
    ///
    /// * `p` - The point.
    #[inline(always)]
    pub fn transform_point(&self, p: &Vec3) -> Vec3 {
        self.rotation.rotate(p) + self.translation
    }

    /// Transform a 3-D direction. Translation is ignored.
    ///
    /// * `v` - The direction.
    #[inline(always)]
    pub fn transform_vector(&self, v: &Vec3) -> Vec3 {
        self.rotation.rotate(v)
    }

    /// Transform a ray. Rebuilds the reciprocal direction.
    ///
    /// * `ray` - The ray.
    pub fn transform_ray(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.transform_point(&ray.origin),
            self.transform_vector(&ray.dir),
            ray.time,
        )
    }

    /// Interpolate two transforms. Translations are interpolated linearly,
    /// rotations spherically.
    ///
    /// * `t0` - Transform at `t == 0`.
    /// * `t1` - Transform at `t == 1`.
    /// * `t`  - Interpolation parameter.
    pub fn interpolate(t0: &Self, t1: &Self, t: Float) -> Self {
        Self::new(
            t0.translation.lerp(t, &t1.translation),
            t0.rotation.slerp(t, t1.rotation),
        )
    }

    /// Returns true if both parts are free of NaN/infinity.
    pub fn is_valid(&self) -> bool {
        self.translation.is_finite() && self.rotation.is_valid()
    }

    /// Check if two transforms are almost equal.
    ///
    /// * `a`       - First transform.
    /// * `b`       - Second transform.
    /// * `epsilon` - Per-component tolerance.
    pub fn almost_equal(a: &Self, b: &Self, epsilon: Float) -> bool {
        a.translation.near_equal(&b.translation, epsilon)
            && (a.rotation.dot(&b.rotation).abs() - 1.0).abs() < epsilon
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
