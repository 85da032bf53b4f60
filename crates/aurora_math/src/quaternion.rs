//! Rotation quaternion.

use crate::common::*;
use crate::vector::Vec3;
use std::ops::{Add, Mul, Sub};

/// Unit quaternion representing a 3-D rotation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Quaternion {
    pub x: Float,
    pub y: Float,
    pub z: Float,
    pub w: Float,
}

impl Default for Quaternion {
    /// Return the identity rotation.
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    /// Identity rotation.
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Create a new `Quaternion` from raw components.
    ///
    /// * `x` - Vector part, x.
    /// * `y` - Vector part, y.
    /// * `z` - Vector part, z.
    /// * `w` - Scalar part.
    #[inline(always)]
    pub const fn new(x: Float, y: Float, z: Float, w: Float) -> Self {
        Self { x, y, z, w }
    }

    /// Create a rotation of `angle` radians around a unit `axis`.
    ///
    /// * `axis`  - Unit rotation axis.
    /// * `angle` - Angle in radians.
    pub fn from_axis_angle(axis: &Vec3, angle: Float) -> Self {
        debug_assert!(axis.is_normalized());
        let (s, c) = (angle * 0.5).sin_cos();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    /// Returns the dot product with another quaternion.
    ///
    /// * `other` - The other quaternion.
    #[inline(always)]
    pub fn dot(&self, other: &Self) -> Float {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Returns the quaternion scaled to unit length.
    pub fn normalize(&self) -> Self {
        let inv_len = 1.0 / self.dot(self).sqrt();
        Self::new(
            self.x * inv_len,
            self.y * inv_len,
            self.z * inv_len,
            self.w * inv_len,
        )
    }

    /// Returns the inverse rotation. Assumes unit length.
    #[inline(always)]
    pub fn conjugate(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Rotate a vector by this quaternion.
    ///
    /// * `v` - The vector.
    pub fn rotate(&self, v: &Vec3) -> Vec3 {
        // q * v * q^-1 via the expanded two-cross-product form.
        let u = Vec3::new(self.x, self.y, self.z);
        let t = 2.0 * u.cross(v);
        *v + self.w * t + u.cross(&t)
    }

    /// Compose two rotations. `(a * b).rotate(v) == a.rotate(b.rotate(v))`.
    ///
    /// * `other` - The rotation applied first.
    pub fn compose(&self, other: &Self) -> Self {
        Self::new(
            self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
            self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
        )
    }

    /// Spherical linear interpolation towards another rotation.
    ///
    /// * `t` - Interpolation parameter in [0, 1].
    /// * `q` - Rotation at `t == 1`.
    pub fn slerp(&self, t: Float, q: Self) -> Self {
        let cos_theta = self.dot(&q);
        if cos_theta > 0.9995 {
            // Quaternions are nearly parallel. Use linear interpolation to
            // avoid numerical instability.
            ((1.0 - t) * *self + t * q).normalize()
        } else {
            // Compute the orthogonal quaternion `qperp`.
            let theta = clamp(cos_theta, -1.0, 1.0).acos();
            let thetap = theta * t;
            let qperp = (q - *self * cos_theta).normalize();

            // Compute the interpolated quaternion.
            *self * thetap.cos() + qperp * thetap.sin()
        }
    }

    /// Returns true if no component is NaN or infinite.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }
}

impl Add for Quaternion {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(
            self.x + other.x,
            self.y + other.y,
            self.z + other.z,
            self.w + other.w,
        )
    }
}

impl Sub for Quaternion {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(
            self.x - other.x,
            self.y - other.y,
            self.z - other.z,
            self.w - other.w,
        )
    }
}

impl Mul<Float> for Quaternion {
    type Output = Self;

    fn mul(self, s: Float) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s, self.w * s)
    }
}

impl Mul<Quaternion> for Float {
    type Output = Quaternion;

    fn mul(self, q: Quaternion) -> Quaternion {
        q * self
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
