//! Orthonormal shading frame.

use crate::common::*;
use crate::vector::Vec3;

/// Right-handed orthonormal basis `(tangent, bitangent, normal)` around a
/// shading normal. Local space puts the normal on +Z and the tangent on +X.
#[derive(Copy, Clone, Debug)]
pub struct Frame {
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub normal: Vec3,
}

impl Frame {
    /// Build a frame from a unit normal using the branchless construction of
    /// Duff et al.
    ///
    /// * `normal` - Unit shading normal.
    pub fn from_normal(normal: &Vec3) -> Self {
        debug_assert!(normal.is_normalized());
        let sign = 1.0f32.copysign(normal.z);
        let a = -1.0 / (sign + normal.z);
        let b = normal.x * normal.y * a;
        Self {
            tangent: Vec3::new(1.0 + sign * normal.x * normal.x * a, sign * b, -sign * normal.x),
            bitangent: Vec3::new(b, sign + normal.y * normal.y * a, -normal.y),
            normal: *normal,
        }
    }

    /// Build a frame from a unit normal and a (not necessarily orthogonal)
    /// tangent hint; the tangent is re-orthogonalized against the normal.
    ///
    /// * `normal`  - Unit shading normal.
    /// * `tangent` - Tangent hint.
    pub fn from_normal_and_tangent(normal: &Vec3, tangent: &Vec3) -> Self {
        debug_assert!(normal.is_normalized());
        let projected = *tangent - *normal * normal.dot(tangent);
        if projected.length_squared() < EPSILON {
            return Self::from_normal(normal);
        }
        let tangent = projected.normalize();
        Self {
            tangent,
            bitangent: normal.cross(&tangent),
            normal: *normal,
        }
    }

    /// Transform a world-space direction into the local frame.
    ///
    /// * `v` - World-space direction.
    #[inline(always)]
    pub fn to_local(&self, v: &Vec3) -> Vec3 {
        Vec3::new(
            v.dot(&self.tangent),
            v.dot(&self.bitangent),
            v.dot(&self.normal),
        )
    }

    /// Transform a local-frame direction back into world space.
    ///
    /// * `v` - Local-frame direction.
    #[inline(always)]
    pub fn to_world(&self, v: &Vec3) -> Vec3 {
        self.tangent * v.x + self.bitangent * v.y + self.normal * v.z
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit_vec3() -> impl Strategy<Value = Vec3> {
        (-1.0..1.0f32, -1.0..1.0f32, -1.0..1.0f32).prop_filter_map("too short", |(x, y, z)| {
            let v = Vec3::new(x, y, z);
            if v.length_squared() < 1.0e-3 {
                None
            } else {
                Some(v.normalize())
            }
        })
    }

    #[test]
    fn frame_handles_degenerate_poles() {
        for n in [Vec3::UNIT_Z, -Vec3::UNIT_Z] {
            let f = Frame::from_normal(&n);
            assert!(f.tangent.is_normalized());
            assert!(f.bitangent.is_normalized());
            assert!(f.tangent.cross(&f.bitangent).near_equal(&f.normal, 1.0e-5));
        }
    }

    proptest! {
        // Transforming the normal into its own frame must give +Z.
        #[test]
        fn normal_maps_to_unit_z(n in unit_vec3()) {
            let f = Frame::from_normal(&n);
            prop_assert!(f.to_local(&n).near_equal(&Vec3::UNIT_Z, 1.0e-5));
        }

        #[test]
        fn basis_is_right_handed_orthonormal(n in unit_vec3()) {
            let f = Frame::from_normal(&n);
            prop_assert!(f.tangent.dot(&f.bitangent).abs() < 1.0e-5);
            prop_assert!(f.tangent.dot(&f.normal).abs() < 1.0e-5);
            prop_assert!(f.bitangent.dot(&f.normal).abs() < 1.0e-5);
            prop_assert!(f.tangent.cross(&f.bitangent).near_equal(&f.normal, 1.0e-4));
        }

        // Round trip world -> local -> world is the identity within 1e-5.
        #[test]
        fn round_trip_is_identity(n in unit_vec3(), v in unit_vec3()) {
            let f = Frame::from_normal(&n);
            let back = f.to_world(&f.to_local(&v));
            prop_assert!(back.near_equal(&v, 1.0e-5));
        }

        #[test]
        fn tangent_hint_is_respected(n in unit_vec3()) {
            let hint = Vec3::new(0.8, 0.1, 0.3);
            prop_assume!(hint.cross(&n).length_squared() > 1.0e-3);
            let f = Frame::from_normal_and_tangent(&n, &hint);
            prop_assert!(f.tangent.dot(&f.normal).abs() < 1.0e-5);
            prop_assert!(f.tangent.dot(&hint) > 0.0);
        }
    }
}
