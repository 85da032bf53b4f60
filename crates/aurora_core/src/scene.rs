//! Scene interfaces: hit records, shading data and the traversal contract.
//!
//! The acceleration structure (BVH) is an external collaborator; the
//! integrator only relies on the closest-hit/any-hit queries and the shading
//! extraction declared here.

use crate::light::Light;
use crate::material::{Material, SampledMaterialParameters};
use aurora_math::{Float, Frame, Point2, Ray, Vec3, INFINITY};
use std::sync::Arc;

/// Result of a closest-hit query.
///
/// `distance == INFINITY` is the no-intersection sentinel. The object id
/// packs the object index in the low 32 bits and the sub-object (primitive)
/// index in the high 32 bits.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitPoint {
    /// Hit distance along the ray.
    pub distance: Float,

    /// First barycentric-like surface coordinate.
    pub u: Float,

    /// Second barycentric-like surface coordinate.
    pub v: Float,

    /// Packed object/sub-object identifier.
    pub combined_object_id: u64,
}

impl Default for HitPoint {
    /// The no-intersection sentinel.
    fn default() -> Self {
        Self::NONE
    }
}

impl HitPoint {
    /// The no-intersection sentinel.
    pub const NONE: Self = Self {
        distance: INFINITY,
        u: 0.0,
        v: 0.0,
        combined_object_id: u64::MAX,
    };

    /// Create a new `HitPoint`.
    ///
    /// * `distance`      - Hit distance along the ray.
    /// * `u`             - First surface coordinate.
    /// * `v`             - Second surface coordinate.
    /// * `object_id`     - Object index.
    /// * `sub_object_id` - Sub-object (primitive) index.
    pub fn new(distance: Float, u: Float, v: Float, object_id: u32, sub_object_id: u32) -> Self {
        Self {
            distance,
            u,
            v,
            combined_object_id: (object_id as u64) | ((sub_object_id as u64) << 32),
        }
    }

    /// Returns true if this record represents an intersection.
    #[inline(always)]
    pub fn is_hit(&self) -> bool {
        self.distance < INFINITY
    }

    /// Object index (low 32 bits of the combined id).
    #[inline(always)]
    pub fn object_id(&self) -> u32 {
        self.combined_object_id as u32
    }

    /// Sub-object (primitive) index (high 32 bits of the combined id).
    #[inline(always)]
    pub fn sub_object_id(&self) -> u32 {
        (self.combined_object_id >> 32) as u32
    }
}

/// Surface information produced after a hit: everything the BSDF layer needs,
/// expressed around a right-handed orthonormal shading frame with +Z = the
/// shading normal and +X = the tangent.
pub struct ShadingData {
    /// World-space hit position.
    pub position: Vec3,

    /// Outward geometric normal.
    pub geometric_normal: Vec3,

    /// Shading frame (tangent, bitangent, shading normal).
    pub frame: Frame,

    /// Texture coordinate.
    pub tex_coord: Point2,

    /// The hit object's material.
    pub material: Arc<Material>,

    /// Material parameters resolved at the hit.
    pub params: SampledMaterialParameters,

    /// Outgoing direction (towards the viewer) in the local frame.
    pub outgoing_dir_local: Vec3,
}

impl ShadingData {
    /// Transform a world-space direction into the shading frame.
    ///
    /// * `v` - World-space direction.
    #[inline(always)]
    pub fn world_to_local(&self, v: &Vec3) -> Vec3 {
        self.frame.to_local(v)
    }

    /// Transform a local-frame direction back to world space.
    ///
    /// * `v` - Local-frame direction.
    #[inline(always)]
    pub fn local_to_world(&self, v: &Vec3) -> Vec3 {
        self.frame.to_world(v)
    }

    /// Offset origin for secondary rays leaving the surface on the side of
    /// `dir`, guarding against self-intersection.
    ///
    /// * `dir` - World-space direction the new ray travels in.
    pub fn offset_origin(&self, dir: &Vec3) -> Vec3 {
        let side = if self.geometric_normal.dot(dir) >= 0.0 {
            self.geometric_normal
        } else {
            -self.geometric_normal
        };
        self.position + side * RAY_OFFSET
    }
}

/// Origin offset applied to secondary rays.
pub const RAY_OFFSET: Float = 1.0e-4;

/// The traversal and shading contract the integrator renders through.
///
/// Implementations are immutable during a render and read concurrently
/// without locks.
pub trait Scene: Send + Sync {
    /// Closest-hit query. Returns `HitPoint::NONE` on a miss.
    ///
    /// * `ray` - The ray.
    fn closest_hit(&self, ray: &Ray) -> HitPoint;

    /// Any-hit (occlusion) query up to a maximum distance.
    ///
    /// * `ray`          - The ray.
    /// * `max_distance` - Occluders beyond this distance are ignored.
    fn any_hit(&self, ray: &Ray, max_distance: Float) -> bool;

    /// Resolve full shading information for a hit.
    ///
    /// * `ray` - The ray that produced the hit.
    /// * `hit` - The hit record.
    fn extract_shading_data(&self, ray: &Ray, hit: &HitPoint) -> ShadingData;

    /// All lights in the scene.
    fn lights(&self) -> &[Light];

    /// The light whose emitting geometry produced this hit, if any, along
    /// with its index in `lights()`.
    ///
    /// * `hit` - The hit record.
    fn light_for_hit(&self, hit: &HitPoint) -> Option<(usize, &Light)>;

    /// The background light, if the scene has one, with its index in
    /// `lights()`.
    fn background_light(&self) -> Option<(usize, &Light)>;
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_packing_round_trips() {
        let hit = HitPoint::new(1.5, 0.25, 0.5, 0xdead_beef, 0x0bad_cafe);
        assert_eq!(hit.object_id(), 0xdead_beef);
        assert_eq!(hit.sub_object_id(), 0x0bad_cafe);
        assert!(hit.is_hit());
    }

    #[test]
    fn sentinel_is_a_miss() {
        assert!(!HitPoint::NONE.is_hit());
        assert_eq!(HitPoint::default().distance, INFINITY);
    }
}
