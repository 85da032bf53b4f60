//! Point light source.

use super::*;

/// Isotropic point light emitting the same intensity in all directions.
pub struct PointLight {
    /// World-space position.
    pub position: Vec3,

    /// Emitted intensity.
    pub color: Vec3,
}

impl PointLight {
    /// Create a new `PointLight`.
    ///
    /// * `position` - World-space position.
    /// * `color`    - Emitted intensity.
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self { position, color }
    }

    /// Bounding box: the position itself.
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_point(self.position)
    }

    /// Sample the (single) direction towards the light. The returned PDF is
    /// the squared distance, so dividing by it applies the inverse-square
    /// falloff.
    ///
    /// * `param` - The illumination query.
    pub fn illuminate(&self, param: &IlluminateParam) -> Option<Illumination> {
        let to_light = self.position - param.shading_position;
        let sqr_distance = to_light.length_squared();
        if sqr_distance <= 0.0 {
            return None;
        }
        let distance = sqr_distance.sqrt();

        Some(Illumination {
            direction_to_light: to_light / distance,
            distance,
            direct_pdf_w: sqr_distance,
            color: Color::sample_rgb(param.wavelength, &self.color),
        })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
