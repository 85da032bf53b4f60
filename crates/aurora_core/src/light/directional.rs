//! Directional (distant) light source.

use super::*;

/// Light at infinity emitting parallel rays along a fixed direction.
pub struct DirectionalLight {
    /// Unit direction the light travels in (from the light towards the
    /// scene).
    pub direction: Vec3,

    /// Emitted radiance.
    pub color: Vec3,
}

impl DirectionalLight {
    /// Create a new `DirectionalLight`.
    ///
    /// * `direction` - Direction of light travel; normalized here.
    /// * `color`     - Emitted radiance.
    pub fn new(direction: Vec3, color: Vec3) -> Self {
        Self {
            direction: direction.normalize(),
            color,
        }
    }

    /// Bounding box: unbounded.
    pub fn bounding_box(&self) -> Aabb {
        Aabb::UNIVERSE
    }

    /// Sample the (single) direction towards the light: the reversed travel
    /// direction with PDF one and the infinite-distance sentinel.
    ///
    /// * `param` - The illumination query.
    pub fn illuminate(&self, param: &IlluminateParam) -> Option<Illumination> {
        Some(Illumination {
            direction_to_light: -self.direction,
            distance: LIGHT_DISTANCE_INFINITY,
            direct_pdf_w: 1.0,
            color: Color::sample_rgb(param.wavelength, &self.color),
        })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
