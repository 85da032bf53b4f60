//! Light layer.
//!
//! Lights are a closed sum type; dispatch is a small match in hot code.
//! Every returned PDF is finite and positive on the light's support, and
//! every returned direction is unit length. `get_radiance` on a delta light
//! is a programming error: the matching `test_ray_hit` always reports a miss.

use crate::color::{Color, Wavelength};
use aurora_math::{Aabb, Float, Point2, Ray, Vec3};

mod area;
mod background;
mod directional;
mod point;

// Re-export
pub use area::*;
pub use background::*;
pub use directional::*;
pub use point::*;

/// Distance sentinel for lights at infinity.
pub const LIGHT_DISTANCE_INFINITY: Float = 1.0e36;

/// Inputs for direct-illumination sampling.
pub struct IlluminateParam<'a> {
    /// World-space position being shaded.
    pub shading_position: Vec3,

    /// Wavelength carrier of the current path.
    pub wavelength: &'a Wavelength,

    /// The random sample point.
    pub sample: Point2,
}

/// Result of direct-illumination sampling.
#[derive(Copy, Clone, Debug)]
pub struct Illumination {
    /// Unit direction from the shading point towards the light.
    pub direction_to_light: Vec3,

    /// Distance to the sampled point (sentinel for lights at infinity).
    pub distance: Float,

    /// Solid-angle PDF of the sampled direction. For delta lights this is
    /// the squared distance (directional: one) so dividing by it applies the
    /// correct falloff.
    pub direct_pdf_w: Float,

    /// Radiance arriving from the sampled direction, before visibility.
    pub color: Color,
}

/// Result of querying emitted radiance along a ray that hit the light.
#[derive(Copy, Clone, Debug)]
pub struct Radiance {
    /// Emitted radiance along the ray.
    pub color: Color,

    /// Solid-angle PDF that `illuminate` would have assigned to this
    /// direction, for MIS against BSDF sampling.
    pub direct_pdf_w: Float,
}

/// Polymorphic light source.
pub enum Light {
    Point(PointLight),
    Directional(DirectionalLight),
    Area(AreaLight),
    Background(BackgroundLight),
}

impl Light {
    /// Bounding box of the light's emitting geometry; infinite for lights at
    /// infinity.
    pub fn bounding_box(&self) -> Aabb {
        match self {
            Light::Point(l) => l.bounding_box(),
            Light::Directional(l) => l.bounding_box(),
            Light::Area(l) => l.bounding_box(),
            Light::Background(l) => l.bounding_box(),
        }
    }

    /// Returns true if the light's sampled directions form a zero-measure
    /// set; delta lights are excluded from MIS and from BSDF-sampled hits.
    pub fn is_delta(&self) -> bool {
        match self {
            Light::Point(_) | Light::Directional(_) => true,
            Light::Area(_) | Light::Background(_) => false,
        }
    }

    /// Returns true if the light has finite extent.
    pub fn is_finite(&self) -> bool {
        match self {
            Light::Point(_) | Light::Area(_) => true,
            Light::Directional(_) | Light::Background(_) => false,
        }
    }

    /// Intersect a ray with the light's emitting geometry. Point and
    /// directional lights can never be hit.
    ///
    /// * `ray` - The ray.
    pub fn test_ray_hit(&self, ray: &Ray) -> Option<Float> {
        match self {
            Light::Point(_) | Light::Directional(_) => None,
            Light::Area(l) => l.test_ray_hit(ray),
            Light::Background(_) => Some(LIGHT_DISTANCE_INFINITY),
        }
    }

    /// Sample a direction towards the light for next-event estimation.
    /// Returns `None` when the sampled point cannot contribute (backfacing
    /// area sample, degenerate direction).
    ///
    /// * `param` - The illumination query.
    pub fn illuminate(&self, param: &IlluminateParam) -> Option<Illumination> {
        match self {
            Light::Point(l) => l.illuminate(param),
            Light::Directional(l) => l.illuminate(param),
            Light::Area(l) => l.illuminate(param),
            Light::Background(l) => l.illuminate(param),
        }
    }

    /// Emitted radiance along a ray that hit the light, plus the PDF needed
    /// for MIS. Must not be called for delta lights.
    ///
    /// * `ray`        - The ray that hit the light.
    /// * `distance`   - Hit distance along the ray.
    /// * `wavelength` - Wavelength carrier of the current path.
    pub fn get_radiance(
        &self,
        ray: &Ray,
        distance: Float,
        wavelength: &Wavelength,
    ) -> Option<Radiance> {
        match self {
            Light::Point(_) | Light::Directional(_) => {
                debug_assert!(false, "get_radiance called on a delta light");
                None
            }
            Light::Area(l) => l.get_radiance(ray, distance, wavelength),
            Light::Background(l) => Some(l.get_radiance(&ray.dir, wavelength)),
        }
    }
}

macro_rules! light_from {
    ($struct: ty, $enum: ident) => {
        impl From<$struct> for Light {
            /// Wraps $struct in Light::$enum.
            fn from(light: $struct) -> Self {
                Self::$enum(light)
            }
        }
    };
}
light_from!(PointLight, Point);
light_from!(DirectionalLight, Directional);
light_from!(AreaLight, Area);
light_from!(BackgroundLight, Background);
