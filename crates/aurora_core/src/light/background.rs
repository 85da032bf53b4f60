//! Background (environment) light.

use super::*;
use crate::distribution::Distribution2D;
use crate::sampling::{uniform_sample_sphere, uniform_sphere_pdf};
use crate::texture::{sample_bilinear, Bitmap};
use aurora_math::{clamp, safe_sqrt, INV_PI, INV_TWO_PI, PI, TWO_PI};
use std::sync::Arc;

/// Environment light surrounding the scene. With a map attached, directions
/// are importance sampled by the map's luminance through a piecewise-constant
/// 2-D distribution; otherwise uniformly over the sphere.
pub struct BackgroundLight {
    /// Color tint (the emitted radiance when no map is attached).
    pub color: Vec3,

    /// Optional equirectangular environment map.
    map: Option<Arc<dyn Bitmap>>,

    /// Luminance distribution over the map, rows weighted by sin θ.
    distribution: Option<Distribution2D>,
}

impl BackgroundLight {
    /// Create a constant-color background.
    ///
    /// * `color` - Emitted radiance.
    pub fn new(color: Vec3) -> Self {
        Self {
            color,
            map: None,
            distribution: None,
        }
    }

    /// Create a background backed by an equirectangular environment map.
    ///
    /// * `color` - Color tint multiplied into every lookup.
    /// * `map`   - The environment map.
    pub fn with_map(color: Vec3, map: Arc<dyn Bitmap>) -> Self {
        let w = map.width() as usize;
        let h = map.height() as usize;
        let mut luminance = vec![0.0; w * h];
        for y in 0..h {
            // Solid angle per texel shrinks towards the poles.
            let sin_theta = ((y as Float + 0.5) / h as Float * PI).sin();
            for x in 0..w {
                let texel = map.get_pixel(x as u32, y as u32, false);
                let lum = 0.2126 * texel[0] + 0.7152 * texel[1] + 0.0722 * texel[2];
                luminance[y * w + x] = lum * sin_theta;
            }
        }
        let distribution = Distribution2D::new(&luminance, w, h);
        log::debug!("built {}x{} environment importance distribution", w, h);
        Self {
            color,
            map: Some(map),
            distribution: Some(distribution),
        }
    }

    /// Bounding box: unbounded.
    pub fn bounding_box(&self) -> Aabb {
        Aabb::UNIVERSE
    }

    /// Map a unit direction to equirectangular UV.
    ///
    /// * `dir` - Unit direction.
    fn dir_to_uv(dir: &Vec3) -> Point2 {
        let theta = clamp(dir.z, -1.0, 1.0).acos();
        let phi = dir.y.atan2(dir.x);
        Point2::new((phi + PI) * INV_TWO_PI, theta * INV_PI)
    }

    /// Map equirectangular UV to a unit direction.
    ///
    /// * `uv` - Texture coordinate in [0, 1]².
    fn uv_to_dir(uv: &Point2) -> Vec3 {
        let theta = uv.y * PI;
        let phi = uv.x * TWO_PI - PI;
        let sin_theta = theta.sin();
        Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), theta.cos())
    }

    /// Emitted radiance for a direction.
    ///
    /// * `dir`        - Unit direction pointing away from the scene.
    /// * `wavelength` - Wavelength carrier of the current path.
    pub fn get_radiance(&self, dir: &Vec3, wavelength: &Wavelength) -> Radiance {
        let mut rgb = self.color;
        let uv = Self::dir_to_uv(dir);
        if let Some(map) = self.map.as_deref() {
            let texel = sample_bilinear(map, &uv, false);
            rgb = rgb.mul_elements(&Vec3::new(texel[0], texel[1], texel[2]));
        }

        let direct_pdf_w = match self.distribution.as_ref() {
            Some(dist) => {
                let sin_theta = safe_sqrt(1.0 - dir.z * dir.z);
                if sin_theta <= 0.0 {
                    0.0
                } else {
                    dist.pdf(&uv) / (2.0 * PI * PI * sin_theta)
                }
            }
            None => uniform_sphere_pdf(),
        };

        Radiance {
            color: Color::sample_rgb(wavelength, &rgb),
            direct_pdf_w,
        }
    }

    /// Sample a direction towards the environment.
    ///
    /// * `param` - The illumination query.
    pub fn illuminate(&self, param: &IlluminateParam) -> Option<Illumination> {
        let (direction, pdf) = match self.distribution.as_ref() {
            Some(dist) => {
                let (uv, pdf_uv) = dist.sample_continuous(&param.sample);
                if pdf_uv <= 0.0 {
                    return None;
                }
                let dir = Self::uv_to_dir(&uv);
                let sin_theta = (uv.y * PI).sin();
                if sin_theta <= 0.0 {
                    return None;
                }
                (dir, pdf_uv / (2.0 * PI * PI * sin_theta))
            }
            None => (uniform_sample_sphere(&param.sample), uniform_sphere_pdf()),
        };

        let radiance = self.get_radiance(&direction, param.wavelength);
        Some(Illumination {
            direction_to_light: direction,
            distance: LIGHT_DISTANCE_INFINITY,
            direct_pdf_w: pdf,
            color: radiance.color,
        })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
