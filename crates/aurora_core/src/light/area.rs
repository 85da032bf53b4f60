//! Area light source over a sphere, disc or triangle.

use super::*;
use crate::sampling::{concentric_sample_disk, uniform_sample_sphere, uniform_sample_triangle};
use aurora_math::{Frame, EPSILON};

/// Emitting geometry of an area light.
pub enum LightShape {
    Sphere { center: Vec3, radius: Float },
    Disc { center: Vec3, normal: Vec3, radius: Float },
    Triangle { v0: Vec3, v1: Vec3, v2: Vec3 },
}

impl LightShape {
    /// Surface area of the shape.
    pub fn area(&self) -> Float {
        match self {
            LightShape::Sphere { radius, .. } => 4.0 * aurora_math::PI * radius * radius,
            LightShape::Disc { radius, .. } => aurora_math::PI * radius * radius,
            LightShape::Triangle { v0, v1, v2 } => {
                0.5 * (*v1 - *v0).cross(&(*v2 - *v0)).length()
            }
        }
    }

    /// Uniformly sample a point on the surface. Returns the point and its
    /// outward normal.
    ///
    /// * `u` - The random sample point.
    pub fn sample_point(&self, u: &Point2) -> (Vec3, Vec3) {
        match self {
            LightShape::Sphere { center, radius } => {
                let n = uniform_sample_sphere(u);
                (*center + n * *radius, n)
            }
            LightShape::Disc { center, normal, radius } => {
                let d = concentric_sample_disk(u);
                let frame = Frame::from_normal(normal);
                let p = *center
                    + frame.to_world(&Vec3::new(d.x * *radius, d.y * *radius, 0.0));
                (p, *normal)
            }
            LightShape::Triangle { v0, v1, v2 } => {
                let b = uniform_sample_triangle(u);
                let p = *v0 + (*v1 - *v0) * b.x + (*v2 - *v0) * b.y;
                let n = (*v1 - *v0).cross(&(*v2 - *v0)).normalize();
                (p, n)
            }
        }
    }

    /// Intersect a ray with the shape. Returns the hit distance and the
    /// outward normal at the hit.
    ///
    /// * `ray` - The ray.
    pub fn intersect(&self, ray: &Ray) -> Option<(Float, Vec3)> {
        match self {
            LightShape::Sphere { center, radius } => {
                let oc = ray.origin - *center;
                let b = oc.dot(&ray.dir);
                let c = oc.length_squared() - radius * radius;
                let disc = b * b - c;
                if disc < 0.0 {
                    return None;
                }
                let sqrt_disc = disc.sqrt();
                let mut t = -b - sqrt_disc;
                if t < EPSILON {
                    t = -b + sqrt_disc;
                }
                if t < EPSILON {
                    return None;
                }
                let n = (ray.at(t) - *center).normalize();
                Some((t, n))
            }
            LightShape::Disc { center, normal, radius } => {
                let denom = normal.dot(&ray.dir);
                if denom.abs() < EPSILON {
                    return None;
                }
                let t = normal.dot(&(*center - ray.origin)) / denom;
                if t < EPSILON {
                    return None;
                }
                let p = ray.at(t);
                if (p - *center).length_squared() > radius * radius {
                    return None;
                }
                Some((t, *normal))
            }
            LightShape::Triangle { v0, v1, v2 } => {
                // Möller-Trumbore.
                let e1 = *v1 - *v0;
                let e2 = *v2 - *v0;
                let p = ray.dir.cross(&e2);
                let det = e1.dot(&p);
                if det.abs() < 1.0e-9 {
                    return None;
                }
                let inv_det = 1.0 / det;
                let s = ray.origin - *v0;
                let u = s.dot(&p) * inv_det;
                if !(0.0..=1.0).contains(&u) {
                    return None;
                }
                let q = s.cross(&e1);
                let v = ray.dir.dot(&q) * inv_det;
                if v < 0.0 || u + v > 1.0 {
                    return None;
                }
                let t = e2.dot(&q) * inv_det;
                if t < EPSILON {
                    return None;
                }
                Some((t, e1.cross(&e2).normalize()))
            }
        }
    }

    /// Bounding box of the shape.
    pub fn bounding_box(&self) -> Aabb {
        match self {
            LightShape::Sphere { center, radius } => Aabb::new(
                *center - Vec3::splat(*radius),
                *center + Vec3::splat(*radius),
            ),
            LightShape::Disc { center, radius, .. } => {
                Aabb::from_point(*center).expanded(*radius)
            }
            LightShape::Triangle { v0, v1, v2 } => Aabb::from_point(*v0)
                .union(&Aabb::from_point(*v1))
                .union(&Aabb::from_point(*v2)),
        }
    }
}

/// Area light: a shape emitting radiance from its front side.
pub struct AreaLight {
    /// Emitting geometry.
    pub shape: LightShape,

    /// Emitted radiance.
    pub color: Vec3,

    /// Object id of the light's geometry in the scene, so a path hitting the
    /// surface can be matched back to this light.
    pub object_id: u32,
}

impl AreaLight {
    /// Create a new `AreaLight`.
    ///
    /// * `shape`     - Emitting geometry.
    /// * `color`     - Emitted radiance.
    /// * `object_id` - Object id of the light's geometry in the scene.
    pub fn new(shape: LightShape, color: Vec3, object_id: u32) -> Self {
        Self {
            shape,
            color,
            object_id,
        }
    }

    /// Bounding box of the emitting geometry.
    pub fn bounding_box(&self) -> Aabb {
        self.shape.bounding_box()
    }

    /// Intersect a ray with the emitting geometry.
    ///
    /// * `ray` - The ray.
    pub fn test_ray_hit(&self, ray: &Ray) -> Option<Float> {
        self.shape.intersect(ray).map(|(t, _)| t)
    }

    /// Sample a point on the surface and convert the area density to a
    /// solid-angle PDF: `dist² / (|cosθ_light| · area)`.
    ///
    /// * `param` - The illumination query.
    pub fn illuminate(&self, param: &IlluminateParam) -> Option<Illumination> {
        let (point, normal) = self.shape.sample_point(&param.sample);
        let to_light = point - param.shading_position;
        let sqr_distance = to_light.length_squared();
        if sqr_distance <= 0.0 {
            return None;
        }
        let distance = sqr_distance.sqrt();
        let direction_to_light = to_light / distance;

        // Backfacing samples cannot contribute.
        let cos_light = normal.dot(&-direction_to_light);
        if cos_light < EPSILON {
            return None;
        }

        Some(Illumination {
            direction_to_light,
            distance,
            direct_pdf_w: sqr_distance / (cos_light * self.shape.area()),
            color: Color::sample_rgb(param.wavelength, &self.color),
        })
    }

    /// Emitted radiance along a ray that hit the surface, with the matching
    /// solid-angle PDF for MIS.
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
        let point = ray.at(distance);
        let normal = match &self.shape {
            LightShape::Sphere { center, radius } => (point - *center) / *radius,
            LightShape::Disc { normal, .. } => *normal,
            LightShape::Triangle { v0, v1, v2 } => {
                (*v1 - *v0).cross(&(*v2 - *v0)).normalize()
            }
        };

        let cos_light = normal.dot(&-ray.dir);
        if cos_light < EPSILON {
            return None;
        }

        Some(Radiance {
            color: Color::sample_rgb(wavelength, &self.color),
            direct_pdf_w: distance * distance / (cos_light * self.shape.area()),
        })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Rng;

    fn unit_disc() -> AreaLight {
        AreaLight::new(
            LightShape::Disc {
                center: Vec3::new(0.0, 0.0, 2.0),
                normal: -Vec3::UNIT_Z,
                radius: 1.0,
            },
            Vec3::ONE,
            7,
        )
    }

    #[test]
    fn disc_pdf_matches_formula() {
        let light = unit_disc();
        let mut rng = Rng::new(61);
        let w = Wavelength::default();
        for _ in 0..1000 {
            let param = IlluminateParam {
                shading_position: Vec3::ZERO,
                wavelength: &w,
                sample: rng.uniform_vec2(),
            };
            let ill = light.illuminate(&param).unwrap();
            let cos_light = (-Vec3::UNIT_Z).dot(&-ill.direction_to_light);
            let expected = ill.distance * ill.distance / (cos_light * aurora_math::PI);
            assert!((ill.direct_pdf_w - expected).abs() < 1.0e-3 * expected);
            assert!(ill.direct_pdf_w.is_finite() && ill.direct_pdf_w > 0.0);
            assert!(ill.direction_to_light.is_normalized());
        }
    }

    #[test]
    fn backfacing_samples_are_rejected() {
        let light = unit_disc();
        // Shading point behind the disc sees its back side.
        let param = IlluminateParam {
            shading_position: Vec3::new(0.0, 0.0, 4.0),
            wavelength: &Wavelength::default(),
            sample: Point2::new(0.3, 0.6),
        };
        assert!(light.illuminate(&param).is_none());
    }

    #[test]
    fn ray_hit_is_consistent_with_radiance() {
        let light = unit_disc();
        let ray = Ray::new(Vec3::ZERO, Vec3::UNIT_Z, 0.0);
        let t = light.test_ray_hit(&ray).unwrap();
        assert!((t - 2.0).abs() < 1.0e-4);
        let radiance = light
            .get_radiance(&ray, t, &Wavelength::default())
            .unwrap();
        // Head-on: pdf = dist² / area.
        assert!((radiance.direct_pdf_w - 4.0 / aurora_math::PI).abs() < 1.0e-4);
    }

    #[test]
    fn sphere_samples_lie_on_surface() {
        let shape = LightShape::Sphere {
            center: Vec3::new(1.0, 2.0, 3.0),
            radius: 0.5,
        };
        let mut rng = Rng::new(67);
        for _ in 0..1000 {
            let (p, n) = shape.sample_point(&rng.uniform_vec2());
            assert!(((p - Vec3::new(1.0, 2.0, 3.0)).length() - 0.5).abs() < 1.0e-4);
            assert!(n.is_normalized());
        }
    }

    #[test]
    fn triangle_intersection_agrees_with_sampling() {
        let shape = LightShape::Triangle {
            v0: Vec3::new(-1.0, -1.0, 1.0),
            v1: Vec3::new(1.0, -1.0, 1.0),
            v2: Vec3::new(0.0, 1.0, 1.0),
        };
        let ray = Ray::new(Vec3::ZERO, Vec3::UNIT_Z, 0.0);
        let (t, _n) = shape.intersect(&ray).unwrap();
        assert!((t - 1.0).abs() < 1.0e-5);

        // Area of this triangle is 2.
        assert!((shape.area() - 2.0).abs() < 1.0e-5);
    }
}
