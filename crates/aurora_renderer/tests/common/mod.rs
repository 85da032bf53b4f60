//! Analytic test scene used by the integration suites: planes, spheres and
//! discs intersected directly, no acceleration structure.

use aurora_core::light::{AreaLight, Light, LightShape};
use aurora_core::material::Material;
use aurora_core::scene::{HitPoint, Scene, ShadingData};
use aurora_math::{Float, Frame, Point2, Ray, Vec3, EPSILON};
use std::sync::Arc;

/// Analytic surface.
pub enum Surface {
    Plane { point: Vec3, normal: Vec3 },
    Sphere { center: Vec3, radius: Float },
    Disc { center: Vec3, normal: Vec3, radius: Float },
}

impl Surface {
    /// Intersect a ray with the surface. Returns the distance and the
    /// outward normal at the hit.
    fn intersect(&self, ray: &Ray) -> Option<(Float, Vec3)> {
        match self {
            Surface::Plane { point, normal } => {
                let denom = normal.dot(&ray.dir);
                if denom.abs() < EPSILON {
                    return None;
                }
                let t = normal.dot(&(*point - ray.origin)) / denom;
                if t < EPSILON {
                    return None;
                }
                Some((t, *normal))
            }
            Surface::Sphere { center, radius } => {
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
                Some((t, (ray.at(t) - *center).normalize()))
            }
            Surface::Disc { center, normal, radius } => {
                let denom = normal.dot(&ray.dir);
                if denom.abs() < EPSILON {
                    return None;
                }
                let t = normal.dot(&(*center - ray.origin)) / denom;
                if t < EPSILON {
                    return None;
                }
                if (ray.at(t) - *center).length_squared() > radius * radius {
                    return None;
                }
                Some((t, *normal))
            }
        }
    }
}

struct SceneObject {
    surface: Surface,
    material: Arc<Material>,
}

/// Brute-force scene implementing the traversal contract.
pub struct TestScene {
    objects: Vec<SceneObject>,
    lights: Vec<Light>,
    /// Maps object ids of light geometry to light indices.
    emitter_objects: Vec<(u32, usize)>,
    background_index: Option<usize>,
}

impl Default for TestScene {
    fn default() -> Self {
        Self::new()
    }
}

impl TestScene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            lights: Vec::new(),
            emitter_objects: Vec::new(),
            background_index: None,
        }
    }

    /// Add a surface with a material. Returns the object id.
    ///
    /// * `surface`  - The surface.
    /// * `material` - Its material.
    pub fn add_object(&mut self, surface: Surface, material: Arc<Material>) -> u32 {
        self.objects.push(SceneObject { surface, material });
        (self.objects.len() - 1) as u32
    }

    /// Add a non-area light.
    ///
    /// * `light` - The light.
    pub fn add_light(&mut self, light: Light) {
        if matches!(light, Light::Background(_)) {
            self.background_index = Some(self.lights.len());
        }
        self.lights.push(light);
    }

    /// Add an area light; its emitting geometry also becomes scene geometry
    /// with a black material so paths can hit it.
    ///
    /// * `shape` - The emitting geometry.
    /// * `color` - Emitted radiance.
    pub fn add_area_light(&mut self, shape: LightShape, color: Vec3) {
        let surface = match &shape {
            LightShape::Sphere { center, radius } => Surface::Sphere {
                center: *center,
                radius: *radius,
            },
            LightShape::Disc { center, normal, radius } => Surface::Disc {
                center: *center,
                normal: *normal,
                radius: *radius,
            },
            LightShape::Triangle { .. } => unimplemented!("triangle emitters unused in tests"),
        };
        let material = Arc::new(Material {
            base_color: Vec3::ZERO,
            roughness: 0.0,
            ior: 0.0,
            ..Default::default()
        });
        let object_id = self.add_object(surface, material);
        self.emitter_objects.push((object_id, self.lights.len()));
        self.lights
            .push(Light::from(AreaLight::new(shape, color, object_id)));
    }
}

impl Scene for TestScene {
    fn closest_hit(&self, ray: &Ray) -> HitPoint {
        let mut closest = HitPoint::NONE;
        for (id, object) in self.objects.iter().enumerate() {
            if let Some((t, _)) = object.surface.intersect(ray) {
                if t < closest.distance {
                    closest = HitPoint::new(t, 0.0, 0.0, id as u32, 0);
                }
            }
        }
        closest
    }

    fn any_hit(&self, ray: &Ray, max_distance: Float) -> bool {
        self.objects
            .iter()
            .any(|o| matches!(o.surface.intersect(ray), Some((t, _)) if t < max_distance))
    }

    fn extract_shading_data(&self, ray: &Ray, hit: &HitPoint) -> ShadingData {
        let object = &self.objects[hit.object_id() as usize];
        let (_, normal) = object
            .surface
            .intersect(ray)
            .expect("shading data requested for a miss");
        let frame = Frame::from_normal(&normal);
        let material = Arc::clone(&object.material);
        let params = material.sample(&Point2::ZERO);

        ShadingData {
            position: ray.at(hit.distance),
            geometric_normal: normal,
            frame,
            tex_coord: Point2::ZERO,
            material,
            params,
            outgoing_dir_local: frame.to_local(&-ray.dir),
        }
    }

    fn lights(&self) -> &[Light] {
        &self.lights
    }

    fn light_for_hit(&self, hit: &HitPoint) -> Option<(usize, &Light)> {
        self.emitter_objects
            .iter()
            .find(|(object_id, _)| *object_id == hit.object_id())
            .map(|(_, light_index)| (*light_index, &self.lights[*light_index]))
    }

    fn background_light(&self) -> Option<(usize, &Light)> {
        self.background_index.map(|i| (i, &self.lights[i]))
    }
}
