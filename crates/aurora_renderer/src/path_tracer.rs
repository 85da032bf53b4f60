//! Unidirectional path tracer with next-event estimation and multiple
//! importance sampling.

use crate::renderer::Renderer;
use aurora_core::bsdf::{EvaluationContext, SamplingContext};
use aurora_core::color::Color;
use aurora_core::context::RenderingContext;
use aurora_core::light::{IlluminateParam, Light};
use aurora_core::material::Material;
use aurora_core::sampling::power_heuristic;
use aurora_core::scene::Scene;
use aurora_math::{min, Float, Ray};
use std::sync::Arc;

/// Shadow rays stop just short of the light sample to avoid re-hitting it.
const SHADOW_RAY_SHORTENING: Float = 1.0 - 1.0e-4;

/// Forward path tracer. Per bounce: add emission with MIS, sample one light
/// for next-event estimation, sample the BSDF for the continuation, then
/// apply Russian roulette once past the minimum depth.
pub struct PathTracer<S: Scene> {
    /// The scene being rendered.
    scene: Arc<S>,
}

impl<S: Scene> PathTracer<S> {
    /// Create a new `PathTracer`.
    ///
    /// * `scene` - The scene to render.
    pub fn new(scene: Arc<S>) -> Self {
        Self { scene }
    }

    /// MIS weight (power heuristic) of the previous BSDF sample against a
    /// light that could also have produced this direction. After a delta
    /// event the light strategy has no competing density and the weight is
    /// one.
    ///
    /// * `last_was_delta`  - Whether the previous event was delta.
    /// * `last_bsdf_pdf`   - PDF of the previous BSDF sample.
    /// * `light_pdf`       - The light strategy's PDF for this direction
    ///                       (pick probability folded in).
    fn bsdf_mis_weight(last_was_delta: bool, last_bsdf_pdf: Float, light_pdf: Float) -> Float {
        if last_was_delta {
            1.0
        } else {
            power_heuristic(last_bsdf_pdf, light_pdf)
        }
    }

    /// Next-event estimation at one path vertex: pick a light uniformly,
    /// sample a direction to it, shadow-test and weight against the BSDF's
    /// PDF for that direction.
    fn sample_direct_light(
        &self,
        shading: &aurora_core::scene::ShadingData,
        ctx: &mut RenderingContext,
    ) -> Color {
        let lights = self.scene.lights();
        if lights.is_empty() {
            return Color::ZERO;
        }
        let light_pick_prob = 1.0 / lights.len() as Float;
        let light = &lights[ctx.rng.bounded_u32(lights.len() as u32) as usize];

        let illumination = match light.illuminate(&IlluminateParam {
            shading_position: shading.position,
            wavelength: &ctx.wavelength,
            sample: ctx.rng.uniform_vec2(),
        }) {
            Some(illumination) => illumination,
            None => return Color::ZERO,
        };
        if illumination.direct_pdf_w <= 0.0 || illumination.color.is_black() {
            return Color::ZERO;
        }

        let incoming_dir = shading.world_to_local(&illumination.direction_to_light);
        let eval = shading.material.evaluate_bsdf(&EvaluationContext {
            params: &shading.params,
            wavelength: &ctx.wavelength,
            outgoing_dir: shading.outgoing_dir_local,
            incoming_dir,
        });
        if eval.color.is_black() {
            return Color::ZERO;
        }

        ctx.counters.num_shadow_rays += 1;
        let shadow_ray = Ray::new(
            shading.offset_origin(&illumination.direction_to_light),
            illumination.direction_to_light,
            ctx.time,
        );
        if self
            .scene
            .any_hit(&shadow_ray, illumination.distance * SHADOW_RAY_SHORTENING)
        {
            return Color::ZERO;
        }

        // A delta light cannot be reached by BSDF sampling, so it takes the
        // full weight.
        let weight = if light.is_delta() {
            1.0
        } else {
            power_heuristic(
                illumination.direct_pdf_w * light_pick_prob,
                eval.direct_pdf,
            )
        };

        illumination.color * eval.color
            * (weight / (light_pick_prob * illumination.direct_pdf_w))
    }

    /// Emission picked up by hitting a light's geometry (or escaping to the
    /// background), weighted against the previous BSDF sample.
    fn emission_with_mis(
        light: &Light,
        ray: &Ray,
        distance: Float,
        light_pick_prob: Float,
        last_was_delta: bool,
        last_bsdf_pdf: Float,
        ctx: &RenderingContext,
    ) -> Color {
        match light.get_radiance(ray, distance, &ctx.wavelength) {
            Some(radiance) => {
                let weight = Self::bsdf_mis_weight(
                    last_was_delta,
                    last_bsdf_pdf,
                    radiance.direct_pdf_w * light_pick_prob,
                );
                radiance.color * weight
            }
            None => Color::ZERO,
        }
    }
}

impl<S: Scene> Renderer for PathTracer<S> {
    /// Integrate the radiance arriving along a primary ray.
    ///
    /// * `ray` - The primary ray.
    /// * `ctx` - The worker's rendering context.
    fn render_pixel(&self, ray: &Ray, ctx: &mut RenderingContext) -> Color {
        let mut radiance = Color::ZERO;
        let mut throughput = Color::ONE;
        let mut ray = *ray;
        let mut last_bsdf_pdf = 0.0;
        let mut last_was_delta = true; // primary hits take full emission
        let mut depth = 0u32;

        let light_count = self.scene.lights().len();
        let light_pick_prob = if light_count > 0 {
            1.0 / light_count as Float
        } else {
            0.0
        };

        loop {
            ctx.counters.num_rays += 1;
            let hit = self.scene.closest_hit(&ray);

            if !hit.is_hit() {
                // Escaped: the background is the only light along this ray.
                if let Some((_, background)) = self.scene.background_light() {
                    radiance += throughput
                        * Self::emission_with_mis(
                            background,
                            &ray,
                            aurora_core::light::LIGHT_DISTANCE_INFINITY,
                            light_pick_prob,
                            last_was_delta,
                            last_bsdf_pdf,
                            ctx,
                        );
                }
                break;
            }

            // Emission on hit.
            if let Some((_, light)) = self.scene.light_for_hit(&hit) {
                radiance += throughput
                    * Self::emission_with_mis(
                        light,
                        &ray,
                        hit.distance,
                        light_pick_prob,
                        last_was_delta,
                        last_bsdf_pdf,
                        ctx,
                    );
            }

            if depth >= ctx.params.max_ray_depth {
                break;
            }

            let shading = self.scene.extract_shading_data(&ray, &hit);

            // Next-event estimation. A delta BSDF cannot produce a non-zero
            // value for a sampled light direction, so skip it entirely.
            if !Material::is_delta(&shading.params) {
                radiance += throughput * self.sample_direct_light(&shading, ctx);
            }

            // Continue the path by sampling the BSDF.
            let sample = {
                let mut sampling_ctx = SamplingContext {
                    params: &shading.params,
                    outgoing_dir: shading.outgoing_dir_local,
                    wavelength: &mut ctx.wavelength,
                    rng: &mut ctx.rng,
                };
                match shading.material.sample_bsdf(&mut sampling_ctx) {
                    Some(sample) => sample,
                    None => break,
                }
            };
            if sample.pdf <= 0.0 {
                break;
            }

            throughput *= sample.weight;
            if !throughput.is_valid() {
                // Numerical anomaly: discard the whole sample.
                ctx.counters.num_discarded_samples += 1;
                log::debug!("discarding sample with invalid throughput at depth {}", depth);
                return Color::ZERO;
            }
            if throughput.is_black() {
                break;
            }

            last_bsdf_pdf = sample.pdf;
            last_was_delta = sample.event.is_delta();

            let world_dir = shading.local_to_world(&sample.incoming_dir).normalize();
            ray = Ray::new(shading.offset_origin(&world_dir), world_dir, ray.time);

            // Russian roulette.
            depth += 1;
            if depth >= ctx.params.min_russian_roulette_depth {
                let q = min(throughput.max_component(), 0.95);
                if ctx.rng.uniform() >= q {
                    break;
                }
                throughput /= q;
            }
        }

        if !radiance.is_valid() {
            ctx.counters.num_discarded_samples += 1;
            return Color::ZERO;
        }
        radiance
    }
}
