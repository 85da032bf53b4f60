//! Rough dielectric: GGX microfacet reflection and refraction.

use super::*;
use crate::color::*;
use aurora_math::*;

/// Glossy dielectric interface (frosted glass). Roughness under the specular
/// threshold falls back to the smooth dielectric so the PDF stays bounded.
#[derive(Copy, Clone, Debug, Default)]
pub struct RoughDielectricBsdf;

impl RoughDielectricBsdf {
    /// Get debug name.
    pub fn name(&self) -> &'static str {
        "roughDielectric"
    }

    /// Relative index of refraction `η = n_transmitted / n_incident` for the
    /// side `wo` arrives from.
    ///
    /// * `wo`  - Outgoing direction in the local frame.
    /// * `ior` - Index of refraction of the interior.
    fn eta(wo: &Vec3, ior: Float) -> Float {
        if wo.z > 0.0 {
            ior
        } else {
            1.0 / ior
        }
    }

    /// Importance sample the interface.
    ///
    /// * `ctx` - The sampling context.
    pub fn sample(&self, ctx: &mut SamplingContext) -> Option<BsdfSample> {
        if ctx.params.roughness < SPECULAR_ROUGHNESS_THRESHOLD {
            return DielectricBsdf.sample(ctx);
        }

        let ior = ctx.params.ior;
        if ior <= 0.0 {
            return None;
        }
        let wo = ctx.outgoing_dir;
        if wo.z.abs() < COS_EPSILON {
            return None;
        }

        let ggx = Ggx::new(ctx.params.roughness);
        let wh = ggx.sample_wh(&ctx.rng.uniform_vec2());
        let d = wo.dot(&wh);
        if d.abs() < COS_EPSILON {
            return None;
        }

        let fresnel = fr_dielectric(d, 1.0, ior);
        let (incoming_dir, event) = if ctx.rng.uniform() < fresnel {
            let wi = 2.0 * d * wh - wo;
            if wi.z * wo.z <= 0.0 {
                return None;
            }
            (wi, BsdfEvent(GLOSSY_REFLECTION))
        } else {
            // Refract about the half-vector oriented towards `wo`.
            let wh_ff = if d > 0.0 { wh } else { -wh };
            let eta = 1.0 / Self::eta(&wo, ior);
            let wi = refract(&wo, &wh_ff, eta)?.normalize();
            if wi.z * wo.z >= 0.0 {
                return None;
            }
            (wi, BsdfEvent(GLOSSY_REFRACTION))
        };

        let eval_ctx = EvaluationContext {
            params: ctx.params,
            wavelength: ctx.wavelength,
            outgoing_dir: wo,
            incoming_dir,
        };
        let eval = self.evaluate(&eval_ctx);
        let pdf = self.pdf(&eval_ctx);
        if pdf <= 0.0 || eval.color.is_black() {
            return None;
        }

        Some(BsdfSample {
            incoming_dir,
            weight: eval.color / pdf,
            pdf,
            event,
        })
    }

    /// Evaluate the lobe for reflection or transmission direction pairs.
    ///
    /// * `ctx` - The evaluation context.
    pub fn evaluate(&self, ctx: &EvaluationContext) -> BsdfEvaluation {
        if ctx.params.roughness < SPECULAR_ROUGHNESS_THRESHOLD {
            return BsdfEvaluation::ZERO;
        }
        let ior = ctx.params.ior;
        if ior <= 0.0 {
            return BsdfEvaluation::ZERO;
        }

        let wo = ctx.outgoing_dir;
        let wi = ctx.incoming_dir;
        if wo.z.abs() < COS_EPSILON || wi.z.abs() < COS_EPSILON {
            return BsdfEvaluation::ZERO;
        }

        let ggx = Ggx::new(ctx.params.roughness);
        let white = Color::sample_rgb(ctx.wavelength, &Vec3::ONE);

        if wo.z * wi.z > 0.0 {
            // Reflection.
            let mut wh = wo + wi;
            if wh.length_squared() < COS_EPSILON {
                return BsdfEvaluation::ZERO;
            }
            wh = wh.normalize();
            if wh.z < 0.0 {
                wh = -wh;
            }

            let fresnel = fr_dielectric(wo.dot(&wh), 1.0, ior);
            let factor =
                ggx.d(&wh) * ggx.g(&wo, &wi) * fresnel / (4.0 * wo.z.abs());
            let direct_pdf = ggx.pdf_wh(&wh) * fresnel
                / (4.0 * wo.dot(&wh).abs().max(COS_EPSILON));
            BsdfEvaluation {
                color: white * factor,
                direct_pdf,
            }
        } else {
            // Transmission.
            let eta = Self::eta(&wo, ior);
            let mut wh = wo + wi * eta;
            if wh.length_squared() < COS_EPSILON {
                return BsdfEvaluation::ZERO;
            }
            wh = wh.normalize();
            if wh.z < 0.0 {
                wh = -wh;
            }

            // Directions must straddle the half-vector.
            if wo.dot(&wh) * wi.dot(&wh) > 0.0 {
                return BsdfEvaluation::ZERO;
            }

            let fresnel = fr_dielectric(wo.dot(&wh), 1.0, ior);
            let sqrt_denom = wo.dot(&wh) + eta * wi.dot(&wh);
            if sqrt_denom.abs() < COS_EPSILON {
                return BsdfEvaluation::ZERO;
            }

            // The η² change-of-variables term cancels against the 1/η²
            // radiance compression, leaving `f·cosθi` as below.
            let factor = (1.0 - fresnel) * ggx.d(&wh) * ggx.g(&wo, &wi)
                * wi.dot(&wh).abs()
                * wo.dot(&wh).abs()
                / (wo.z.abs() * sqrt_denom * sqrt_denom);

            let dwh_dwi =
                (eta * eta * wi.dot(&wh) / (sqrt_denom * sqrt_denom)).abs();
            let direct_pdf = ggx.pdf_wh(&wh) * dwh_dwi * (1.0 - fresnel);

            BsdfEvaluation {
                color: white * factor,
                direct_pdf,
            }
        }
    }

    /// PDF of the half-vector sampling mapped through reflection or
    /// refraction.
    ///
    /// * `ctx` - The evaluation context.
    pub fn pdf(&self, ctx: &EvaluationContext) -> Float {
        self.evaluate(ctx).direct_pdf
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::SampledMaterialParameters;
    use crate::rng::Rng;
    use aurora_math::Vec3;

    fn frosted(roughness: Float) -> SampledMaterialParameters {
        SampledMaterialParameters {
            base_color: Vec3::ONE,
            roughness,
            ior: 1.5,
            transmission: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn low_roughness_delegates_to_smooth() {
        let p = frosted(0.001);
        let mut w = Wavelength::default();
        let mut rng = Rng::new(21);
        let mut ctx = SamplingContext {
            params: &p,
            outgoing_dir: Vec3::new(0.1, 0.2, 0.97).normalize(),
            wavelength: &mut w,
            rng: &mut rng,
        };
        let sample = RoughDielectricBsdf.sample(&mut ctx).unwrap();
        assert!(sample.event.is_delta());
    }

    #[test]
    fn sample_is_consistent_with_evaluate() {
        let p = frosted(0.35);
        let mut w = Wavelength::default();
        let mut rng = Rng::new(23);
        let wo = Vec3::new(0.3, -0.2, 0.93).normalize();
        let mut tested = 0;
        for _ in 0..500 {
            let mut ctx = SamplingContext {
                params: &p,
                outgoing_dir: wo,
                wavelength: &mut w,
                rng: &mut rng,
            };
            if let Some(sample) = RoughDielectricBsdf.sample(&mut ctx) {
                let eval_ctx = EvaluationContext {
                    params: &p,
                    wavelength: &Wavelength::default(),
                    outgoing_dir: wo,
                    incoming_dir: sample.incoming_dir,
                };
                let eval = RoughDielectricBsdf.evaluate(&eval_ctx);
                let expected = eval.color / sample.pdf;
                assert!(
                    (sample.weight.g - expected.g).abs() <= 0.01 * expected.g.max(1.0e-6),
                    "weight {} vs eval/pdf {}",
                    sample.weight.g,
                    expected.g
                );
                tested += 1;
            }
        }
        assert!(tested > 100);
    }

    #[test]
    fn both_scattering_modes_occur() {
        let p = frosted(0.35);
        let mut w = Wavelength::default();
        let mut rng = Rng::new(27);
        let wo = Vec3::new(0.4, 0.0, 0.9165).normalize();
        let mut reflections = 0;
        let mut refractions = 0;
        for _ in 0..1000 {
            let mut ctx = SamplingContext {
                params: &p,
                outgoing_dir: wo,
                wavelength: &mut w,
                rng: &mut rng,
            };
            if let Some(sample) = RoughDielectricBsdf.sample(&mut ctx) {
                if sample.event.matches(GLOSSY_REFLECTION) {
                    reflections += 1;
                } else if sample.event.matches(GLOSSY_REFRACTION) {
                    refractions += 1;
                }
            }
        }
        assert!(reflections > 0);
        // Most energy transmits through glass at near-normal incidence.
        assert!(refractions > reflections);
    }
}
