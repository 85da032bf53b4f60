//! Rough conductor (metal) reflection: GGX + Schlick Fresnel.

use super::*;
use crate::color::*;
use aurora_math::*;

/// Rough metal BRDF. The base color acts as the reflectance at normal
/// incidence. Roughness under the specular threshold collapses the lobe to a
/// perfect mirror.
#[derive(Copy, Clone, Debug, Default)]
pub struct RoughConductorBsdf;

impl RoughConductorBsdf {
    /// Get debug name.
    pub fn name(&self) -> &'static str {
        "roughConductor"
    }

    /// Importance sample the lobe.
    ///
    /// * `ctx` - The sampling context.
    pub fn sample(&self, ctx: &mut SamplingContext) -> Option<BsdfSample> {
        let wo = ctx.outgoing_dir;
        if wo.z < COS_EPSILON {
            return None;
        }

        // Mirror fallback keeps the PDF bounded for very smooth surfaces.
        if ctx.params.roughness < SPECULAR_ROUGHNESS_THRESHOLD {
            let incoming_dir = Vec3::new(-wo.x, -wo.y, wo.z);
            let f = fr_schlick(&ctx.params.base_color, wo.z);
            return Some(BsdfSample {
                incoming_dir,
                weight: Color::sample_rgb(ctx.wavelength, &f),
                pdf: 1.0,
                event: BsdfEvent(SPECULAR_REFLECTION),
            });
        }

        let ggx = Ggx::new(ctx.params.roughness);
        let wh = ggx.sample_wh(&ctx.rng.uniform_vec2());
        let v_dot_h = wo.dot(&wh);
        if v_dot_h < COS_EPSILON {
            return None;
        }

        let incoming_dir = 2.0 * v_dot_h * wh - wo;
        if incoming_dir.z < COS_EPSILON {
            return None;
        }

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
            event: BsdfEvent(GLOSSY_REFLECTION),
        })
    }

    /// Evaluate the lobe: `D·G·F / (4·cosθo)` (the cosθi factors cancel).
    ///
    /// * `ctx` - The evaluation context.
    pub fn evaluate(&self, ctx: &EvaluationContext) -> BsdfEvaluation {
        if ctx.params.roughness < SPECULAR_ROUGHNESS_THRESHOLD {
            return BsdfEvaluation::ZERO;
        }

        let wo = ctx.outgoing_dir;
        let wi = ctx.incoming_dir;
        if wo.z < COS_EPSILON || wi.z < COS_EPSILON {
            return BsdfEvaluation::ZERO;
        }

        let wh = wo + wi;
        if wh.length_squared() < COS_EPSILON {
            return BsdfEvaluation::ZERO;
        }
        let wh = wh.normalize();

        let ggx = Ggx::new(ctx.params.roughness);
        let f = fr_schlick(&ctx.params.base_color, wo.dot(&wh));
        let factor = ggx.d(&wh) * ggx.g(&wo, &wi) / (4.0 * wo.z);

        BsdfEvaluation {
            color: Color::sample_rgb(ctx.wavelength, &f) * factor,
            direct_pdf: ggx.pdf_wh(&wh) / (4.0 * wo.dot(&wh).abs().max(COS_EPSILON)),
        }
    }

    /// PDF of the half-vector sampling mapped to incoming directions.
    ///
    /// * `ctx` - The evaluation context.
    pub fn pdf(&self, ctx: &EvaluationContext) -> Float {
        if ctx.params.roughness < SPECULAR_ROUGHNESS_THRESHOLD {
            return 0.0;
        }
        let wo = ctx.outgoing_dir;
        let wi = ctx.incoming_dir;
        if wo.z < COS_EPSILON || wi.z < COS_EPSILON {
            return 0.0;
        }
        let wh = wo + wi;
        if wh.length_squared() < COS_EPSILON {
            return 0.0;
        }
        let wh = wh.normalize();
        Ggx::new(ctx.params.roughness).pdf_wh(&wh) / (4.0 * wo.dot(&wh).abs().max(COS_EPSILON))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
