//! Oren-Nayar diffuse reflection.

use super::*;
use crate::color::*;
use crate::sampling::{cosine_hemisphere_pdf, cosine_sample_hemisphere};
use aurora_math::*;

/// Diffuse reflection with the Oren-Nayar roughness model. Zero roughness
/// reduces exactly to Lambert.
#[derive(Copy, Clone, Debug, Default)]
pub struct DiffuseBsdf;

impl DiffuseBsdf {
    /// Get debug name.
    pub fn name(&self) -> &'static str {
        "diffuse"
    }

    /// Precompute the Oren-Nayar A and B terms for a roughness value,
    /// treating roughness as the facet-angle deviation σ in radians.
    ///
    /// * `roughness` - Surface roughness.
    fn oren_nayar_terms(roughness: Float) -> (Float, Float) {
        let sigma2 = roughness * roughness;
        let a = 1.0 - sigma2 / (2.0 * (sigma2 + 0.33));
        let b = 0.45 * sigma2 / (sigma2 + 0.09);
        (a, b)
    }

    /// Importance sample the lobe (cosine-weighted hemisphere).
    ///
    /// * `ctx` - The sampling context.
    pub fn sample(&self, ctx: &mut SamplingContext) -> Option<BsdfSample> {
        if ctx.outgoing_dir.z < COS_EPSILON {
            return None;
        }

        let incoming_dir = cosine_sample_hemisphere(&ctx.rng.uniform_vec2());
        if incoming_dir.z < COS_EPSILON {
            return None;
        }

        let eval = self.evaluate(&EvaluationContext {
            params: ctx.params,
            wavelength: ctx.wavelength,
            outgoing_dir: ctx.outgoing_dir,
            incoming_dir,
        });
        let pdf = cosine_hemisphere_pdf(incoming_dir.z);
        if eval.color.is_black() {
            return None;
        }

        Some(BsdfSample {
            incoming_dir,
            weight: eval.color / pdf,
            pdf,
            event: BsdfEvent(DIFFUSE_REFLECTION),
        })
    }

    /// Evaluate the lobe: `f·|cosθi|` and the cosine-hemisphere PDF.
    ///
    /// * `ctx` - The evaluation context.
    pub fn evaluate(&self, ctx: &EvaluationContext) -> BsdfEvaluation {
        let n_dot_v = ctx.outgoing_dir.z;
        let n_dot_l = ctx.incoming_dir.z;
        if n_dot_v < COS_EPSILON || n_dot_l < COS_EPSILON {
            return BsdfEvaluation::ZERO;
        }

        let (a, b) = Self::oren_nayar_terms(ctx.params.roughness);

        // cos(φi - φo) term, zero at either pole.
        let sin_theta_i = safe_sqrt(1.0 - n_dot_l * n_dot_l);
        let sin_theta_o = safe_sqrt(1.0 - n_dot_v * n_dot_v);
        let max_cos = if sin_theta_i > 1.0e-4 && sin_theta_o > 1.0e-4 {
            let inv_i = 1.0 / sin_theta_i;
            let inv_o = 1.0 / sin_theta_o;
            let cos_d_phi = (ctx.incoming_dir.x * ctx.outgoing_dir.x
                + ctx.incoming_dir.y * ctx.outgoing_dir.y)
                * inv_i
                * inv_o;
            max(0.0, cos_d_phi)
        } else {
            0.0
        };

        // sin(α)·tan(β) with α the larger and β the smaller polar angle.
        let (sin_alpha, tan_beta) = if n_dot_l > n_dot_v {
            (sin_theta_o, sin_theta_i / n_dot_l)
        } else {
            (sin_theta_i, sin_theta_o / n_dot_v)
        };

        let factor = INV_PI * (a + b * max_cos * sin_alpha * tan_beta) * n_dot_l;
        BsdfEvaluation {
            color: Color::sample_rgb(ctx.wavelength, &ctx.params.base_color) * factor,
            direct_pdf: cosine_hemisphere_pdf(n_dot_l),
        }
    }

    /// PDF of the cosine-weighted hemisphere sampling.
    ///
    /// * `ctx` - The evaluation context.
    pub fn pdf(&self, ctx: &EvaluationContext) -> Float {
        if ctx.outgoing_dir.z < COS_EPSILON || ctx.incoming_dir.z < COS_EPSILON {
            return 0.0;
        }
        cosine_hemisphere_pdf(ctx.incoming_dir.z)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
