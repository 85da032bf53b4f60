//! Plastic: Fresnel-blended delta specular coat over a diffuse base.

use super::*;
use crate::color::*;
use crate::sampling::{cosine_hemisphere_pdf, cosine_sample_hemisphere};
use aurora_math::*;

/// Smooth plastic. A dielectric coating reflects specularly with the Fresnel
/// probability; the remainder scatters diffusely in the base.
///
/// The coat-vs-base branch probability is
/// `Fi / (Fi + (1−Fi)·max(baseColor))`, and `evaluate` reuses the exact same
/// expression so MIS weights stay consistent with sampling. The outgoing-side
/// Fresnel term uses the incoming cosine (`NdotL`), which keeps
/// `sample().weight == evaluate()/pdf()`; physically approximate.
#[derive(Copy, Clone, Debug, Default)]
pub struct PlasticBsdf;

impl PlasticBsdf {
    /// Get debug name.
    pub fn name(&self) -> &'static str {
        "plastic"
    }

    /// Probability of selecting the specular branch.
    ///
    /// * `fresnel`    - Fresnel reflectance at the outgoing direction.
    /// * `base_color` - Base color of the diffuse layer.
    fn specular_probability(fresnel: Float, base_color: &Vec3) -> Float {
        let specular_weight = fresnel;
        let diffuse_weight = (1.0 - fresnel) * base_color.max_component();
        specular_weight / (specular_weight + diffuse_weight)
    }

    /// Importance sample the lobe.
    ///
    /// * `ctx` - The sampling context.
    pub fn sample(&self, ctx: &mut SamplingContext) -> Option<BsdfSample> {
        let wo = ctx.outgoing_dir;
        let n_dot_v = wo.z;
        if n_dot_v < COS_EPSILON {
            return None;
        }
        let ior = ctx.params.ior;
        if ior <= 0.0 {
            return None;
        }

        let fi = fr_dielectric(n_dot_v, 1.0, ior);
        let specular_probability = Self::specular_probability(fi, &ctx.params.base_color);
        let diffuse_probability = 1.0 - specular_probability;

        if ctx.rng.uniform() < specular_probability {
            Some(BsdfSample {
                incoming_dir: Vec3::new(-wo.x, -wo.y, wo.z),
                weight: Color::sample_rgb(ctx.wavelength, &Vec3::ONE)
                    * (fi / specular_probability),
                pdf: specular_probability,
                event: BsdfEvent(SPECULAR_REFLECTION),
            })
        } else {
            let incoming_dir = cosine_sample_hemisphere(&ctx.rng.uniform_vec2());
            let n_dot_l = incoming_dir.z;
            if n_dot_l < COS_EPSILON || diffuse_probability <= 0.0 {
                return None;
            }

            let fo = fr_dielectric(n_dot_l, 1.0, ior);
            let weight = Color::sample_rgb(ctx.wavelength, &ctx.params.base_color)
                * ((1.0 - fi) * (1.0 - fo) / diffuse_probability);

            Some(BsdfSample {
                incoming_dir,
                weight,
                pdf: cosine_hemisphere_pdf(n_dot_l) * diffuse_probability,
                event: BsdfEvent(DIFFUSE_REFLECTION),
            })
        }
    }

    /// Evaluate the diffuse layer (the coat is delta and evaluates to zero).
    ///
    /// * `ctx` - The evaluation context.
    pub fn evaluate(&self, ctx: &EvaluationContext) -> BsdfEvaluation {
        let n_dot_v = ctx.outgoing_dir.z;
        let n_dot_l = ctx.incoming_dir.z;
        if n_dot_v < COS_EPSILON || n_dot_l < COS_EPSILON {
            return BsdfEvaluation::ZERO;
        }
        let ior = ctx.params.ior;
        if ior <= 0.0 {
            return BsdfEvaluation::ZERO;
        }

        let fi = fr_dielectric(n_dot_v, 1.0, ior);
        let fo = fr_dielectric(n_dot_l, 1.0, ior);

        // Same branch probability as `sample`.
        let diffuse_probability = 1.0 - Self::specular_probability(fi, &ctx.params.base_color);

        BsdfEvaluation {
            color: Color::sample_rgb(ctx.wavelength, &ctx.params.base_color)
                * (n_dot_l * INV_PI * (1.0 - fi) * (1.0 - fo)),
            direct_pdf: cosine_hemisphere_pdf(n_dot_l) * diffuse_probability,
        }
    }

    /// PDF of the diffuse branch (the delta coat carries no density).
    ///
    /// * `ctx` - The evaluation context.
    pub fn pdf(&self, ctx: &EvaluationContext) -> Float {
        self.evaluate(ctx).direct_pdf
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
