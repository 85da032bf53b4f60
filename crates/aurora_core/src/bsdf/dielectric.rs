//! Smooth dielectric: delta reflection and refraction.

use super::*;
use crate::color::*;
use aurora_math::*;

/// Perfectly smooth dielectric interface (glass, water). Both scattering
/// directions are delta distributed; `evaluate` is identically zero.
///
/// For dispersive media the refraction branch collapses the wavelength
/// carrier to a single channel and evaluates the index of refraction with
/// Cauchy's equation at that channel's wavelength.
#[derive(Copy, Clone, Debug, Default)]
pub struct DielectricBsdf;

impl DielectricBsdf {
    /// Get debug name.
    pub fn name(&self) -> &'static str {
        "dielectric"
    }

    /// Index of refraction for the current wavelength state via Cauchy's
    /// equation `n(λ) = B + C/λ²` (λ in micrometers).
    ///
    /// * `params`     - Material parameters.
    /// * `wavelength` - Wavelength carrier.
    fn ior(params: &SampledMaterialParameters, wavelength: &Wavelength) -> Float {
        if params.dispersive {
            let lambda_um = wavelength.value() * 1.0e-3;
            params.ior + params.dispersion_c / (lambda_um * lambda_um)
        } else {
            params.ior
        }
    }

    /// Importance sample the interface: choose reflection with the Fresnel
    /// probability, refraction otherwise.
    ///
    /// * `ctx` - The sampling context.
    pub fn sample(&self, ctx: &mut SamplingContext) -> Option<BsdfSample> {
        if ctx.params.ior <= 0.0 {
            return None;
        }
        let wo = ctx.outgoing_dir;
        if wo.z.abs() < COS_EPSILON {
            return None;
        }

        let ior = Self::ior(ctx.params, ctx.wavelength);
        let fresnel = fr_dielectric(wo.z, 1.0, ior);

        if ctx.rng.uniform() < fresnel {
            // Delta reflection; the Fresnel factor cancels against the branch
            // probability.
            return Some(BsdfSample {
                incoming_dir: Vec3::new(-wo.x, -wo.y, wo.z),
                weight: Color::sample_rgb(ctx.wavelength, &Vec3::ONE),
                pdf: fresnel,
                event: BsdfEvent(SPECULAR_REFLECTION),
            });
        }

        // Refraction branch. A dispersive medium collapses the carrier here:
        // one channel survives, compensated by the discrete pick probability.
        let mut compensation = 1.0;
        if ctx.params.dispersive && !ctx.wavelength.is_single() {
            let channel = ctx.rng.bounded_u32(NUM_CHANNELS as u32) as usize;
            ctx.wavelength.collapse(channel);
            compensation = NUM_CHANNELS as Float;
        }
        let ior = Self::ior(ctx.params, ctx.wavelength);

        let entering = wo.z > 0.0;
        let eta = if entering { 1.0 / ior } else { ior };
        let n = if entering { Vec3::UNIT_Z } else { -Vec3::UNIT_Z };

        // With the branch probability 1-F the total-internal-reflection case
        // (F = 1) never reaches this point; the guard covers the Fresnel
        // value computed before a dispersion collapse shifted the IoR.
        let incoming_dir = refract(&wo, &n, eta)?;
        let incoming_dir = incoming_dir.normalize();

        // Radiance is compressed or expanded by η² across the boundary.
        let radiance_scale = eta * eta;

        Some(BsdfSample {
            incoming_dir,
            weight: Color::sample_rgb(ctx.wavelength, &Vec3::ONE)
                * (radiance_scale * compensation),
            pdf: 1.0 - fresnel,
            event: BsdfEvent(SPECULAR_REFRACTION),
        })
    }

    /// Delta lobes cannot be evaluated for arbitrary direction pairs.
    ///
    /// * `_ctx` - The evaluation context.
    pub fn evaluate(&self, _ctx: &EvaluationContext) -> BsdfEvaluation {
        BsdfEvaluation::ZERO
    }

    /// Delta lobes have zero continuous density everywhere.
    ///
    /// * `_ctx` - The evaluation context.
    pub fn pdf(&self, _ctx: &EvaluationContext) -> Float {
        0.0
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
