//! BSDF layer.
//!
//! Handles both reflection and transmission at a surface point. All
//! calculations are performed in the local frame of the hit point: +X is the
//! tangent, +Z is the shading normal. Both the outgoing and incoming
//! directions point away from the surface.
//!
//! Lobes are a closed sum type; dispatch is a small match so the hot cases
//! inline.

use crate::color::*;
use crate::material::SampledMaterialParameters;
use crate::rng::Rng;
use aurora_math::*;

mod conductor;
mod dielectric;
mod diffuse;
mod event;
mod fresnel;
mod microfacet;
mod plastic;
mod rough_dielectric;

// Re-export
pub use conductor::*;
pub use dielectric::*;
pub use diffuse::*;
pub use event::*;
pub use fresnel::*;
pub use microfacet::*;
pub use plastic::*;
pub use rough_dielectric::*;

/// Directions at more grazing angles than this cosine make the BSDF
/// early-return zero, so no division by cosθ can blow up.
pub const COS_EPSILON: Float = 1.0e-5;

/// Roughness below this threshold collapses a glossy lobe to a perfectly
/// specular one; the sampling PDF would otherwise grow without bound.
pub const SPECULAR_ROUGHNESS_THRESHOLD: Float = 0.005;

/// Inputs for importance sampling a BSDF. The wavelength is mutable because
/// sampling can trigger dispersion.
pub struct SamplingContext<'a> {
    /// Material parameters resolved at the hit point.
    pub params: &'a SampledMaterialParameters,

    /// Outgoing direction in the local frame, pointing away from the surface.
    pub outgoing_dir: Vec3,

    /// Wavelength carrier of the current path.
    pub wavelength: &'a mut Wavelength,

    /// Random stream of the current worker.
    pub rng: &'a mut Rng,
}

/// Inputs for evaluating a BSDF for a known pair of directions.
pub struct EvaluationContext<'a> {
    /// Material parameters resolved at the hit point.
    pub params: &'a SampledMaterialParameters,

    /// Wavelength carrier of the current path.
    pub wavelength: &'a Wavelength,

    /// Outgoing direction in the local frame, pointing away from the surface.
    pub outgoing_dir: Vec3,

    /// Incoming direction in the local frame, pointing away from the surface.
    pub incoming_dir: Vec3,
}

/// Result of importance sampling a BSDF.
#[derive(Copy, Clone, Debug)]
pub struct BsdfSample {
    /// Sampled incoming direction in the local frame.
    pub incoming_dir: Vec3,

    /// Scattering weight `f(ωo,ωi)·|cosθi| / pdf`; the integrator multiplies
    /// the path throughput by this value directly.
    pub weight: Color,

    /// Sampling PDF of the returned direction. 1 for delta events.
    pub pdf: Float,

    /// The sampled event type.
    pub event: BsdfEvent,
}

/// Result of evaluating a BSDF.
#[derive(Copy, Clone, Debug, Default)]
pub struct BsdfEvaluation {
    /// `f(ωo,ωi)·|cosθi|`.
    pub color: Color,

    /// PDF of sampling `ωi` from `ωo`, for MIS against light sampling.
    pub direct_pdf: Float,
}

impl BsdfEvaluation {
    /// The zero evaluation: grazing or unsupported direction pair.
    pub const ZERO: Self = Self {
        color: Color::ZERO,
        direct_pdf: 0.0,
    };
}

/// Refract a direction about a unit normal.
///
/// * `w`   - Direction pointing away from the surface, on the same side as `n`.
/// * `n`   - Unit normal, oriented to the side of `w`.
/// * `eta` - Ratio of incident to transmitted index of refraction.
///
/// Returns `None` on total internal reflection.
pub fn refract(w: &Vec3, n: &Vec3, eta: Float) -> Option<Vec3> {
    let cos_theta_i = n.dot(w);
    let sin2_theta_t = eta * eta * (1.0 - cos_theta_i * cos_theta_i);
    if sin2_theta_t >= 1.0 {
        return None;
    }
    let cos_theta_t = safe_sqrt(1.0 - sin2_theta_t);
    Some(-*w * eta + *n * (eta * cos_theta_i - cos_theta_t))
}

/// Polymorphic BSDF lobe.
pub enum Bsdf {
    Diffuse(DiffuseBsdf),
    RoughConductor(RoughConductorBsdf),
    Dielectric(DielectricBsdf),
    RoughDielectric(RoughDielectricBsdf),
    Plastic(PlasticBsdf),
}

impl Bsdf {
    /// Get debug name.
    pub fn name(&self) -> &'static str {
        match self {
            Bsdf::Diffuse(b) => b.name(),
            Bsdf::RoughConductor(b) => b.name(),
            Bsdf::Dielectric(b) => b.name(),
            Bsdf::RoughDielectric(b) => b.name(),
            Bsdf::Plastic(b) => b.name(),
        }
    }

    /// Importance sample the lobe: generate an incoming direction for the
    /// given outgoing direction. Returns `None` at grazing angles, for
    /// inconsistent material parameters, or when the sampled branch
    /// degenerates to zero.
    ///
    /// * `ctx` - The sampling context.
    pub fn sample(&self, ctx: &mut SamplingContext) -> Option<BsdfSample> {
        match self {
            Bsdf::Diffuse(b) => b.sample(ctx),
            Bsdf::RoughConductor(b) => b.sample(ctx),
            Bsdf::Dielectric(b) => b.sample(ctx),
            Bsdf::RoughDielectric(b) => b.sample(ctx),
            Bsdf::Plastic(b) => b.sample(ctx),
        }
    }

    /// Evaluate the lobe for a known pair of directions. The result is
    /// `f·|cosθi|` with the direct-sampling PDF; zero for delta lobes and for
    /// direction pairs outside the lobe's support.
    ///
    /// * `ctx` - The evaluation context.
    pub fn evaluate(&self, ctx: &EvaluationContext) -> BsdfEvaluation {
        match self {
            Bsdf::Diffuse(b) => b.evaluate(ctx),
            Bsdf::RoughConductor(b) => b.evaluate(ctx),
            Bsdf::Dielectric(b) => b.evaluate(ctx),
            Bsdf::RoughDielectric(b) => b.evaluate(ctx),
            Bsdf::Plastic(b) => b.evaluate(ctx),
        }
    }

    /// PDF of sampling `incoming_dir` from `outgoing_dir`. Zero for delta
    /// lobes.
    ///
    /// * `ctx` - The evaluation context.
    pub fn pdf(&self, ctx: &EvaluationContext) -> Float {
        match self {
            Bsdf::Diffuse(b) => b.pdf(ctx),
            Bsdf::RoughConductor(b) => b.pdf(ctx),
            Bsdf::Dielectric(b) => b.pdf(ctx),
            Bsdf::RoughDielectric(b) => b.pdf(ctx),
            Bsdf::Plastic(b) => b.pdf(ctx),
        }
    }

    /// Returns true if every direction this lobe can sample is a delta
    /// direction for the given parameters.
    ///
    /// * `params` - Material parameters resolved at the hit point.
    pub fn is_delta(&self, params: &SampledMaterialParameters) -> bool {
        match self {
            Bsdf::Diffuse(_) => false,
            Bsdf::RoughConductor(_) | Bsdf::RoughDielectric(_) => {
                params.roughness < SPECULAR_ROUGHNESS_THRESHOLD
            }
            Bsdf::Dielectric(_) => true,
            // The plastic's diffuse layer always has non-zero measure.
            Bsdf::Plastic(_) => false,
        }
    }
}

macro_rules! bsdf_from {
    ($struct: ty, $enum: ident) => {
        impl From<$struct> for Bsdf {
            /// Wraps $struct in Bsdf::$enum.
            fn from(bsdf: $struct) -> Self {
                Self::$enum(bsdf)
            }
        }
    };
}
bsdf_from!(DiffuseBsdf, Diffuse);
bsdf_from!(RoughConductorBsdf, RoughConductor);
bsdf_from!(DielectricBsdf, Dielectric);
bsdf_from!(RoughDielectricBsdf, RoughDielectric);
bsdf_from!(PlasticBsdf, Plastic);
