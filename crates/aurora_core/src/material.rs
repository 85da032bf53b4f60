//! Material description and per-hit lobe composition.

use crate::bsdf::*;
use crate::color::{Color, Wavelength};
use crate::texture::{sample_bilinear, Bitmap};
use aurora_math::{Float, Point2, Vec3};
use std::sync::Arc;

/// Material parameters resolved at a single hit point. Small value struct
/// passed by value through the BSDF interface.
#[derive(Copy, Clone, Debug, Default)]
pub struct SampledMaterialParameters {
    /// Base color (albedo for diffuse, reflectance at normal incidence for
    /// conductors).
    pub base_color: Vec3,

    /// Surface roughness in [0, 1].
    pub roughness: Float,

    /// Metallic layer weight in [0, 1].
    pub metalness: Float,

    /// Index of refraction of the interior medium.
    pub ior: Float,

    /// Emitted radiance.
    pub emission: Vec3,

    /// Transmissive layer weight in [0, 1].
    pub transmission: Float,

    /// Whether the medium is dispersive.
    pub dispersive: bool,

    /// Cauchy C coefficient (µm²) for dispersive media.
    pub dispersion_c: Float,
}

/// A material: lobe composition description plus parameter textures.
/// Immutable for the duration of a render.
pub struct Material {
    /// Debug name.
    pub name: String,

    /// Base color.
    pub base_color: Vec3,

    /// Optional base color texture, modulating `base_color`.
    pub base_color_map: Option<Arc<dyn Bitmap>>,

    /// Surface roughness in [0, 1].
    pub roughness: Float,

    /// Optional roughness texture (red channel), modulating `roughness`.
    pub roughness_map: Option<Arc<dyn Bitmap>>,

    /// Metallic layer weight in [0, 1].
    pub metalness: Float,

    /// Index of refraction of the interior medium.
    pub ior: Float,

    /// Emitted radiance.
    pub emission: Vec3,

    /// Transmissive layer weight in [0, 1].
    pub transmission: Float,

    /// Whether the medium is dispersive.
    pub dispersive: bool,

    /// Cauchy C coefficient (µm²) for dispersive media.
    pub dispersion_c: Float,
}

impl Default for Material {
    /// A light-gray, slightly rough, non-metallic plastic.
    fn default() -> Self {
        Self {
            name: String::from("default"),
            base_color: Vec3::splat(0.7),
            base_color_map: None,
            roughness: 0.1,
            roughness_map: None,
            metalness: 0.0,
            ior: 1.5,
            emission: Vec3::ZERO,
            transmission: 0.0,
            dispersive: false,
            dispersion_c: 0.0,
        }
    }
}

/// The three lobes a material composes, keyed by layer weights.
enum Lobe {
    Metal,
    Transmissive,
    Base,
}

impl Material {
    /// Resolve the material parameters at a hit point, applying parameter
    /// textures.
    ///
    /// * `uv` - Texture coordinate of the hit.
    pub fn sample(&self, uv: &Point2) -> SampledMaterialParameters {
        let mut base_color = self.base_color;
        if let Some(map) = self.base_color_map.as_deref() {
            let texel = sample_bilinear(map, uv, false);
            base_color = base_color.mul_elements(&Vec3::new(texel[0], texel[1], texel[2]));
        }

        let mut roughness = self.roughness;
        if let Some(map) = self.roughness_map.as_deref() {
            roughness *= sample_bilinear(map, uv, true)[0];
        }

        SampledMaterialParameters {
            base_color,
            roughness,
            metalness: self.metalness,
            ior: self.ior,
            emission: self.emission,
            transmission: self.transmission,
            dispersive: self.dispersive,
            dispersion_c: self.dispersion_c,
        }
    }

    /// Returns true if the material emits light.
    pub fn is_emissive(&self) -> bool {
        self.emission.max_component() > 0.0
    }

    /// Emitted radiance in the current wavelength carrier.
    ///
    /// * `params`     - Resolved material parameters.
    /// * `wavelength` - Wavelength carrier.
    pub fn emission(params: &SampledMaterialParameters, wavelength: &Wavelength) -> Color {
        Color::sample_rgb(wavelength, &params.emission)
    }

    /// Layer weights `(metal, transmissive, base)`; they sum to one.
    ///
    /// * `params` - Resolved material parameters.
    fn layer_weights(params: &SampledMaterialParameters) -> (Float, Float, Float) {
        let metal = aurora_math::clamp(params.metalness, 0.0, 1.0);
        let transmissive = (1.0 - metal) * aurora_math::clamp(params.transmission, 0.0, 1.0);
        (metal, transmissive, 1.0 - metal - transmissive)
    }

    /// The lobe used by a layer for the given parameters.
    ///
    /// * `params` - Resolved material parameters.
    fn lobe_bsdf(lobe: &Lobe, params: &SampledMaterialParameters) -> Bsdf {
        match lobe {
            Lobe::Metal => Bsdf::from(RoughConductorBsdf),
            Lobe::Transmissive => {
                if params.roughness < SPECULAR_ROUGHNESS_THRESHOLD {
                    Bsdf::from(DielectricBsdf)
                } else {
                    Bsdf::from(RoughDielectricBsdf)
                }
            }
            Lobe::Base => {
                if params.ior > 1.0 {
                    Bsdf::from(PlasticBsdf)
                } else {
                    Bsdf::from(DiffuseBsdf)
                }
            }
        }
    }

    /// Returns true if every lobe with non-zero weight only produces delta
    /// directions; the integrator then skips next-event estimation.
    ///
    /// * `params` - Resolved material parameters.
    pub fn is_delta(params: &SampledMaterialParameters) -> bool {
        let (metal, transmissive, base) = Self::layer_weights(params);
        let mut delta = true;
        if metal > 0.0 {
            delta &= Self::lobe_bsdf(&Lobe::Metal, params).is_delta(params);
        }
        if transmissive > 0.0 {
            delta &= Self::lobe_bsdf(&Lobe::Transmissive, params).is_delta(params);
        }
        if base > 0.0 {
            delta &= Self::lobe_bsdf(&Lobe::Base, params).is_delta(params);
        }
        delta
    }

    /// Importance sample the composed material: pick a layer proportionally
    /// to its weight, sample its lobe, then re-weight non-delta samples by
    /// the full composite so the estimator matches `evaluate`.
    ///
    /// * `ctx` - The sampling context.
    pub fn sample_bsdf(&self, ctx: &mut SamplingContext) -> Option<BsdfSample> {
        let (metal, transmissive, _base) = Self::layer_weights(ctx.params);

        let r = ctx.rng.uniform();
        let (lobe, lobe_weight) = if r < metal {
            (Lobe::Metal, metal)
        } else if r < metal + transmissive {
            (Lobe::Transmissive, transmissive)
        } else {
            (Lobe::Base, 1.0 - metal - transmissive)
        };
        if lobe_weight <= 0.0 {
            return None;
        }

        let bsdf = Self::lobe_bsdf(&lobe, ctx.params);
        let mut sample = bsdf.sample(ctx)?;

        if sample.event.is_delta() {
            // Delta branch: the layer pick probability cancels against the
            // selection, only the PDF records it.
            sample.pdf *= lobe_weight;
            return Some(sample);
        }

        // Continuous branch: fold all non-delta lobes into the estimator.
        let eval_ctx = EvaluationContext {
            params: ctx.params,
            wavelength: ctx.wavelength,
            outgoing_dir: ctx.outgoing_dir,
            incoming_dir: sample.incoming_dir,
        };
        let eval = self.evaluate_bsdf(&eval_ctx);
        if eval.direct_pdf <= 0.0 || eval.color.is_black() {
            return None;
        }

        Some(BsdfSample {
            incoming_dir: sample.incoming_dir,
            weight: eval.color / eval.direct_pdf,
            pdf: eval.direct_pdf,
            event: sample.event,
        })
    }

    /// Evaluate the composed material: the layer-weighted sum of all
    /// non-delta lobes, with the matching weighted PDF.
    ///
    /// * `ctx` - The evaluation context.
    pub fn evaluate_bsdf(&self, ctx: &EvaluationContext) -> BsdfEvaluation {
        let (metal, transmissive, base) = Self::layer_weights(ctx.params);

        let mut color = Color::ZERO;
        let mut direct_pdf = 0.0;
        for (lobe, weight) in [
            (Lobe::Metal, metal),
            (Lobe::Transmissive, transmissive),
            (Lobe::Base, base),
        ] {
            if weight <= 0.0 {
                continue;
            }
            let eval = Self::lobe_bsdf(&lobe, ctx.params).evaluate(ctx);
            color += eval.color * weight;
            direct_pdf += eval.direct_pdf * weight;
        }

        BsdfEvaluation { color, direct_pdf }
    }

    /// PDF of `sample_bsdf` for a known direction pair.
    ///
    /// * `ctx` - The evaluation context.
    pub fn pdf_bsdf(&self, ctx: &EvaluationContext) -> Float {
        self.evaluate_bsdf(ctx).direct_pdf
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
