//! Fresnel reflectance terms.

use aurora_math::{clamp, safe_sqrt, Float, Vec3};
use std::mem::swap;

/// Fresnel reflectance at a dielectric boundary for unpolarized light.
///
/// * `cos_theta_i` - cos(θi) between incident direction and surface normal;
///                   a negative value means the ray arrives from inside.
/// * `eta_i`       - Index of refraction of the incident medium.
/// * `eta_t`       - Index of refraction of the transmitted medium.
pub fn fr_dielectric(cos_theta_i: Float, eta_i: Float, eta_t: Float) -> Float {
    let mut cos_theta_i = clamp(cos_theta_i, -1.0, 1.0);
    let mut eta_i = eta_i;
    let mut eta_t = eta_t;

    // Potentially swap indices of refraction.
    let entering = cos_theta_i > 0.0;
    if !entering {
        swap(&mut eta_i, &mut eta_t);
        cos_theta_i = -cos_theta_i;
    }

    // Compute cos(θt) using Snell's law.
    let sin_theta_i = safe_sqrt(1.0 - cos_theta_i * cos_theta_i);
    let sin_theta_t = eta_i / eta_t * sin_theta_i;

    // Handle total internal reflection.
    if sin_theta_t >= 1.0 {
        1.0
    } else {
        let cos_theta_t = safe_sqrt(1.0 - sin_theta_t * sin_theta_t);
        let r_parl = ((eta_t * cos_theta_i) - (eta_i * cos_theta_t))
            / ((eta_t * cos_theta_i) + (eta_i * cos_theta_t));
        let r_perp = ((eta_i * cos_theta_i) - (eta_t * cos_theta_t))
            / ((eta_i * cos_theta_i) + (eta_t * cos_theta_t));
        (r_parl * r_parl + r_perp * r_perp) * 0.5
    }
}

/// Schlick's approximation for conductor reflectance.
///
/// * `f0`          - Reflectance at normal incidence.
/// * `cos_theta_i` - cos(θi) between incident direction and surface normal.
pub fn fr_schlick(f0: &Vec3, cos_theta_i: Float) -> Vec3 {
    let c = clamp(cos_theta_i, 0.0, 1.0);
    let m = 1.0 - c;
    let m2 = m * m;
    let m5 = m2 * m2 * m;
    *f0 + (Vec3::ONE - *f0) * m5
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
