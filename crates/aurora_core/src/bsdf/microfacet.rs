//! GGX (Trowbridge-Reitz) microfacet distribution, isotropic.
//!
//! All directions are in the local shading frame. The half-vector returned by
//! `sample_wh` is always in the +Z hemisphere.

use aurora_math::{max, safe_sqrt, Float, Point2, Vec3, INV_PI, TWO_PI};

/// Isotropic GGX distribution parameterized by perceptual roughness.
#[derive(Copy, Clone, Debug)]
pub struct Ggx {
    /// Width parameter α (squared perceptual roughness).
    alpha: Float,
}

impl Ggx {
    /// Create a distribution from perceptual roughness in [0, 1].
    ///
    /// * `roughness` - Perceptual roughness; α = roughness².
    pub fn new(roughness: Float) -> Self {
        Self {
            alpha: max(roughness * roughness, 1.0e-4),
        }
    }

    /// Differential area of microfacets with the given half-vector.
    ///
    /// * `wh` - Half-vector.
    pub fn d(&self, wh: &Vec3) -> Float {
        let cos2 = wh.z * wh.z;
        let a2 = self.alpha * self.alpha;
        let t = cos2 * (a2 - 1.0) + 1.0;
        a2 * INV_PI / (t * t)
    }

    /// Smith masking function Λ.
    ///
    /// * `w` - Direction.
    fn lambda(&self, w: &Vec3) -> Float {
        let cos2 = w.z * w.z;
        if cos2 >= 1.0 {
            return 0.0;
        }
        let tan2 = (1.0 - cos2) / cos2;
        0.5 * (-1.0 + (1.0 + self.alpha * self.alpha * tan2).sqrt())
    }

    /// Masking term for a single direction.
    ///
    /// * `w` - Direction.
    pub fn g1(&self, w: &Vec3) -> Float {
        1.0 / (1.0 + self.lambda(w))
    }

    /// Joint masking-shadowing term.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn g(&self, wo: &Vec3, wi: &Vec3) -> Float {
        1.0 / (1.0 + self.lambda(wo) + self.lambda(wi))
    }

    /// Sample a half-vector proportionally to `D(wh)·cosθh`.
    ///
    /// * `u` - The random sample point.
    pub fn sample_wh(&self, u: &Point2) -> Vec3 {
        let a2 = self.alpha * self.alpha;
        let tan2 = a2 * u.x / (1.0 - u.x);
        let cos_theta = 1.0 / (1.0 + tan2).sqrt();
        let sin_theta = safe_sqrt(1.0 - cos_theta * cos_theta);
        let phi = TWO_PI * u.y;
        Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
    }

    /// PDF of `sample_wh` with respect to solid angle of the half-vector.
    ///
    /// * `wh` - Half-vector.
    pub fn pdf_wh(&self, wh: &Vec3) -> Float {
        self.d(wh) * wh.z.abs()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Rng;
    use crate::sampling::uniform_sample_hemisphere;

    // The distribution of microfacet normals must satisfy
    // ∫ D(wh)·cosθh dwh = 1. Quadrature over the polar angle; the
    // distribution is too peaked at low roughness for uniform Monte Carlo.
    #[test]
    fn projected_area_normalizes() {
        for roughness in [0.05, 0.1, 0.3, 0.8] {
            let ggx = Ggx::new(roughness);
            let steps = 100_000;
            let dt = (std::f64::consts::PI / 2.0) / steps as f64;
            let mut integral = 0.0f64;
            for i in 0..steps {
                let theta = (i as f64 + 0.5) * dt;
                let wh = Vec3::new(theta.sin() as Float, 0.0, theta.cos() as Float);
                integral +=
                    ggx.d(&wh) as f64 * theta.cos() * theta.sin() * dt * std::f64::consts::TAU;
            }
            assert!(
                (integral - 1.0).abs() < 0.02,
                "roughness {}: integral = {}",
                roughness,
                integral
            );
        }
    }

    // The half-vector sampling PDF must integrate to one over the
    // hemisphere.
    #[test]
    fn sample_pdf_normalizes() {
        let ggx = Ggx::new(0.4);
        let steps = 100_000;
        let dt = (std::f64::consts::PI / 2.0) / steps as f64;
        let mut integral = 0.0f64;
        for i in 0..steps {
            let theta = (i as f64 + 0.5) * dt;
            let wh = Vec3::new(theta.sin() as Float, 0.0, theta.cos() as Float);
            integral += ggx.pdf_wh(&wh) as f64 * theta.sin() * dt * std::f64::consts::TAU;
        }
        assert!((integral - 1.0).abs() < 0.02, "integral = {}", integral);
    }

    #[test]
    fn sampled_half_vectors_are_unit_and_upper() {
        let ggx = Ggx::new(0.25);
        let mut rng = Rng::new(107);
        for _ in 0..10_000 {
            let wh = ggx.sample_wh(&rng.uniform_vec2());
            assert!((wh.length() - 1.0).abs() < 1.0e-4);
            assert!(wh.z > 0.0);
        }
    }

    #[test]
    fn masking_is_bounded() {
        let ggx = Ggx::new(0.5);
        let mut rng = Rng::new(109);
        for _ in 0..1000 {
            let w = uniform_sample_hemisphere(&rng.uniform_vec2());
            let g1 = ggx.g1(&w);
            assert!((0.0..=1.0).contains(&g1));
        }
    }
}
