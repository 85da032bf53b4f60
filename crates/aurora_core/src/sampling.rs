//! Sampling routines shared by the BSDF layer, the lights and the camera.
//!
//! All hemisphere samples are in the local shading frame (+Z = normal).

use aurora_math::*;

/// Map a uniform square sample onto the unit disk with the concentric
/// mapping (area preserving, low distortion).
///
/// * `u` - The random sample point.
pub fn concentric_sample_disk(u: &Point2) -> Point2 {
    // Map uniform random numbers to [-1,1]^2.
    let ox = 2.0 * u.x - 1.0;
    let oy = 2.0 * u.y - 1.0;

    // Handle degeneracy at the origin.
    if ox == 0.0 && oy == 0.0 {
        return Point2::ZERO;
    }

    // Apply concentric mapping to point.
    let (r, theta) = if ox.abs() > oy.abs() {
        (ox, PI_OVER_FOUR * (oy / ox))
    } else {
        (oy, PI_OVER_TWO - PI_OVER_FOUR * (ox / oy))
    };

    Point2::new(r * theta.cos(), r * theta.sin())
}

/// Cosine-weighted hemisphere sample around +Z.
///
/// * `u` - The random sample point.
pub fn cosine_sample_hemisphere(u: &Point2) -> Vec3 {
    let d = concentric_sample_disk(u);
    let z = safe_sqrt(1.0 - d.length_squared());
    Vec3::new(d.x, d.y, z)
}

/// Returns the PDF of `cosine_sample_hemisphere` for a direction with the
/// given cosine.
///
/// * `cos_theta` - Cosine of the angle to the normal.
#[inline(always)]
pub fn cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    cos_theta * INV_PI
}

/// Uniformly sample a direction on the unit sphere.
///
/// * `u` - The random sample point.
pub fn uniform_sample_sphere(u: &Point2) -> Vec3 {
    let z = 1.0 - 2.0 * u.x;
    let r = safe_sqrt(1.0 - z * z);
    let phi = TWO_PI * u.y;
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Returns the PDF for uniformly sampling a direction from a sphere.
#[inline(always)]
pub fn uniform_sphere_pdf() -> Float {
    INV_FOUR_PI
}

/// Uniformly sample a direction on the hemisphere around +Z.
///
/// * `u` - The random sample point.
pub fn uniform_sample_hemisphere(u: &Point2) -> Vec3 {
    let z = u.x;
    let r = safe_sqrt(1.0 - z * z);
    let phi = TWO_PI * u.y;
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Returns the PDF for uniformly sampling a direction from a hemisphere.
#[inline(always)]
pub fn uniform_hemisphere_pdf() -> Float {
    INV_TWO_PI
}

/// Uniformly sample barycentric coordinates on a triangle.
///
/// * `u` - The random sample point.
pub fn uniform_sample_triangle(u: &Point2) -> Point2 {
    let su0 = u.x.sqrt();
    Point2::new(1.0 - su0, u.y * su0)
}

/// Sample a point in the unit hexagon (flat-top, inscribed in the unit
/// circle) by decomposing it into six triangles around the center.
///
/// * `u`      - The random sample point, used for the in-triangle position.
/// * `sector` - Uniform value selecting one of the six triangles.
pub fn sample_hexagon(u: &Point2, sector: Float) -> Point2 {
    let k = aurora_math::min((sector * 6.0) as usize, 5);
    let a0 = k as Float * (PI / 3.0);
    let a1 = (k + 1) as Float * (PI / 3.0);
    let v0 = Point2::new(a0.cos(), a0.sin());
    let v1 = Point2::new(a1.cos(), a1.sin());

    let b = uniform_sample_triangle(u);
    b.x * v0 + b.y * v1
}

/// Sample a point in the [-1, 1] square.
///
/// * `u` - The random sample point.
pub fn sample_square(u: &Point2) -> Point2 {
    Point2::new(2.0 * u.x - 1.0, 2.0 * u.y - 1.0)
}

/// Power heuristic (β = 2) weight for combining two single-sample
/// strategies. Degenerates correctly to 1 when the competing PDF is zero.
///
/// * `f_pdf` - PDF of the strategy that produced the sample.
/// * `g_pdf` - PDF of the competing strategy.
#[inline(always)]
pub fn power_heuristic(f_pdf: Float, g_pdf: Float) -> Float {
    let f2 = f_pdf * f_pdf;
    let g2 = g_pdf * g_pdf;
    f2 / (f2 + g2)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Rng;

    #[test]
    fn disk_samples_stay_inside_unit_circle() {
        let mut rng = Rng::new(17);
        for _ in 0..10_000 {
            let p = concentric_sample_disk(&rng.uniform_vec2());
            assert!(p.length_squared() <= 1.0 + 1.0e-5);
        }
    }

    #[test]
    fn cosine_hemisphere_is_unit_and_upper() {
        let mut rng = Rng::new(23);
        for _ in 0..10_000 {
            let v = cosine_sample_hemisphere(&rng.uniform_vec2());
            assert!((v.length() - 1.0).abs() < 1.0e-4);
            assert!(v.z >= 0.0);
        }
    }

    // Monte Carlo check that the cosine-hemisphere PDF integrates to one
    // over its support (estimated with uniform hemisphere sampling).
    #[test]
    fn cosine_hemisphere_pdf_normalizes() {
        let mut rng = Rng::new(29);
        let n = 10_000;
        let mut estimate = 0.0f64;
        for _ in 0..n {
            let v = uniform_sample_hemisphere(&rng.uniform_vec2());
            estimate += (cosine_hemisphere_pdf(v.z) / uniform_hemisphere_pdf()) as f64;
        }
        estimate /= n as f64;
        assert!((estimate - 1.0).abs() < 0.02, "integral = {}", estimate);
    }

    #[test]
    fn sphere_samples_are_unit() {
        let mut rng = Rng::new(31);
        for _ in 0..10_000 {
            let v = uniform_sample_sphere(&rng.uniform_vec2());
            assert!((v.length() - 1.0).abs() < 1.0e-4);
        }
    }

    #[test]
    fn hexagon_samples_stay_inside_unit_circle() {
        let mut rng = Rng::new(37);
        for _ in 0..10_000 {
            let s = rng.uniform();
            let p = sample_hexagon(&rng.uniform_vec2(), s);
            assert!(p.length_squared() <= 1.0 + 1.0e-5);
        }
    }

    #[test]
    fn triangle_barycentrics_are_valid() {
        let mut rng = Rng::new(41);
        for _ in 0..10_000 {
            let b = uniform_sample_triangle(&rng.uniform_vec2());
            assert!(b.x >= 0.0 && b.y >= 0.0 && b.x + b.y <= 1.0 + 1.0e-6);
        }
    }

    #[test]
    fn power_heuristic_degenerates_for_delta() {
        assert_eq!(power_heuristic(1.0, 0.0), 1.0);
        assert!((power_heuristic(1.0, 1.0) - 0.5).abs() < 1.0e-6);
        // Dominant PDF takes nearly all the weight.
        assert!(power_heuristic(100.0, 1.0) > 0.999);
    }
}
