//! Piecewise-constant sampling distributions.
//!
//! Used by the background light to importance sample an environment map by
//! luminance.

use aurora_math::{clamp, Float, Point2};

/// Piecewise-constant 1-D distribution over [0, 1].
pub struct Distribution1D {
    /// The unnormalized function values.
    pub func: Vec<Float>,

    /// Cumulative distribution, `func.len() + 1` entries.
    pub cdf: Vec<Float>,

    /// The integral of the function over [0, 1].
    pub func_int: Float,
}

impl Distribution1D {
    /// Create a distribution from unnormalized function values.
    ///
    /// * `func` - The function values; must be non-empty and non-negative.
    pub fn new(func: Vec<Float>) -> Self {
        debug_assert!(!func.is_empty());
        let n = func.len();

        // Compute the integral of the step function.
        let mut cdf = Vec::with_capacity(n + 1);
        cdf.push(0.0);
        for i in 1..=n {
            debug_assert!(func[i - 1] >= 0.0);
            cdf.push(cdf[i - 1] + func[i - 1] / n as Float);
        }

        // Transform the step function integral into a CDF. A zero function
        // falls back to the uniform distribution.
        let func_int = cdf[n];
        if func_int == 0.0 {
            for (i, v) in cdf.iter_mut().enumerate().skip(1) {
                *v = i as Float / n as Float;
            }
        } else {
            for v in cdf.iter_mut().skip(1) {
                *v /= func_int;
            }
        }

        Self { func, cdf, func_int }
    }

    /// Number of function values.
    pub fn count(&self) -> usize {
        self.func.len()
    }

    /// Sample a continuous value in [0, 1]. Returns the value, its PDF and
    /// the index of the selected interval.
    ///
    /// * `u` - Uniform sample.
    pub fn sample_continuous(&self, u: Float) -> (Float, Float, usize) {
        // Find the interval bracketing `u` in the CDF.
        let offset = match self
            .cdf
            .partition_point(|&c| c <= u)
            .checked_sub(1)
        {
            Some(o) => aurora_math::min(o, self.count() - 1),
            None => 0,
        };

        // Compute the offset within the interval.
        let mut du = u - self.cdf[offset];
        let width = self.cdf[offset + 1] - self.cdf[offset];
        if width > 0.0 {
            du /= width;
        }

        let pdf = if self.func_int > 0.0 {
            self.func[offset] / self.func_int
        } else {
            1.0
        };
        let x = (offset as Float + du) / self.count() as Float;
        (x, pdf, offset)
    }

    /// Returns the PDF of sampling the interval containing `x`.
    ///
    /// * `x` - Position in [0, 1].
    pub fn pdf(&self, x: Float) -> Float {
        if self.func_int == 0.0 {
            return 1.0;
        }
        let i = clamp((x * self.count() as Float) as usize, 0, self.count() - 1);
        self.func[i] / self.func_int
    }
}

/// Piecewise-constant 2-D distribution over [0, 1]².
pub struct Distribution2D {
    /// One conditional distribution per row.
    conditional: Vec<Distribution1D>,

    /// Marginal distribution over rows.
    marginal: Distribution1D,
}

impl Distribution2D {
    /// Create a distribution from a row-major grid of function values.
    ///
    /// * `func` - The function values, `width * height` entries.
    /// * `width`  - Grid width.
    /// * `height` - Grid height.
    pub fn new(func: &[Float], width: usize, height: usize) -> Self {
        debug_assert_eq!(func.len(), width * height);
        let conditional: Vec<Distribution1D> = (0..height)
            .map(|y| Distribution1D::new(func[y * width..(y + 1) * width].to_vec()))
            .collect();
        let marginal =
            Distribution1D::new(conditional.iter().map(|c| c.func_int).collect());
        Self {
            conditional,
            marginal,
        }
    }

    /// Sample a continuous position in [0, 1]². Returns the position and its
    /// joint PDF.
    ///
    /// * `u` - Uniform sample point.
    pub fn sample_continuous(&self, u: &Point2) -> (Point2, Float) {
        let (y, pdf_y, row) = self.marginal.sample_continuous(u.y);
        let (x, pdf_x, _) = self.conditional[row].sample_continuous(u.x);
        (Point2::new(x, y), pdf_x * pdf_y)
    }

    /// Returns the joint PDF of sampling position `p`.
    ///
    /// * `p` - Position in [0, 1]².
    pub fn pdf(&self, p: &Point2) -> Float {
        let h = self.conditional.len();
        let w = self.conditional[0].count();
        let iy = clamp((p.y * h as Float) as usize, 0, h - 1);
        let ix = clamp((p.x * w as Float) as usize, 0, w - 1);
        if self.marginal.func_int == 0.0 {
            return 1.0;
        }
        self.conditional[iy].func[ix] / self.marginal.func_int
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Rng;

    #[test]
    fn uniform_function_has_unit_pdf() {
        let d = Distribution1D::new(vec![1.0; 8]);
        let (x, pdf, _) = d.sample_continuous(0.3);
        assert!((pdf - 1.0).abs() < 1.0e-5);
        assert!((x - 0.3).abs() < 1.0e-5);
    }

    #[test]
    fn skewed_function_prefers_heavy_bins() {
        let d = Distribution1D::new(vec![0.0, 0.0, 0.0, 1.0]);
        let mut rng = Rng::new(5);
        for _ in 0..1000 {
            let (x, pdf, _) = d.sample_continuous(rng.uniform());
            assert!(x >= 0.75 - 1.0e-5);
            assert!((pdf - 4.0).abs() < 1.0e-4);
        }
    }

    #[test]
    fn pdf_matches_sample_pdf() {
        let d = Distribution1D::new(vec![1.0, 3.0, 2.0, 0.5]);
        let mut rng = Rng::new(9);
        for _ in 0..1000 {
            let (x, pdf, _) = d.sample_continuous(rng.uniform());
            assert!((d.pdf(x) - pdf).abs() < 1.0e-4);
        }
    }

    // The 2-D joint PDF must integrate to one over the unit square.
    #[test]
    fn joint_pdf_normalizes() {
        let func: Vec<Float> = (0..64).map(|i| (i % 7) as Float + 0.25).collect();
        let d = Distribution2D::new(&func, 8, 8);
        let mut rng = Rng::new(13);
        let n = 20_000;
        let mut estimate = 0.0f64;
        for _ in 0..n {
            let p = Point2::new(rng.uniform(), rng.uniform());
            estimate += d.pdf(&p) as f64;
        }
        estimate /= n as f64;
        assert!((estimate - 1.0).abs() < 0.02, "integral = {}", estimate);
    }
}
