//! Radiance color carrier and wavelength model.
//!
//! Color is carried as an RGB triple whose three channels double as a fixed
//! set of three sampled wavelengths (the CIE RGB primaries). A path starts
//! with all three channels live; specular transmission through a dispersive
//! medium collapses the carrier to a single channel for the rest of the path.

use aurora_math::{clamp, max, Float, Vec3};
use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign};

/// Number of wavelength channels in the carrier.
pub const NUM_CHANNELS: usize = 3;

/// Wavelengths of the carrier channels in nanometers (CIE RGB primaries).
pub const CHANNEL_WAVELENGTHS: [Float; NUM_CHANNELS] = [700.0, 546.1, 435.8];

/// The wavelength state carried along a path.
///
/// `collapsed` is `None` while all channels are live. Dispersion collapses it
/// to a channel index, an irreversible event within one path: every
/// subsequent color produced for the path stays in single-channel form.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Wavelength {
    collapsed: Option<usize>,
}

impl Wavelength {
    /// Returns true if the carrier has been collapsed to a single channel.
    #[inline(always)]
    pub fn is_single(&self) -> bool {
        self.collapsed.is_some()
    }

    /// Returns the collapsed channel index, if any.
    #[inline(always)]
    pub fn channel(&self) -> Option<usize> {
        self.collapsed
    }

    /// Returns the wavelength in nanometers to evaluate dispersive media at.
    /// Before collapse this is the middle (green) primary.
    pub fn value(&self) -> Float {
        CHANNEL_WAVELENGTHS[self.collapsed.unwrap_or(1)]
    }

    /// Collapse the carrier to a single channel. Collapsing an already
    /// collapsed carrier to a different channel is a programming error.
    ///
    /// * `channel` - The surviving channel index.
    pub fn collapse(&mut self, channel: usize) {
        debug_assert!(channel < NUM_CHANNELS);
        debug_assert!(
            self.collapsed.is_none() || self.collapsed == Some(channel),
            "wavelength carrier collapsed twice to different channels"
        );
        self.collapsed = Some(channel);
    }

    /// Restore the full carrier. Called once per path start.
    pub fn reset(&mut self) {
        self.collapsed = None;
    }
}

/// Linear RGB radiance value.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Color {
    pub r: Float,
    pub g: Float,
    pub b: Float,
}

impl Color {
    /// Black.
    pub const ZERO: Self = Self { r: 0.0, g: 0.0, b: 0.0 };

    /// White.
    pub const ONE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };

    /// Create a new `Color`.
    ///
    /// * `r` - Red component.
    /// * `g` - Green component.
    /// * `b` - Blue component.
    #[inline(always)]
    pub const fn new(r: Float, g: Float, b: Float) -> Self {
        Self { r, g, b }
    }

    /// Create a gray color with all channels set to the same value.
    ///
    /// * `v` - The value.
    #[inline(always)]
    pub const fn splat(v: Float) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Create a color from an RGB vector.
    ///
    /// * `v` - The vector.
    #[inline(always)]
    pub fn from_vec3(v: &Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    /// Sample an RGB reflectance/emission value into the carrier. Channels
    /// removed by a collapse stay zero so the single-wavelength form is
    /// preserved through multiplications.
    ///
    /// * `wavelength` - Current wavelength state.
    /// * `rgb`        - The RGB value.
    pub fn sample_rgb(wavelength: &Wavelength, rgb: &Vec3) -> Self {
        match wavelength.channel() {
            None => Self::new(rgb.x, rgb.y, rgb.z),
            Some(0) => Self::new(rgb.x, 0.0, 0.0),
            Some(1) => Self::new(0.0, rgb.y, 0.0),
            _ => Self::new(0.0, 0.0, rgb.z),
        }
    }

    /// Returns a channel by index.
    ///
    /// * `i` - Channel index.
    #[inline(always)]
    pub fn channel(&self, i: usize) -> Float {
        match i {
            0 => self.r,
            1 => self.g,
            _ => self.b,
        }
    }

    /// Returns true if all channels are zero.
    #[inline(always)]
    pub fn is_black(&self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }

    /// Returns the largest channel value.
    #[inline(always)]
    pub fn max_component(&self) -> Float {
        max(self.r, max(self.g, self.b))
    }

    /// Returns the luminance (Rec. 709 weights).
    #[inline(always)]
    pub fn luminance(&self) -> Float {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    /// Returns true if any channel is NaN.
    pub fn has_nans(&self) -> bool {
        self.r.is_nan() || self.g.is_nan() || self.b.is_nan()
    }

    /// Returns true if every channel is finite and non-negative. The
    /// integrator discards samples for which this fails.
    pub fn is_valid(&self) -> bool {
        self.r.is_finite()
            && self.g.is_finite()
            && self.b.is_finite()
            && self.r >= 0.0
            && self.g >= 0.0
            && self.b >= 0.0
    }

    /// Clamp every channel to [lo, hi].
    ///
    /// * `lo` - Lower bound.
    /// * `hi` - Upper bound.
    pub fn clamped(&self, lo: Float, hi: Float) -> Self {
        Self::new(
            clamp(self.r, lo, hi),
            clamp(self.g, lo, hi),
            clamp(self.b, lo, hi),
        )
    }

    /// Returns the color as an RGB vector.
    #[inline(always)]
    pub fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }
}

impl Add for Color {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Mul for Color {
    type Output = Self;

    /// Componentwise (filter) multiplication.
    fn mul(self, other: Self) -> Self {
        Self::new(self.r * other.r, self.g * other.g, self.b * other.b)
    }
}

impl MulAssign for Color {
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}

impl Mul<Float> for Color {
    type Output = Self;

    fn mul(self, s: Float) -> Self {
        Self::new(self.r * s, self.g * s, self.b * s)
    }
}

impl Mul<Color> for Float {
    type Output = Color;

    fn mul(self, c: Color) -> Color {
        c * self
    }
}

impl MulAssign<Float> for Color {
    fn mul_assign(&mut self, s: Float) {
        *self = *self * s;
    }
}

impl Div<Float> for Color {
    type Output = Self;

    fn div(self, s: Float) -> Self {
        debug_assert!(s != 0.0);
        let inv = 1.0 / s;
        self * inv
    }
}

impl DivAssign<Float> for Color {
    fn div_assign(&mut self, s: Float) {
        *self = *self / s;
    }
}

impl fmt::Display for Color {
    /// Formats the value using the given formatter.
    ///
    /// * `f` - Formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.r, self.g, self.b)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rgb_full_carrier() {
        let w = Wavelength::default();
        let c = Color::sample_rgb(&w, &Vec3::new(0.2, 0.4, 0.6));
        assert_eq!(c, Color::new(0.2, 0.4, 0.6));
    }

    #[test]
    fn sample_rgb_after_collapse_keeps_single_channel() {
        let mut w = Wavelength::default();
        w.collapse(2);
        let c = Color::sample_rgb(&w, &Vec3::new(0.2, 0.4, 0.6));
        assert_eq!(c, Color::new(0.0, 0.0, 0.6));

        // Multiplication by a full-carrier value stays single channel.
        let filtered = c * Color::new(0.5, 0.5, 0.5);
        assert_eq!(filtered.r, 0.0);
        assert_eq!(filtered.g, 0.0);
    }

    #[test]
    fn collapse_is_sticky() {
        let mut w = Wavelength::default();
        assert!(!w.is_single());
        w.collapse(1);
        assert!(w.is_single());
        assert_eq!(w.channel(), Some(1));
        w.reset();
        assert!(!w.is_single());
    }

    #[test]
    fn validity_checks() {
        assert!(Color::new(0.1, 0.0, 2.0).is_valid());
        assert!(!Color::new(-0.1, 0.0, 0.0).is_valid());
        assert!(!Color::new(Float::NAN, 0.0, 0.0).is_valid());
        assert!(Color::new(Float::NAN, 0.0, 0.0).has_nans());
        assert!(!Color::new(Float::INFINITY, 0.0, 0.0).is_valid());
    }

    #[test]
    fn luminance_of_white_is_one() {
        assert!((Color::ONE.luminance() - 1.0).abs() < 1.0e-4);
    }
}
