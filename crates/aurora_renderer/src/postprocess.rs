//! Postprocess pipeline: exposure, tone mapping, sRGB encoding and ordered
//! dithering.

use aurora_math::{clamp, Float, Vec3};

/// Tone mapping operator applied before sRGB encoding.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Tonemapper {
    /// Plain clamp to [0, 1].
    Clamp,
    /// Reinhard `x / (1 + x)`, per channel.
    #[default]
    Reinhard,
    /// ACES filmic fit (Narkowicz approximation).
    AcesFit,
}

/// Parameters of the postprocess pass.
#[derive(Copy, Clone, Debug)]
pub struct PostprocessParams {
    /// Color filter multiplied into every pixel.
    pub color_filter: Vec3,

    /// Exposure in log2 scale.
    pub exposure: Float,

    /// Tone mapping operator.
    pub tonemapper: Tonemapper,

    /// Amplitude of the ordered dither applied after tonemapping.
    pub dithering_strength: Float,
}

impl Default for PostprocessParams {
    fn default() -> Self {
        Self {
            color_filter: Vec3::ONE,
            exposure: 0.0,
            tonemapper: Tonemapper::Reinhard,
            dithering_strength: 0.005,
        }
    }
}

/// 4x4 Bayer threshold matrix, normalized to [0, 1).
const BAYER_4X4: [[Float; 4]; 4] = [
    [0.0 / 16.0, 8.0 / 16.0, 2.0 / 16.0, 10.0 / 16.0],
    [12.0 / 16.0, 4.0 / 16.0, 14.0 / 16.0, 6.0 / 16.0],
    [3.0 / 16.0, 11.0 / 16.0, 1.0 / 16.0, 9.0 / 16.0],
    [15.0 / 16.0, 7.0 / 16.0, 13.0 / 16.0, 5.0 / 16.0],
];

/// Ordered-dither offset for a pixel, centered on zero.
///
/// * `x` - Pixel x-coordinate.
/// * `y` - Pixel y-coordinate.
#[inline(always)]
pub fn dither_offset(x: u32, y: u32) -> Float {
    BAYER_4X4[(y & 3) as usize][(x & 3) as usize] - 0.5
}

/// Apply the selected tone mapping operator to one channel.
///
/// * `tonemapper` - The operator.
/// * `x`          - Linear channel value, non-negative.
#[inline(always)]
pub fn tonemap(tonemapper: Tonemapper, x: Float) -> Float {
    match tonemapper {
        Tonemapper::Clamp => clamp(x, 0.0, 1.0),
        Tonemapper::Reinhard => x / (1.0 + x),
        Tonemapper::AcesFit => {
            let v = x * (2.51 * x + 0.03) / (x * (2.43 * x + 0.59) + 0.14);
            clamp(v, 0.0, 1.0)
        }
    }
}

/// Encode a linear value to sRGB.
///
/// * `x` - Linear value in [0, 1].
#[inline(always)]
pub fn srgb_encode(x: Float) -> Float {
    if x <= 0.003_130_8 {
        12.92 * x
    } else {
        1.055 * x.powf(1.0 / 2.4) - 0.055
    }
}

/// Convert one accumulated pixel to an 8-bit RGBA value.
///
/// * `sum`    - Accumulated radiance.
/// * `scale`  - Exposure scale divided by the sample count.
/// * `params` - Postprocess parameters.
/// * `x`      - Pixel x-coordinate (for the dither pattern).
/// * `y`      - Pixel y-coordinate (for the dither pattern).
pub fn resolve_pixel(
    sum: &Vec3,
    scale: Float,
    params: &PostprocessParams,
    x: u32,
    y: u32,
) -> [u8; 4] {
    let exposed = sum.mul_elements(&params.color_filter) * scale;
    let dither = dither_offset(x, y) * params.dithering_strength;

    let mut out = [0u8; 4];
    for (i, channel) in [exposed.x, exposed.y, exposed.z].into_iter().enumerate() {
        let mapped = srgb_encode(tonemap(params.tonemapper, channel.max(0.0)));
        out[i] = (clamp(mapped + dither, 0.0, 1.0) * 255.0 + 0.5) as u8;
    }
    out[3] = 255;
    out
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
