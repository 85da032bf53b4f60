//! Per-worker rendering context and counters.

use crate::color::Wavelength;
use crate::rng::Rng;
use aurora_math::Float;
use bumpalo::Bump;

/// Parameters steering a render.
#[derive(Copy, Clone, Debug)]
pub struct RenderingParams {
    /// Target number of samples per pixel for progressive rendering.
    pub samples_per_pixel: u32,

    /// Samples added per pixel in a single render pass.
    pub samples_per_frame: u32,

    /// Tile edge length in pixels.
    pub tile_size: u32,

    /// Hard cap on path depth.
    pub max_ray_depth: u32,

    /// Depth from which Russian roulette may terminate paths.
    pub min_russian_roulette_depth: u32,

    /// Adaptive-sampling threshold on the average error estimate; zero
    /// disables the early out.
    pub adaptive_threshold: Float,
}

impl Default for RenderingParams {
    fn default() -> Self {
        Self {
            samples_per_pixel: 64,
            samples_per_frame: 1,
            tile_size: 16,
            max_ray_depth: 20,
            min_russian_roulette_depth: 3,
            adaptive_threshold: 0.0,
        }
    }
}

/// Counters accumulated while rendering. Each worker owns a private copy;
/// the viewport merges them after the pass.
#[derive(Copy, Clone, Debug, Default)]
pub struct RayTracingCounters {
    /// Primary (camera) rays generated.
    pub num_primary_rays: u64,

    /// Scene intersection queries issued.
    pub num_rays: u64,

    /// Shadow (occlusion) queries issued.
    pub num_shadow_rays: u64,

    /// Samples discarded because of NaN/negative radiance.
    pub num_discarded_samples: u64,
}

impl RayTracingCounters {
    /// Reset all counters to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Merge another set of counters into this one.
    ///
    /// * `other` - The counters to merge.
    pub fn merge(&mut self, other: &Self) {
        self.num_primary_rays += other.num_primary_rays;
        self.num_rays += other.num_rays;
        self.num_shadow_rays += other.num_shadow_rays;
        self.num_discarded_samples += other.num_discarded_samples;
    }
}

/// State owned by a single worker for the duration of a render pass: RNG,
/// wavelength carrier, scratch arena and counters. Never shared between
/// workers.
pub struct RenderingContext {
    /// Per-tile random stream.
    pub rng: Rng,

    /// Wavelength carrier for the current path.
    pub wavelength: Wavelength,

    /// Shutter-relative time of the current sample, in [0, 1).
    pub time: Float,

    /// Scratch arena, reset at tile boundaries.
    pub arena: Bump,

    /// Private counters, merged by the viewport after the pass.
    pub counters: RayTracingCounters,

    /// Parameters of the render this context serves.
    pub params: RenderingParams,
}

impl Default for RenderingContext {
    /// Return a context with a default-seeded RNG.
    fn default() -> Self {
        Self::new()
    }
}

impl RenderingContext {
    /// Create a new `RenderingContext`.
    pub fn new() -> Self {
        Self {
            rng: Rng::default(),
            wavelength: Wavelength::default(),
            time: 0.0,
            arena: Bump::new(),
            counters: RayTracingCounters::default(),
            params: RenderingParams::default(),
        }
    }

    /// Re-seed the random stream and reset the scratch arena at a tile
    /// boundary.
    ///
    /// * `seed` - Sequence index derived from frame/tile/sample indices.
    pub fn begin_tile(&mut self, seed: u64) {
        self.rng.set_sequence(seed);
        self.arena.reset();
    }

    /// Start a new pixel sample: restore the full wavelength carrier and
    /// draw the sample's shutter time.
    pub fn begin_sample(&mut self) {
        self.wavelength.reset();
        self.time = self.rng.uniform();
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_merge() {
        let mut a = RayTracingCounters {
            num_primary_rays: 1,
            num_rays: 2,
            num_shadow_rays: 3,
            num_discarded_samples: 0,
        };
        let b = RayTracingCounters {
            num_primary_rays: 10,
            num_rays: 20,
            num_shadow_rays: 30,
            num_discarded_samples: 1,
        };
        a.merge(&b);
        assert_eq!(a.num_primary_rays, 11);
        assert_eq!(a.num_rays, 22);
        assert_eq!(a.num_shadow_rays, 33);
        assert_eq!(a.num_discarded_samples, 1);
    }

    #[test]
    fn begin_sample_restores_carrier() {
        let mut ctx = RenderingContext::new();
        ctx.begin_tile(99);
        ctx.wavelength.collapse(0);
        ctx.begin_sample();
        assert!(!ctx.wavelength.is_single());
        assert!((0.0..1.0).contains(&ctx.time));
    }
}
