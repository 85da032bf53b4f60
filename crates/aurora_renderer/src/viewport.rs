//! Progressive viewport: accumulation buffers, tiled multi-threaded
//! scheduling and the adaptive-error estimate.
//!
//! The image is split into tiles; a fixed pool of workers consumes them from
//! a bounded queue. Each worker owns one `RenderingContext` for the pass and
//! renders every tile it takes into a private buffer, which the scheduler
//! thread merges; tiles are disjoint, so the final image is invariant to
//! completion order. Per-tile RNG streams are derived from
//! `(frame, tile, sample)`, which makes the accumulated buffers bit-identical
//! across runs for a given seed regardless of worker assignment.

use crate::error::RenderError;
use crate::postprocess::{resolve_pixel, PostprocessParams};
use crate::renderer::Renderer;
use aurora_core::camera::Camera;
use aurora_core::context::{RayTracingCounters, RenderingContext, RenderingParams};
use aurora_core::rng::combine_seed;
use aurora_math::{max, min, Float, Point2, Vec3};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

/// 2-D float image. Pixels are 16-byte aligned `Vec3` values, so the buffer
/// keeps SIMD-friendly layout.
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Vec3>,
}

impl Framebuffer {
    /// Allocate a zeroed framebuffer, surfacing allocation failure to the
    /// caller.
    ///
    /// * `width`  - Width in pixels.
    /// * `height` - Height in pixels.
    fn try_new(width: u32, height: u32) -> Result<Self, RenderError> {
        let n = width as usize * height as usize;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(n)
            .map_err(|e| RenderError::AllocationFailure(format!("{}x{} pixels: {}", width, height, e)))?;
        pixels.resize(n, Vec3::ZERO);
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Read a pixel.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    #[inline(always)]
    pub fn pixel(&self, x: u32, y: u32) -> &Vec3 {
        &self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Mutable access to a pixel.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    #[inline(always)]
    fn pixel_mut(&mut self, x: u32, y: u32) -> &mut Vec3 {
        &mut self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// All pixels, row-major.
    pub fn pixels(&self) -> &[Vec3] {
        &self.pixels
    }

    /// Zero the buffer.
    fn clear(&mut self) {
        self.pixels.fill(Vec3::ZERO);
    }
}

/// A rectangle of pixel coordinates forming an atomic unit of work.
#[derive(Copy, Clone, Debug)]
struct Tile {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,

    /// Tile grid coordinates, used for RNG stream derivation.
    index_x: u32,
    index_y: u32,

    /// Pass generation this tile belongs to.
    generation: u32,
}

/// A rendered tile: private sums plus the counters gathered while rendering
/// it.
struct TileResult {
    tile: Tile,
    sum: Vec<Vec3>,
    secondary: Vec<Vec3>,
    counters: RayTracingCounters,
}

/// Progressive accumulator and tile scheduler.
///
/// `sum` holds all samples, `secondary_sum` every second sample (keyed by the
/// global sample index), and `front_buffer` the tonemapped 8-bit output.
/// `front_buffer` is a pure function of `sum` and the postprocess parameters.
pub struct Viewport {
    sum: Framebuffer,
    secondary_sum: Framebuffer,
    front_buffer: Vec<[u8; 4]>,

    counters: RayTracingCounters,
    num_samples_rendered: u32,
    average_error: Float,

    /// Cooperative cancellation flag, polled between tiles.
    abort: AtomicBool,
}

impl Viewport {
    /// Create a viewport of the given size.
    ///
    /// * `width`  - Width in pixels.
    /// * `height` - Height in pixels.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let mut viewport = Self {
            sum: Framebuffer::try_new(0, 0)?,
            secondary_sum: Framebuffer::try_new(0, 0)?,
            front_buffer: Vec::new(),
            counters: RayTracingCounters::default(),
            num_samples_rendered: 0,
            average_error: Float::INFINITY,
            abort: AtomicBool::new(false),
        };
        viewport.resize(width, height)?;
        Ok(viewport)
    }

    /// Resize the buffers, discarding accumulated samples. Fails on zero
    /// dimensions or allocation failure, leaving the viewport usable.
    ///
    /// * `width`  - New width in pixels.
    /// * `height` - New height in pixels.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidArgument(format!(
                "viewport dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }

        let sum = Framebuffer::try_new(width, height)?;
        let secondary = Framebuffer::try_new(width, height)?;
        let n = width as usize * height as usize;
        let mut front = Vec::new();
        front
            .try_reserve_exact(n)
            .map_err(|e| RenderError::AllocationFailure(format!("front buffer: {}", e)))?;
        front.resize(n, [0u8; 4]);

        self.sum = sum;
        self.secondary_sum = secondary;
        self.front_buffer = front;
        self.reset();
        Ok(())
    }

    /// Clear the accumulated image and counters.
    pub fn reset(&mut self) {
        self.sum.clear();
        self.secondary_sum.clear();
        self.front_buffer.fill([0u8; 4]);
        self.counters.reset();
        self.num_samples_rendered = 0;
        self.average_error = Float::INFINITY;
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.sum.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.sum.height()
    }

    /// The accumulated (sum) buffer.
    pub fn sum_buffer(&self) -> &Framebuffer {
        &self.sum
    }

    /// The tonemapped 8-bit output, row-major RGBA.
    pub fn front_buffer(&self) -> &[[u8; 4]] {
        &self.front_buffer
    }

    /// Counters merged over all completed passes.
    pub fn counters(&self) -> &RayTracingCounters {
        &self.counters
    }

    /// Number of accumulated samples per pixel.
    pub fn num_samples_rendered(&self) -> u32 {
        self.num_samples_rendered
    }

    /// The adaptive-sampling error estimate from the last completed pass.
    pub fn average_error(&self) -> Float {
        self.average_error
    }

    /// Request cooperative cancellation; workers stop at the next tile
    /// boundary. Completed tiles stay merged.
    pub fn request_abort(&self) {
        self.abort.store(true, Ordering::Relaxed);
    }

    /// Render one progressive pass: every tile gains
    /// `params.samples_per_frame` samples per pixel. Returns `Ok(false)` if
    /// the pass was cancelled (the sample counter is then not advanced).
    ///
    /// * `renderer` - Radiance estimator.
    /// * `camera`   - The camera.
    /// * `params`   - Rendering parameters.
    pub fn render(
        &mut self,
        renderer: &dyn Renderer,
        camera: &Camera,
        params: &RenderingParams,
    ) -> Result<bool, RenderError> {
        if params.tile_size == 0 {
            return Err(RenderError::InvalidArgument(String::from(
                "tile size must be non-zero",
            )));
        }
        if params.samples_per_frame == 0 {
            return Err(RenderError::InvalidArgument(String::from(
                "samples per frame must be non-zero",
            )));
        }

        let width = self.width();
        let height = self.height();
        let tile_size = params.tile_size;
        let n_tiles_x = (width + tile_size - 1) / tile_size;
        let n_tiles_y = (height + tile_size - 1) / tile_size;
        let tile_count = (n_tiles_x * n_tiles_y) as usize;
        let frame_index = self.num_samples_rendered;

        let workers = min(
            std::thread::available_parallelism().map_or(1, |n| n.get()),
            max(tile_count, 1),
        );
        debug!(
            "pass {}: {}x{} tiles on {} workers",
            frame_index, n_tiles_x, n_tiles_y, workers
        );

        // Queue every tile up front; the channel capacity covers them all,
        // so sends never block and early-exiting workers cannot deadlock
        // the scheduler.
        let (task_tx, task_rx) = crossbeam_channel::bounded(tile_count);
        for index in 0..tile_count {
            let index_x = index as u32 % n_tiles_x;
            let index_y = index as u32 / n_tiles_x;
            let x0 = index_x * tile_size;
            let y0 = index_y * tile_size;
            task_tx
                .send(Tile {
                    x0,
                    y0,
                    x1: min(x0 + tile_size, width),
                    y1: min(y0 + tile_size, height),
                    index_x,
                    index_y,
                    generation: frame_index,
                })
                .expect("tile queue sized for all tiles");
        }
        drop(task_tx);

        let (result_tx, result_rx) = crossbeam_channel::unbounded::<TileResult>();
        let abort = &self.abort;
        let sum = &mut self.sum;
        let secondary_sum = &mut self.secondary_sum;
        let mut merged_counters = RayTracingCounters::default();

        crossbeam::scope(|scope| {
            // Spawn worker threads; each owns one context for the pass.
            for _ in 0..workers {
                let task_rx = task_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move |_| {
                    let mut ctx = RenderingContext::new();
                    ctx.params = *params;
                    for tile in task_rx.iter() {
                        if abort.load(Ordering::Relaxed) {
                            break;
                        }
                        let result =
                            Self::render_tile(renderer, camera, tile, &mut ctx, width, height);
                        if result_tx.send(result).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(result_tx);

            // Merge completed tiles on the scheduler thread; tiles are
            // disjoint, so merge order does not affect the image.
            for result in result_rx.iter() {
                Self::merge_tile(sum, secondary_sum, &result);
                merged_counters.merge(&result.counters);
            }
        })
        .expect("render worker panicked");

        self.counters.merge(&merged_counters);

        let aborted = self.abort.swap(false, Ordering::Relaxed);
        if aborted {
            warn!("render pass {} cancelled", frame_index);
            return Ok(false);
        }

        self.num_samples_rendered += params.samples_per_frame;
        self.estimate_error();
        Ok(true)
    }

    /// Render passes until the samples-per-pixel target is reached, the
    /// adaptive-error threshold is crossed, or the render is cancelled.
    /// Returns the number of accumulated samples.
    ///
    /// * `renderer` - Radiance estimator.
    /// * `camera`   - The camera.
    /// * `params`   - Rendering parameters.
    pub fn render_progressive(
        &mut self,
        renderer: &dyn Renderer,
        camera: &Camera,
        params: &RenderingParams,
    ) -> Result<u32, RenderError> {
        while self.num_samples_rendered < params.samples_per_pixel {
            if !self.render(renderer, camera, params)? {
                break;
            }
            if params.adaptive_threshold > 0.0
                && self.num_samples_rendered >= 2
                && self.average_error < params.adaptive_threshold
            {
                info!(
                    "adaptive threshold reached after {} samples (error {})",
                    self.num_samples_rendered, self.average_error
                );
                break;
            }
        }
        Ok(self.num_samples_rendered)
    }

    /// Render a single tile into private buffers. Called from worker
    /// threads.
    ///
    /// * `renderer` - Radiance estimator.
    /// * `camera`   - The camera.
    /// * `tile`     - The tile to render.
    /// * `ctx`      - The worker's context.
    /// * `width`    - Image width.
    /// * `height`   - Image height.
    fn render_tile(
        renderer: &dyn Renderer,
        camera: &Camera,
        tile: Tile,
        ctx: &mut RenderingContext,
        width: u32,
        height: u32,
    ) -> TileResult {
        let tile_pixels = ((tile.x1 - tile.x0) * (tile.y1 - tile.y0)) as usize;
        let mut sum = vec![Vec3::ZERO; tile_pixels];
        let mut secondary = vec![Vec3::ZERO; tile_pixels];

        let inv_width = 1.0 / width as Float;
        let inv_height = 1.0 / height as Float;

        for s in 0..ctx.params.samples_per_frame {
            // Independent stream per (frame, tile, sample); reproducible
            // regardless of which worker renders the tile.
            ctx.begin_tile(combine_seed(tile.generation, tile.index_x, tile.index_y, s));
            let update_secondary = (tile.generation + s) % 2 == 0;

            let mut offset = 0;
            for y in tile.y0..tile.y1 {
                for x in tile.x0..tile.x1 {
                    ctx.begin_sample();
                    let jitter = ctx.rng.uniform_vec2();
                    let coords = Point2::new(
                        (x as Float + jitter.x) * inv_width,
                        (y as Float + jitter.y) * inv_height,
                    );

                    ctx.counters.num_primary_rays += 1;
                    let ray = camera.generate_ray(&coords, ctx);
                    let color = renderer.render_pixel(&ray, ctx);

                    // Invalid radiance has already been counted and zeroed by
                    // the renderer; guard here in case of foreign renderers.
                    let value = if color.is_valid() {
                        color.to_vec3()
                    } else {
                        ctx.counters.num_discarded_samples += 1;
                        Vec3::ZERO
                    };

                    sum[offset] += value;
                    if update_secondary {
                        secondary[offset] += value;
                    }
                    offset += 1;
                }
            }
        }

        TileResult {
            tile,
            sum,
            secondary,
            counters: std::mem::take(&mut ctx.counters),
        }
    }

    /// Merge a completed tile into the accumulation buffers.
    ///
    /// * `sum`           - The sum buffer.
    /// * `secondary_sum` - The secondary sum buffer.
    /// * `result`        - The completed tile.
    fn merge_tile(sum: &mut Framebuffer, secondary_sum: &mut Framebuffer, result: &TileResult) {
        let tile = &result.tile;
        let mut offset = 0;
        for y in tile.y0..tile.y1 {
            for x in tile.x0..tile.x1 {
                *sum.pixel_mut(x, y) += result.sum[offset];
                *secondary_sum.pixel_mut(x, y) += result.secondary[offset];
                offset += 1;
            }
        }
    }

    /// Refresh the adaptive-sampling error estimate: the average of
    /// `|sum − 2·secondarySum| / max(sum, ε)` over the image. The two
    /// half-streams are independent, so the estimate approaches zero as the
    /// image converges.
    fn estimate_error(&mut self) {
        const MIN_DENOMINATOR: Float = 1.0e-4;

        let mut total = 0.0f64;
        for (s, half) in self
            .sum
            .pixels()
            .iter()
            .zip(self.secondary_sum.pixels().iter())
        {
            let diff = (*s - *half * 2.0).abs();
            let numerator = diff.x + diff.y + diff.z;
            let denominator = max(s.x + s.y + s.z, MIN_DENOMINATOR);
            total += (numerator / denominator) as f64;
        }
        self.average_error = (total / self.sum.pixels().len() as f64) as Float;
    }

    /// Regenerate the front buffer from the sum buffer: exposure, color
    /// filter, tone mapping, sRGB encoding and ordered dithering. Rows are
    /// processed in parallel.
    ///
    /// * `params` - Postprocess parameters.
    pub fn post_process(&mut self, params: &PostprocessParams) {
        let samples = max(self.num_samples_rendered, 1);
        let scale = params.exposure.exp2() / samples as Float;
        let width = self.width() as usize;
        let sum = &self.sum;

        self.front_buffer
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, out) in row.iter_mut().enumerate() {
                    *out = resolve_pixel(
                        sum.pixel(x as u32, y as u32),
                        scale,
                        params,
                        x as u32,
                        y as u32,
                    );
                }
            });
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            Viewport::new(0, 32),
            Err(RenderError::InvalidArgument(_))
        ));
        let mut viewport = Viewport::new(8, 8).unwrap();
        assert!(viewport.resize(8, 0).is_err());
        // A failed resize leaves the old buffers usable.
        assert_eq!(viewport.width(), 8);
        assert_eq!(viewport.height(), 8);
    }

    #[test]
    fn reset_clears_state() {
        let mut viewport = Viewport::new(4, 4).unwrap();
        viewport.num_samples_rendered = 7;
        *viewport.sum.pixel_mut(1, 2) = Vec3::ONE;
        viewport.reset();
        assert_eq!(viewport.num_samples_rendered(), 0);
        assert_eq!(*viewport.sum_buffer().pixel(1, 2), Vec3::ZERO);
        assert_eq!(viewport.counters().num_rays, 0);
    }

    // Testable property 6: merging the same tiles in any order yields the
    // same buffers.
    #[test]
    fn tile_merge_is_commutative() {
        let make_result = |x0: u32, value: Float| TileResult {
            tile: Tile {
                x0,
                y0: 0,
                x1: x0 + 2,
                y1: 2,
                index_x: x0 / 2,
                index_y: 0,
                generation: 0,
            },
            sum: vec![Vec3::splat(value); 4],
            secondary: vec![Vec3::splat(value * 0.5); 4],
            counters: RayTracingCounters::default(),
        };

        let mut forward_sum = Framebuffer::try_new(4, 2).unwrap();
        let mut forward_secondary = Framebuffer::try_new(4, 2).unwrap();
        let mut reverse_sum = Framebuffer::try_new(4, 2).unwrap();
        let mut reverse_secondary = Framebuffer::try_new(4, 2).unwrap();

        let results = [make_result(0, 1.0), make_result(2, 2.0)];
        for r in results.iter() {
            Viewport::merge_tile(&mut forward_sum, &mut forward_secondary, r);
        }
        for r in results.iter().rev() {
            Viewport::merge_tile(&mut reverse_sum, &mut reverse_secondary, r);
        }

        assert_eq!(forward_sum.pixels(), reverse_sum.pixels());
        assert_eq!(forward_secondary.pixels(), reverse_secondary.pixels());
    }

    #[test]
    fn error_estimate_is_zero_for_identical_half_streams() {
        let mut viewport = Viewport::new(2, 2).unwrap();
        // Two samples of 1.0: sum = 2, secondary = 1 => |2 - 2·1| = 0.
        for y in 0..2 {
            for x in 0..2 {
                *viewport.sum.pixel_mut(x, y) = Vec3::splat(2.0);
                *viewport.secondary_sum.pixel_mut(x, y) = Vec3::splat(1.0);
            }
        }
        viewport.estimate_error();
        assert!(viewport.average_error() < 1.0e-6);

        // Diverging half-streams raise the estimate.
        *viewport.secondary_sum.pixel_mut(0, 0) = Vec3::splat(1.5);
        viewport.estimate_error();
        assert!(viewport.average_error() > 0.1);
    }
}
