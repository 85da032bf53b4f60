//! Progressive tiled renderer.
//!
//! Drives the rendering core: a `Renderer` turns camera rays into radiance
//! samples (the path integrator lives here), the `Viewport` accumulates
//! samples across progressive passes with a tiled multi-threaded scheduler,
//! and the postprocess pipeline turns the floating-point accumulator into a
//! displayable 8-bit image.

mod error;
mod path_tracer;
mod postprocess;
mod renderer;
mod viewport;

// Re-export
pub use error::*;
pub use path_tracer::*;
pub use postprocess::*;
pub use renderer::*;
pub use viewport::*;
