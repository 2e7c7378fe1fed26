//! Software rasterizer
//!
//! - Homogeneous vector/matrix math (row-vector convention)
//! - Near-plane and screen-edge triangle clipping
//! - Perspective-correct texture mapping with a reciprocal-depth Z-buffer
//! - Wireframe and flat-fill draw modes

mod math;
mod matrix;
mod triangle;
mod types;
mod zbuffer;
mod framebuffer;
mod camera;
mod assembler;
mod render;
mod pipeline;

pub use math::*;
pub use matrix::*;
pub use triangle::*;
pub use types::*;
pub use zbuffer::*;
pub use framebuffer::*;
pub use camera::*;
pub use assembler::*;
pub use render::*;
pub use pipeline::*;

/// Default render resolution
pub const WIDTH: usize = 320;
pub const HEIGHT: usize = 240;
