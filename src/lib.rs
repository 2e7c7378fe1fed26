//! engine3d: CPU software rasterizer
//!
//! Transforms textured triangle meshes through world, view and projection
//! matrices, clips them against the near plane and the screen edges, and
//! scan-converts them into a packed-RGB pixel buffer with a depth buffer.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod rasterizer;
pub mod world;
