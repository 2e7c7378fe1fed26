//! World module - what the rasterizer draws
//!
//! - Meshes and mesh groups (object-space triangles)
//! - OBJ model loading
//! - Scene objects with data-driven behaviours
//! - RON scene files

mod mesh;
mod obj;
mod scene;
mod config;

pub use mesh::*;
pub use obj::*;
pub use scene::*;
pub use config::*;
