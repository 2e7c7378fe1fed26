//! Meshes: ordered triangle lists with a draw mode

use crate::rasterizer::{Color, DrawMode, Triangle, Vec2, Vec3};

/// Object-space triangles drawn with a single mode.
///
/// Geometry is fixed once loaded; per-frame placement goes through the
/// world matrix. [`Mesh::translate`] is the one exception and rewrites the
/// stored vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub triangles: Vec<Triangle>,
    pub draw_mode: DrawMode,
}

impl Mesh {
    pub fn new(name: impl Into<String>, triangles: Vec<Triangle>) -> Self {
        Self {
            name: name.into(),
            triangles,
            draw_mode: DrawMode::default(),
        }
    }

    pub fn with_draw_mode(mut self, draw_mode: DrawMode) -> Self {
        self.draw_mode = draw_mode;
        self
    }

    /// Point every triangle at the given texture slot
    pub fn with_texture(mut self, texture: Option<usize>) -> Self {
        for tri in &mut self.triangles {
            tri.texture = texture;
        }
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        for tri in &mut self.triangles {
            tri.color = color;
        }
        self
    }

    /// Move the stored vertices
    pub fn translate(&mut self, offset: Vec3) {
        for tri in &mut self.triangles {
            for p in &mut tri.p {
                *p = *p + offset;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

/// Meshes loaded together, e.g. the parts of one model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshGroup {
    pub name: String,
    pub meshes: Vec<Mesh>,
}

impl MeshGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meshes: Vec::new(),
        }
    }

    pub fn push(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::len).sum()
    }

    pub fn translate(&mut self, offset: Vec3) {
        for mesh in &mut self.meshes {
            mesh.translate(offset);
        }
    }
}

/// Create a 2x2x2 cube centred on the origin, faces wound outward, each
/// face mapped to the full 0..1 texture range
pub fn create_test_cube() -> Mesh {
    let x = Vec3::new(1.0, 0.0, 0.0);
    let y = Vec3::new(0.0, 1.0, 0.0);
    let z = Vec3::new(0.0, 0.0, 1.0);

    // (outward normal, a, b) with a x b == normal
    let faces = [
        (z, x, y),   // Front (+Z)
        (-z, y, x),  // Back
        (x, y, z),   // Right
        (-x, z, y),  // Left
        (y, z, x),   // Top
        (-y, x, z),  // Bottom
    ];

    let uvs = [
        Vec2::new(0.0, 1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 0.0),
    ];

    let mut triangles = Vec::with_capacity(12);
    for (n, a, b) in faces {
        let corners = [n - a - b, n + a - b, n + a + b, n - a + b];

        // Two triangles per face
        triangles.push(Triangle::new([corners[0], corners[1], corners[2]], [uvs[0], uvs[1], uvs[2]]));
        triangles.push(Triangle::new([corners[0], corners[2], corners[3]], [uvs[0], uvs[2], uvs[3]]));
    }

    Mesh::new("cube", triangles)
}
