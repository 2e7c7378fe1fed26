//! Scene: meshes placed in the world, with simple per-tick behaviours

use serde::{Deserialize, Serialize};

use super::Mesh;
use crate::rasterizer::{DrawItem, Mat4, Texture, Vec3};

/// Object placement, applied per frame through the world matrix
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub position: [f64; 3],
    /// Radians around X, Y, Z
    pub rotation: [f64; 3],
}

impl Transform {
    /// Rotate (Z, then X, then Y) and then translate
    pub fn world_matrix(&self) -> Mat4 {
        let [rx, ry, rz] = self.rotation;
        let [x, y, z] = self.position;
        Mat4::rotate_z(rz)
            .multiply(&Mat4::rotate_x(rx))
            .multiply(&Mat4::rotate_y(ry))
            .multiply(&Mat4::translation(x, y, z))
    }
}

/// What an object does each tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Behavior {
    #[default]
    Static,
    /// Angular velocity, radians per second around X, Y, Z
    Spin([f64; 3]),
    /// Moves the mesh's stored vertices, units per second
    Drift([f64; 3]),
}

impl Behavior {
    pub fn apply(&self, object: &mut SceneObject, dt: f64) {
        match *self {
            Behavior::Static => {}
            Behavior::Spin(rate) => {
                for (angle, r) in object.transform.rotation.iter_mut().zip(rate) {
                    *angle = (*angle + r * dt) % std::f64::consts::TAU;
                }
            }
            Behavior::Drift([x, y, z]) => {
                object.mesh.translate(Vec3::new(x, y, z) * dt);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub mesh: Mesh,
    pub transform: Transform,
    pub behavior: Behavior,
}

impl SceneObject {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            mesh,
            transform: Transform::default(),
            behavior: Behavior::Static,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }
}

/// Everything the pipeline draws: objects and the textures they index into
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub textures: Vec<Texture>,
    /// Seconds simulated so far
    pub time: f64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a texture and return its slot
    pub fn add_texture(&mut self, texture: Texture) -> usize {
        self.textures.push(texture);
        self.textures.len() - 1
    }

    pub fn add_object(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    /// Advance every object's behaviour by `dt` seconds
    pub fn update(&mut self, dt: f64) {
        for object in &mut self.objects {
            let behavior = object.behavior;
            behavior.apply(object, dt);
        }
        self.time += dt;
    }

    /// Per-frame view of the scene for the pipeline
    pub fn draw_items(&self) -> Vec<DrawItem<'_>> {
        self.objects
            .iter()
            .map(|o| DrawItem {
                triangles: &o.mesh.triangles,
                world: o.transform.world_matrix(),
                draw_mode: o.mesh.draw_mode,
            })
            .collect()
    }

    pub fn triangle_count(&self) -> usize {
        self.objects.iter().map(|o| o.mesh.len()).sum()
    }
}
