//! Camera pose and lens

use serde::{Deserialize, Serialize};

use super::math::Vec3;
use super::matrix::{FovMode, Mat4};

/// Pitch stays just short of straight up/down so `point_at` keeps a
/// usable up vector.
const PITCH_LIMIT: f64 = std::f64::consts::FRAC_PI_2 - 0.01;

/// Lens parameters shared by the scene file and the live camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lens {
    /// Field of view, degrees
    pub fov: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for Lens {
    fn default() -> Self {
        Self { fov: 90.0, near: 0.1, far: 1000.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Unit look vector, kept in sync with yaw/pitch by [`Camera::turn`]
    pub look_dir: Vec3,
    pub yaw: f64,
    pub pitch: f64,
    pub fov: f64,
    pub near: f64,
    pub far: f64,
    /// Height over width
    pub aspect: f64,
}

impl Camera {
    pub fn new(width: usize, height: usize) -> Self {
        let lens = Lens::default();
        Self {
            position: Vec3::ZERO,
            look_dir: Vec3::FORWARD,
            yaw: 0.0,
            pitch: 0.0,
            fov: lens.fov,
            near: lens.near,
            far: lens.far,
            aspect: height as f64 / width as f64,
        }
    }

    pub fn with_lens(mut self, lens: Lens) -> Self {
        self.fov = lens.fov;
        self.near = lens.near;
        self.far = lens.far;
        self
    }

    pub fn with_pose(mut self, position: Vec3, yaw: f64, pitch: f64) -> Self {
        self.position = position;
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_look();
        self
    }

    /// `rotate_x(pitch) · rotate_y(yaw)` applied to +Z
    pub fn orientation(&self) -> Mat4 {
        Mat4::rotate_x(self.pitch).multiply(&Mat4::rotate_y(self.yaw))
    }

    pub fn update_look(&mut self) {
        let look = self.orientation().mul_vec(Vec3::FORWARD);
        self.look_dir = Vec3::new(look.x, look.y, look.z);
    }

    pub fn projection_matrix(&self, mode: FovMode) -> Mat4 {
        Mat4::projection(self.near, self.far, self.aspect, self.fov, mode)
    }

    /// Move along the look direction (negative moves back)
    pub fn move_forward(&mut self, amount: f64) {
        self.position = self.position + self.look_dir * amount;
    }

    /// Sideways movement perpendicular to the look direction
    pub fn strafe(&mut self, amount: f64) {
        let side = self.look_dir.cross(Vec3::UP);
        self.position = self.position + side * amount;
    }

    /// Move along world Y
    pub fn rise(&mut self, amount: f64) {
        self.position.y += amount;
    }

    pub fn turn(&mut self, yaw: f64, pitch: f64) {
        self.yaw += yaw;
        self.pitch = (self.pitch + pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_look();
    }
}
