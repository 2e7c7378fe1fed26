//! Per-triangle transform stages
//!
//! world -> view -> (near clip) -> projection -> perspective divide ->
//! viewport. Every stage takes a triangle by reference and returns a new one.

use super::camera::Camera;
use super::math::Vec3;
use super::matrix::Mat4;
use super::triangle::Triangle;

fn transform(tri: &Triangle, m: &Mat4) -> Triangle {
    tri.with_positions([m.mul_vec(tri.p[0]), m.mul_vec(tri.p[1]), m.mul_vec(tri.p[2])])
}

/// Object space to world space; texture coordinates are copied unchanged
pub fn world_transform(tri: &Triangle, world: &Mat4) -> Triangle {
    transform(tri, world)
}

pub fn view_transform(tri: &Triangle, view: &Mat4) -> Triangle {
    transform(tri, view)
}

/// Into clip space. Leaves `w` on every vertex for [`perspective_divide`].
pub fn projection_transform(tri: &Triangle, projection: &Mat4) -> Triangle {
    transform(tri, projection)
}

/// Unit normal of the plane through the three vertices
pub fn face_normal(tri: &Triangle) -> Vec3 {
    let line1 = tri.p[1] - tri.p[0];
    let line2 = tri.p[2] - tri.p[0];
    line1.cross(line2).normalize()
}

/// Backface test against the camera position in world space
pub fn is_visible(tri: &Triangle, normal: Vec3, camera_pos: Vec3) -> bool {
    normal.dot(tri.p[0] - camera_pos) < 0.0
}

/// Directional lighting term, never below `ambient`
pub fn shade(normal: Vec3, light_dir: Vec3, ambient: f64) -> f64 {
    ambient.max(light_dir.normalize().dot(normal))
}

/// Clip space to normalised device coordinates.
///
/// Texture coordinates are divided by `w` and `1/w` is stored in the
/// texture `w` channel before the vertex itself is divided, so the scan
/// converter can interpolate them perspective-correctly.
pub fn perspective_divide(tri: &Triangle) -> Triangle {
    let mut out = *tri;
    for i in 0..3 {
        let w = tri.p[i].w;
        out.t[i].u = tri.t[i].u / w;
        out.t[i].v = tri.t[i].v / w;
        out.t[i].w = 1.0 / w;
        out.p[i] = tri.p[i] / w;
    }
    out
}

/// NDC to pixel coordinates: flip x/y, shift into 0..2, scale by half the
/// screen size
pub fn viewport_scale(tri: &Triangle, width: usize, height: usize) -> Triangle {
    let offset = Vec3::new(1.0, 1.0, 0.0);
    let half_w = 0.5 * width as f64;
    let half_h = 0.5 * height as f64;

    let mut out = *tri;
    for p in out.p.iter_mut() {
        let flipped = Vec3::new(-p.x, -p.y, p.z) + offset;
        p.x = flipped.x * half_w;
        p.y = flipped.y * half_h;
        p.z = flipped.z;
        p.w = 1.0;
    }
    out
}

/// World-to-view matrix for the camera's pose.
///
/// Also returns the look direction the matrix was built from.
pub fn view_matrix(camera: &Camera) -> (Mat4, Vec3) {
    let look = camera.orientation().mul_vec(Vec3::FORWARD);
    let look = Vec3::new(look.x, look.y, look.z);
    let target = camera.position + look;
    let camera_matrix = Mat4::point_at(camera.position, target, Vec3::UP);
    (camera_matrix.quick_inverse(), look)
}
