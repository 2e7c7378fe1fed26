//! 4x4 transformation matrices
//!
//! Row-major storage, row-vector convention: a point is transformed as
//! `out = in · M`, so translation lives in the last row.
//!
//! Composition follows the same convention: `a.multiply(&b)` applies `a`
//! first and `b` second (`v · a · b`).

use std::ops::Mul;
use super::math::Vec3;

/// How the projection constructor turns the field of view into a scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum FovMode {
    /// `1 / tan(fov_deg / 2 in radians)`
    #[default]
    Corrected,
    /// `1 / tan(fov * 0.5 / PI * 180)`, bit-compatible with older scene
    /// files that were tuned against this conversion.
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub m: [[f64; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Mat4::identity()
    }
}

impl Mat4 {
    pub fn from_rows(m: [[f64; 4]; 4]) -> Self {
        Self { m }
    }

    pub fn identity() -> Self {
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [x, y, z, 1.0],
        ])
    }

    pub fn rotate_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, s, 0.0],
            [0.0, -s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn rotate_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([
            [c, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn rotate_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([
            [c, s, 0.0, 0.0],
            [-s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Perspective projection.
    ///
    /// Clip-space `w` ends up equal to the view-space `z`, so anything in
    /// front of the camera has `w > 0`.
    pub fn projection(near: f64, far: f64, aspect: f64, fov: f64, mode: FovMode) -> Self {
        let half_angle = match mode {
            FovMode::Corrected => (fov * 0.5).to_radians(),
            FovMode::Legacy => fov * 0.5 / std::f64::consts::PI * 180.0,
        };
        let fov_scale = 1.0 / half_angle.tan();

        Self::from_rows([
            [aspect * fov_scale, 0.0, 0.0, 0.0],
            [0.0, fov_scale, 0.0, 0.0],
            [0.0, 0.0, far / (far - near), 1.0],
            [0.0, 0.0, (-far * near) / (far - near), 0.0],
        ])
    }

    /// Camera basis looking from `pos` towards `target`.
    ///
    /// Rows are right, up, forward and position. `up` is re-orthogonalised
    /// against the forward direction before the right vector is derived.
    pub fn point_at(pos: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - pos).normalize();

        let a = forward * up.dot(forward);
        let new_up = (up - a).normalize();

        let right = new_up.cross(forward);

        Self::from_rows([
            [right.x, right.y, right.z, 0.0],
            [new_up.x, new_up.y, new_up.z, 0.0],
            [forward.x, forward.y, forward.z, 0.0],
            [pos.x, pos.y, pos.z, 1.0],
        ])
    }

    /// Inverse of a rotation + translation matrix.
    ///
    /// Only valid when the upper 3x3 block is orthonormal (the output of
    /// [`Mat4::point_at`], rotations and translations). The rotation block
    /// is transposed and the translation recomputed; there is no general
    /// inversion, so projection or scale matrices give a silently wrong
    /// result.
    pub fn quick_inverse(&self) -> Self {
        let m = &self.m;
        Self::from_rows([
            [m[0][0], m[1][0], m[2][0], 0.0],
            [m[0][1], m[1][1], m[2][1], 0.0],
            [m[0][2], m[1][2], m[2][2], 0.0],
            [
                -(m[3][0] * m[0][0] + m[3][1] * m[0][1] + m[3][2] * m[0][2]),
                -(m[3][0] * m[1][0] + m[3][1] * m[1][1] + m[3][2] * m[1][2]),
                -(m[3][0] * m[2][0] + m[3][1] * m[2][1] + m[3][2] * m[2][2]),
                1.0,
            ],
        ])
    }

    /// Transform a homogeneous vector, `w` included
    pub fn mul_vec(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3 {
            x: v.x * m[0][0] + v.y * m[1][0] + v.z * m[2][0] + v.w * m[3][0],
            y: v.x * m[0][1] + v.y * m[1][1] + v.z * m[2][1] + v.w * m[3][1],
            z: v.x * m[0][2] + v.y * m[1][2] + v.z * m[2][2] + v.w * m[3][2],
            w: v.x * m[0][3] + v.y * m[1][3] + v.z * m[2][3] + v.w * m[3][3],
        }
    }

    /// `self · other`: apply `self`, then `other`
    pub fn multiply(&self, other: &Mat4) -> Mat4 {
        let mut result = [[0.0; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    result[i][j] += self.m[i][k] * other.m[k][j];
                }
            }
        }
        Mat4 { m: result }
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, other: Mat4) -> Mat4 {
        self.multiply(&other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::math::approx;

    fn counting() -> Mat4 {
        Mat4::from_rows([
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [13.0, 14.0, 15.0, 16.0],
        ])
    }

    #[test]
    fn test_mul_vec_row_convention() {
        let out = counting().mul_vec(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(out, Vec3 { x: 51.0, y: 58.0, z: 65.0, w: 72.0 });
    }

    #[test]
    fn test_multiply() {
        let r = counting().multiply(&counting());
        assert_eq!(r.m[0], [90.0, 100.0, 110.0, 120.0]);
        assert_eq!(r.m[3], [426.0, 484.0, 542.0, 600.0]);
    }

    #[test]
    fn test_multiply_applies_left_first() {
        // Rotate a quarter turn about Z, then translate: the rotated point
        // must end up offset by the translation, not rotated with it.
        let rot = Mat4::rotate_z(std::f64::consts::FRAC_PI_2);
        let trans = Mat4::translation(10.0, 0.0, 0.0);
        let p = Vec3::new(1.0, 0.0, 0.0);

        let composed = rot.multiply(&trans).mul_vec(p);
        let stepwise = trans.mul_vec(rot.mul_vec(p));
        assert!(approx(composed.x, stepwise.x));
        assert!(approx(composed.y, stepwise.y));
        assert!(approx(composed.x, 10.0));
    }

    #[test]
    fn test_translation_last_row() {
        let t = Mat4::translation(1.0, 2.0, 3.0);
        assert_eq!(t.m[3], [1.0, 2.0, 3.0, 1.0]);
        let p = t.mul_vec(Vec3::ZERO);
        assert_eq!((p.x, p.y, p.z, p.w), (1.0, 2.0, 3.0, 1.0));
    }

    #[test]
    fn test_point_at_inverse_maps_eye_to_origin() {
        let cases = [
            (Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)),
            (Vec3::new(-3.0, 0.5, 10.0), Vec3::new(0.0, 0.0, 0.0)),
            (Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)),
        ];
        for (pos, target) in cases {
            let m = Mat4::point_at(pos, target, Vec3::UP);
            assert_eq!(m.m[3][..3], [pos.x, pos.y, pos.z]);
            let local = m.quick_inverse().mul_vec(pos);
            assert!(local.x.abs() < 1e-9 && local.y.abs() < 1e-9 && local.z.abs() < 1e-9);
        }
    }

    #[test]
    fn test_projection_keeps_w_positive() {
        let proj = Mat4::projection(0.1, 1000.0, 1.0, 90.0, FovMode::Corrected);
        let view = Mat4::identity();
        let p = proj.mul_vec(view.mul_vec(Vec3::new(0.0, 0.0, 1.0)));
        assert!(p.x.is_finite() && p.y.is_finite() && p.z.is_finite() && p.w.is_finite());
        assert!(p.w > 0.0);
        assert!(approx(p.w, 1.0));
    }

    #[test]
    fn test_projection_fov_modes() {
        let corrected = Mat4::projection(1.0, 10.0, 1.0, 90.0, FovMode::Corrected);
        assert!(approx(corrected.m[1][1], 1.0));

        let fov = std::f64::consts::PI / 4.0;
        let legacy = Mat4::projection(1.0, 10.0, 1.0, fov, FovMode::Legacy);
        let expected = 1.0 / (fov * 0.5 / std::f64::consts::PI * 180.0).tan();
        assert_eq!(legacy.m[0][0], expected);
        assert_eq!(legacy.m[2][2], 10.0 / 9.0);
        assert_eq!(legacy.m[3][2], -10.0 / 9.0);
    }

    #[test]
    fn test_rotations_match_vector_helpers() {
        let p = Vec3::new(0.3, -1.2, 2.0);
        let a = 0.7;
        let by_matrix = Mat4::rotate_y(a).mul_vec(p);
        let by_helper = p.rotate_y(-a);
        assert!(approx(by_matrix.x, by_helper.x));
        assert!(approx(by_matrix.z, by_helper.z));
    }
}
