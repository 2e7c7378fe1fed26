//! Vector math for the geometry pipeline
//!
//! `Vec3` is a homogeneous point: the arithmetic operators work on x/y/z only
//! and always produce `w = 1`. The `w` component is written explicitly by
//! matrix multiplication and read back during the perspective divide.

use std::ops::{Add, Div, Mul, Neg, Sub};

/// Homogeneous 3D vector (x, y, z, w)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Vec3 {
    fn default() -> Self {
        Vec3::ZERO
    }
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0, w: 1.0 };
    pub const FORWARD: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0, w: 1.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z, w: 1.0 }
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn len(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Scale to unit length.
    ///
    /// A zero-length vector yields NaN components. This is not guarded:
    /// degenerate geometry should show up downstream instead of being
    /// silently clamped.
    pub fn normalize(self) -> Vec3 {
        self / self.len()
    }

    pub fn scale(self, s: f64) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }

    /// Rotate around the X axis (radians)
    pub fn rotate_x(self, angle: f64) -> Vec3 {
        let (s, c) = angle.sin_cos();
        Vec3::new(self.x, c * self.y - s * self.z, s * self.y + c * self.z)
    }

    /// Rotate around the Y axis (radians)
    pub fn rotate_y(self, angle: f64) -> Vec3 {
        let (s, c) = angle.sin_cos();
        Vec3::new(c * self.x + s * self.z, self.y, -s * self.x + c * self.z)
    }

    /// Signed distance from this point to the plane through `plane_p` with
    /// normal `plane_n`. The normal must already be unit length.
    pub fn dist(self, plane_n: Vec3, plane_p: Vec3) -> f64 {
        plane_n.dot(self) - plane_n.dot(plane_p)
    }

    /// Intersect the segment `line_start -> line_end` with a plane.
    ///
    /// Returns the intersection point and the parametric position `t` along
    /// the segment, so callers can interpolate other attributes by the same
    /// amount.
    pub fn intersect_plane(plane_p: Vec3, plane_n: Vec3, line_start: Vec3, line_end: Vec3) -> (Vec3, f64) {
        let plane_n = plane_n.normalize();
        let plane_d = -plane_n.dot(plane_p);
        let ad = line_start.dot(plane_n);
        let bd = line_end.dot(plane_n);
        let t = (-plane_d - ad) / (bd - ad);
        let start_to_end = line_end - line_start;
        (line_start + start_to_end * t, t)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f64) -> Vec3 {
        self.scale(s)
    }
}

impl Div<f64> for Vec3 {
    type Output = Vec3;
    fn div(self, s: f64) -> Vec3 {
        Vec3::new(self.x / s, self.y / s, self.z / s)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Self {
        Vec3::new(v[0], v[1], v[2])
    }
}

/// Texture coordinate (u, v) plus a `w` channel.
///
/// After the perspective divide `u` and `v` hold `u/w_clip`, `v/w_clip` and
/// `w` holds `1/w_clip`, which the scan converter interpolates linearly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub u: f64,
    pub v: f64,
    pub w: f64,
}

impl Default for Vec2 {
    fn default() -> Self {
        Self { u: 0.0, v: 0.0, w: 1.0 }
    }
}

impl Vec2 {
    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v, w: 1.0 }
    }

    /// Interpolate all three channels from `self` towards `other`
    pub fn lerp(self, other: Vec2, t: f64) -> Vec2 {
        Vec2 {
            u: t * (other.u - self.u) + self.u,
            v: t * (other.v - self.v) + self.v,
            w: t * (other.w - self.w) + self.w,
        }
    }
}

#[cfg(test)]
pub(crate) fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
