//! Triangles and single-plane clipping

use super::math::{Vec2, Vec3};
use super::types::Color;

/// A triangle flowing through the pipeline.
///
/// `t[i]` is the texture coordinate of `p[i]`. Every stage produces new
/// values; nothing is shared between a triangle and its clipped children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub p: [Vec3; 3],
    pub t: [Vec2; 3],
    /// Lighting term in 0..1
    pub shade: f64,
    /// Index into the scene's texture list
    pub texture: Option<usize>,
    pub color: Color,
}

impl Default for Triangle {
    fn default() -> Self {
        Self {
            p: [Vec3::ZERO; 3],
            t: [Vec2::default(); 3],
            shade: 1.0,
            texture: None,
            color: Color::WHITE,
        }
    }
}

/// Result of clipping one triangle against one plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipResult {
    /// Entirely on the outside
    Culled,
    /// Entirely on the inside, passed through unchanged
    Unclipped(Triangle),
    /// One vertex inside
    One(Triangle),
    /// Two vertices inside; the remaining quad split in two
    Two(Triangle, Triangle),
}

impl ClipResult {
    pub fn count(&self) -> usize {
        match self {
            ClipResult::Culled => 0,
            ClipResult::Unclipped(_) | ClipResult::One(_) => 1,
            ClipResult::Two(_, _) => 2,
        }
    }

    /// Push the surviving triangles onto `out`, preserving order
    pub fn extend_into<E: Extend<Triangle>>(self, out: &mut E) {
        match self {
            ClipResult::Culled => {}
            ClipResult::Unclipped(t) | ClipResult::One(t) => out.extend([t]),
            ClipResult::Two(a, b) => out.extend([a, b]),
        }
    }
}

impl Triangle {
    pub fn new(p: [Vec3; 3], t: [Vec2; 3]) -> Self {
        Self { p, t, ..Default::default() }
    }

    pub fn from_positions(p0: Vec3, p1: Vec3, p2: Vec3) -> Self {
        Self::new([p0, p1, p2], [Vec2::default(); 3])
    }

    pub fn with_texture(mut self, texture: Option<usize>) -> Self {
        self.texture = texture;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Copy of this triangle with new positions, keeping texture coords,
    /// shade, texture and color
    pub fn with_positions(&self, p: [Vec3; 3]) -> Self {
        Self { p, ..*self }
    }

    /// Clip against the plane through `plane_p` with normal `plane_n`.
    ///
    /// The inside is the half-space the normal points into (distance >= 0).
    /// Inside and outside vertices keep their original winding order. New
    /// vertices are placed on the plane and their texture coordinates are
    /// interpolated by the same parameter as the position.
    pub fn clip_against_plane(&self, plane_p: Vec3, plane_n: Vec3) -> ClipResult {
        let plane_n = plane_n.normalize();

        let mut inside = [0usize; 3];
        let mut inside_count = 0;
        let mut outside = [0usize; 3];
        let mut outside_count = 0;

        for i in 0..3 {
            if self.p[i].dist(plane_n, plane_p) >= 0.0 {
                inside[inside_count] = i;
                inside_count += 1;
            } else {
                outside[outside_count] = i;
                outside_count += 1;
            }
        }

        // Intersection of the edge from vertex `a` (inside) to `b` (outside)
        let split = |a: usize, b: usize| -> (Vec3, Vec2) {
            let (point, t) = Vec3::intersect_plane(plane_p, plane_n, self.p[a], self.p[b]);
            (point, self.t[a].lerp(self.t[b], t))
        };

        match inside_count {
            0 => ClipResult::Culled,
            3 => ClipResult::Unclipped(*self),
            1 => {
                let i0 = inside[0];
                let (p1, t1) = split(i0, outside[0]);
                let (p2, t2) = split(i0, outside[1]);

                ClipResult::One(Triangle {
                    p: [self.p[i0], p1, p2],
                    t: [self.t[i0], t1, t2],
                    ..*self
                })
            }
            _ => {
                let (i0, i1) = (inside[0], inside[1]);
                let (pa, ta) = split(i0, outside[0]);
                let (pb, tb) = split(i1, outside[0]);

                let first = Triangle {
                    p: [self.p[i0], self.p[i1], pa],
                    t: [self.t[i0], self.t[i1], ta],
                    ..*self
                };
                // Shares the edge intersection computed for `first`
                let second = Triangle {
                    p: [self.p[i1], pa, pb],
                    t: [self.t[i1], ta, tb],
                    ..*self
                };

                ClipResult::Two(first, second)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Triangle {
        Triangle::new(
            [a.into(), b.into(), c.into()],
            [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
        )
    }

    const PLANE_P: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };
    const PLANE_N: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0, w: 1.0 };

    #[test]
    fn test_all_inside_passes_through() {
        let t = tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let result = t.clip_against_plane(PLANE_P, PLANE_N);
        assert_eq!(result.count(), 1);
        assert_eq!(result, ClipResult::Unclipped(t));
    }

    #[test]
    fn test_all_outside_culled() {
        let t = tri([0.0, 0.0, -1.0], [1.0, 0.0, -2.0], [0.0, 1.0, -0.5]);
        assert_eq!(t.clip_against_plane(PLANE_P, PLANE_N), ClipResult::Culled);
    }

    #[test]
    fn test_one_inside_new_points_on_plane() {
        let mut t = tri([0.0, 0.0, -1.0], [1.0, 0.0, 3.0], [2.0, 1.0, -2.0]);
        t.shade = 0.42;
        t.texture = Some(3);

        let ClipResult::One(out) = t.clip_against_plane(PLANE_P, PLANE_N) else {
            panic!("expected one triangle");
        };

        assert_eq!(out.p[0], t.p[1]);
        assert_eq!(out.t[0], t.t[1]);
        for p in &out.p[1..] {
            assert!(p.dist(PLANE_N, PLANE_P).abs() < 1e-9);
        }
        assert_eq!(out.shade, 0.42);
        assert_eq!(out.texture, Some(3));

        // p1 lies three quarters of the way from the inside vertex (z=3) to z=-1
        assert!((out.t[1].u - 0.25).abs() < 1e-9);
        assert!((out.p[1].x - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_two_inside_splits_quad() {
        let t = tri([0.0, 0.0, 1.0], [2.0, 0.0, 1.0], [1.0, 2.0, -1.0]);
        let ClipResult::Two(a, b) = t.clip_against_plane(PLANE_P, PLANE_N) else {
            panic!("expected two triangles");
        };

        assert_eq!(a.p[0], t.p[0]);
        assert_eq!(a.p[1], t.p[1]);
        assert_eq!(b.p[0], t.p[1]);
        assert_eq!(b.p[1], a.p[2]);
        assert_eq!(b.t[1], a.t[2]);
        for p in [a.p[2], b.p[2]] {
            assert!(p.dist(PLANE_N, PLANE_P).abs() < 1e-9);
        }

        // Halfway along each edge to the outside vertex
        assert!((a.t[2].v - 0.5).abs() < 1e-9);
        assert!((b.t[2].u - 0.5).abs() < 1e-9);
        assert!((b.t[2].v - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_unnormalised_plane_normal() {
        let t = tri([0.0, 0.0, -1.0], [1.0, 0.0, 3.0], [2.0, 1.0, -2.0]);
        let a = t.clip_against_plane(PLANE_P, PLANE_N);
        let b = t.clip_against_plane(PLANE_P, Vec3::new(0.0, 0.0, 25.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_texcoord_w_interpolated() {
        let mut t = tri([0.0, 0.0, 1.0], [0.0, 1.0, -1.0], [1.0, 0.0, -1.0]);
        t.t[0].w = 2.0;
        t.t[1].w = 4.0;
        t.t[2].w = 6.0;
        let ClipResult::One(out) = t.clip_against_plane(PLANE_P, PLANE_N) else {
            panic!("expected one triangle");
        };
        assert!((out.t[1].w - 3.0).abs() < 1e-9);
        assert!((out.t[2].w - 4.0).abs() < 1e-9);
    }
}
