//! Screen-space clipping and the textured scan converter

use std::collections::VecDeque;

use super::framebuffer::Framebuffer;
use super::math::{Vec2, Vec3};
use super::triangle::Triangle;
use super::types::{blend, dot_color, RasterSettings, Texture};
use super::zbuffer::ZBuffer;

/// Screen edges as (point, inward normal): top, bottom, left, right
fn screen_planes(width: usize, height: usize) -> [(Vec3, Vec3); 4] {
    let max_x = width as f64 - 1.0;
    let max_y = height as f64 - 1.0;
    [
        (Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
        (Vec3::new(0.0, max_y, 0.0), Vec3::new(0.0, -1.0, 0.0)),
        (Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
        (Vec3::new(max_x, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)),
    ]
}

/// Clip a screen-space triangle against the four screen edges.
///
/// Works through a queue one plane at a time: every triangle produced by
/// the previous plane is clipped against the next one. Everything returned
/// lies inside `[0, width-1] x [0, height-1]`.
pub fn clip_to_screen(tri: &Triangle, width: usize, height: usize) -> Vec<Triangle> {
    let mut queue = VecDeque::with_capacity(8);
    queue.push_back(*tri);
    let mut pending = 1;

    for (plane_p, plane_n) in screen_planes(width, height) {
        while pending > 0 {
            let Some(test) = queue.pop_front() else {
                break;
            };
            pending -= 1;
            test.clip_against_plane(plane_p, plane_n).extend_into(&mut queue);
        }
        pending = queue.len();
    }

    queue.into()
}

/// Scan-converter vertex: integer pixel position plus divided texcoords
#[derive(Clone, Copy)]
struct ScanVertex {
    x: i32,
    y: i32,
    t: Vec2,
}

impl ScanVertex {
    fn from_triangle(tri: &Triangle, i: usize) -> Self {
        Self {
            x: tri.p[i].x as i32,
            y: tri.p[i].y as i32,
            t: tri.t[i],
        }
    }
}

/// Per-scanline step of `delta` over `dy`, or 0 for a flat edge
#[inline]
fn step(delta: f64, dy: i32) -> f64 {
    if dy != 0 {
        delta / dy.abs() as f64
    } else {
        0.0
    }
}

/// Steps for one edge: x, u, v, w
#[derive(Clone, Copy, Default)]
struct EdgeStep {
    x: f64,
    u: f64,
    v: f64,
    w: f64,
}

impl EdgeStep {
    fn between(a: &ScanVertex, b: &ScanVertex) -> Self {
        let dy = b.y - a.y;
        Self {
            x: step((b.x - a.x) as f64, dy),
            u: step(b.t.u - a.t.u, dy),
            v: step(b.t.v - a.t.v, dy),
            w: step(b.t.w - a.t.w, dy),
        }
    }

    /// Edge position and texcoord `rows` scanlines below `origin`
    #[inline]
    fn at(&self, origin: &ScanVertex, rows: i32) -> (i32, Vec2) {
        let r = rows as f64;
        let x = (origin.x as f64 + r * self.x) as i32;
        let t = Vec2 {
            u: origin.t.u + r * self.u,
            v: origin.t.v + r * self.v,
            w: origin.t.w + r * self.w,
        };
        (x, t)
    }
}

/// What a span writes into each pixel that passes the depth test
#[derive(Clone, Copy)]
enum SpanFill<'a> {
    Texture(&'a Texture),
    /// Packed RGB
    Solid(u32),
}

impl SpanFill<'_> {
    #[inline]
    fn color(&self, u: f64, v: f64) -> u32 {
        match self {
            SpanFill::Texture(tex) => tex.sample(u, v),
            SpanFill::Solid(col) => *col,
        }
    }
}

/// Fill one row between two edge points, depth-testing every pixel.
#[inline]
#[allow(clippy::too_many_arguments)]
fn draw_span(
    fb: &mut Framebuffer,
    zbuf: &mut ZBuffer,
    y: i32,
    mut ax: i32,
    mut bx: i32,
    mut start: Vec2,
    mut end: Vec2,
    fill: SpanFill,
    shade: f64,
    settings: &RasterSettings,
) {
    if ax > bx {
        std::mem::swap(&mut ax, &mut bx);
        std::mem::swap(&mut start, &mut end);
    }
    if bx == ax {
        return;
    }

    let fog_color = RasterSettings::fog_color().to_packed();
    let tstep = 1.0 / (bx - ax) as f64;
    let mut t = 0.0;

    for x in ax..bx {
        let tex_u = (1.0 - t) * start.u + t * end.u;
        let tex_v = (1.0 - t) * start.v + t * end.v;
        let tex_w = (1.0 - t) * start.w + t * end.w;
        let depth = tex_w.abs();

        if zbuf.check_depth(x, y, depth) {
            let mut col = fill.color(tex_u / tex_w, tex_v / tex_w);

            if let Some(visibility) = settings.fog {
                col = blend(fog_color, col, visibility);
            }
            if settings.lighting {
                col = dot_color(col, shade);
            }

            fb.set_pixel(x, y, col);
            zbuf.set_depth(x, y, depth);
        }

        t += tstep;
    }
}

/// Perspective-correct textured fill.
///
/// Expects pixel-space positions and texcoords already divided by `w`
/// (`t.w = 1/w`). Vertices are sorted by y, then the upper half walks
/// v0->v1 against the long edge v0->v2 and the lower half walks v1->v2
/// against the same long edge.
pub fn textured_triangle(
    fb: &mut Framebuffer,
    zbuf: &mut ZBuffer,
    tri: &Triangle,
    tex: &Texture,
    settings: &RasterSettings,
) {
    scan_triangle(fb, zbuf, tri, SpanFill::Texture(tex), settings);
}

/// Depth-tested fill with the triangle's own color, for meshes without a
/// texture. Same scan order, fog and lighting as [`textured_triangle`].
pub fn shaded_triangle(fb: &mut Framebuffer, zbuf: &mut ZBuffer, tri: &Triangle, settings: &RasterSettings) {
    scan_triangle(fb, zbuf, tri, SpanFill::Solid(tri.color.to_packed()), settings);
}

fn scan_triangle(fb: &mut Framebuffer, zbuf: &mut ZBuffer, tri: &Triangle, fill: SpanFill, settings: &RasterSettings) {
    let mut v1 = ScanVertex::from_triangle(tri, 0);
    let mut v2 = ScanVertex::from_triangle(tri, 1);
    let mut v3 = ScanVertex::from_triangle(tri, 2);

    if v2.y < v1.y {
        std::mem::swap(&mut v1, &mut v2);
    }
    if v3.y < v1.y {
        std::mem::swap(&mut v1, &mut v3);
    }
    if v3.y < v2.y {
        std::mem::swap(&mut v2, &mut v3);
    }

    let long = EdgeStep::between(&v1, &v3);

    let upper = EdgeStep::between(&v1, &v2);
    if v2.y != v1.y {
        for y in v1.y..=v2.y {
            let (ax, start) = upper.at(&v1, y - v1.y);
            let (bx, end) = long.at(&v1, y - v1.y);
            draw_span(fb, zbuf, y, ax, bx, start, end, fill, tri.shade, settings);
        }
    }

    let lower = EdgeStep::between(&v2, &v3);
    if v3.y != v2.y {
        for y in v2.y..=v3.y {
            let (ax, start) = lower.at(&v2, y - v2.y);
            let (bx, end) = long.at(&v1, y - v1.y);
            draw_span(fb, zbuf, y, ax, bx, start, end, fill, tri.shade, settings);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::types::Color;

    fn screen_tri(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Triangle {
        Triangle::new(
            [Vec3::new(a.0, a.1, 0.5), Vec3::new(b.0, b.1, 0.5), Vec3::new(c.0, c.1, 0.5)],
            [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
        )
    }

    fn solid(color: Color) -> Texture {
        Texture::new(2, 2, vec![color.to_packed(); 4], "solid".into()).unwrap_or_else(|e| panic!("{e}"))
    }

    fn unlit() -> RasterSettings {
        RasterSettings { lighting: false, ..Default::default() }
    }

    #[test]
    fn test_clip_inside_untouched() {
        let tri = screen_tri((10.0, 10.0), (50.0, 10.0), (10.0, 50.0));
        let out = clip_to_screen(&tri, 100, 100);
        assert_eq!(out, vec![tri]);
    }

    #[test]
    fn test_clip_fully_outside() {
        let tri = screen_tri((-30.0, 10.0), (-10.0, 10.0), (-20.0, 50.0));
        assert!(clip_to_screen(&tri, 100, 100).is_empty());
    }

    #[test]
    fn test_clip_keeps_fragments_on_screen() {
        let tri = screen_tri((-50.0, -40.0), (180.0, 20.0), (30.0, 170.0));
        let out = clip_to_screen(&tri, 100, 80);
        assert!(!out.is_empty());
        for t in &out {
            for p in &t.p {
                assert!(p.x >= -1e-9 && p.x <= 99.0 + 1e-9, "x = {}", p.x);
                assert!(p.y >= -1e-9 && p.y <= 79.0 + 1e-9, "y = {}", p.y);
            }
        }
    }

    #[test]
    fn test_textured_fill_writes_pixels_and_depth() {
        let mut fb = Framebuffer::new(32, 32);
        let mut zbuf = ZBuffer::new(32, 32);
        let tri = screen_tri((2.0, 2.0), (28.0, 2.0), (2.0, 28.0));

        textured_triangle(&mut fb, &mut zbuf, &tri, &solid(Color::RED), &unlit());

        assert_eq!(fb.get_pixel(5, 5), Some(0xff0000));
        assert_eq!(zbuf.get(5, 5), Some(1.0));
        assert_eq!(fb.get_pixel(27, 27), Some(0));
    }

    #[test]
    fn test_degenerate_triangle_draws_nothing() {
        let mut fb = Framebuffer::new(16, 16);
        let mut zbuf = ZBuffer::new(16, 16);
        let flat = screen_tri((1.0, 4.0), (8.0, 4.0), (12.0, 4.0));
        let vertical = screen_tri((5.0, 1.0), (5.0, 6.0), (5.0, 12.0));

        textured_triangle(&mut fb, &mut zbuf, &flat, &solid(Color::RED), &unlit());
        textured_triangle(&mut fb, &mut zbuf, &vertical, &solid(Color::RED), &unlit());

        assert!(fb.pixels.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_closer_triangle_wins() {
        let mut fb = Framebuffer::new(16, 16);
        let mut zbuf = ZBuffer::new(16, 16);

        let mut near = screen_tri((0.0, 0.0), (15.0, 0.0), (0.0, 15.0));
        let mut far = near;
        for t in near.t.iter_mut() {
            t.w = 0.5;
        }
        for t in far.t.iter_mut() {
            t.w = 0.1;
        }

        textured_triangle(&mut fb, &mut zbuf, &near, &solid(Color::GREEN), &unlit());
        textured_triangle(&mut fb, &mut zbuf, &far, &solid(Color::BLUE), &unlit());
        assert_eq!(fb.get_pixel(3, 3), Some(Color::GREEN.to_packed()));
    }

    #[test]
    fn test_shaded_fill_uses_depth() {
        let mut fb = Framebuffer::new(16, 16);
        let mut zbuf = ZBuffer::new(16, 16);

        let mut near = screen_tri((0.0, 0.0), (15.0, 0.0), (0.0, 15.0)).with_color(Color::GREEN);
        let mut far = near.with_color(Color::BLUE);
        for t in near.t.iter_mut() {
            t.w = 0.5;
        }
        for t in far.t.iter_mut() {
            t.w = 0.1;
        }

        shaded_triangle(&mut fb, &mut zbuf, &near, &unlit());
        shaded_triangle(&mut fb, &mut zbuf, &far, &unlit());
        assert_eq!(fb.get_pixel(3, 3), Some(Color::GREEN.to_packed()));
        assert_eq!(zbuf.get(3, 3), Some(0.5));

        let mut lit = screen_tri((0.0, 0.0), (15.0, 0.0), (0.0, 15.0)).with_color(Color::new(200, 100, 50));
        lit.shade = 0.5;
        zbuf.reset();
        let settings = RasterSettings { lighting: true, ..Default::default() };
        shaded_triangle(&mut fb, &mut zbuf, &lit, &settings);
        assert_eq!(fb.get_pixel(2, 2), Some(0x643219));
    }

    #[test]
    fn test_lighting_and_fog() {
        let mut fb = Framebuffer::new(16, 16);
        let mut zbuf = ZBuffer::new(16, 16);
        let mut tri = screen_tri((0.0, 0.0), (15.0, 0.0), (0.0, 15.0));
        tri.shade = 0.5;

        let settings = RasterSettings { lighting: true, fog: Some(1.0), ..Default::default() };
        textured_triangle(&mut fb, &mut zbuf, &tri, &solid(Color::new(200, 100, 50)), &settings);
        assert_eq!(fb.get_pixel(2, 2), Some(0x643219));

        zbuf.reset();
        let fogged = RasterSettings { lighting: false, fog: Some(0.0), ..Default::default() };
        textured_triangle(&mut fb, &mut zbuf, &tri, &solid(Color::RED), &fogged);
        assert_eq!(fb.get_pixel(2, 2), Some(RasterSettings::fog_color().to_packed()));
    }
}
