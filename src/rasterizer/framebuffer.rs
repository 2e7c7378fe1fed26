//! Pixel buffer for software rendering

use super::types::Color;

/// Packed-RGB pixel buffer sized to the fixed render resolution.
///
/// Allocated once and cleared every frame. Writes outside the buffer are
/// dropped silently.
pub struct Framebuffer {
    pub pixels: Vec<u32>,
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height],
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color.to_packed());
    }

    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, col: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.pixels[x as usize + y as usize * self.width] = col;
        }
    }

    pub fn get_pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[x + y * self.width])
        } else {
            None
        }
    }

    /// RGBA bytes for display surfaces
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &p in &self.pixels {
            out.extend_from_slice(&Color::from_packed(p).to_rgba());
        }
        out
    }

    /// Draw a line from (x0, y0) to (x1, y1) using Bresenham's algorithm
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, col: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            self.set_pixel(x, y, col);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Triangle outline
    pub fn draw_triangle(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, x2: i32, y2: i32, col: u32) {
        self.draw_line(x0, y0, x1, y1, col);
        self.draw_line(x1, y1, x2, y2, col);
        self.draw_line(x2, y2, x0, y0, col);
    }

    /// Horizontal span, both ends inclusive
    fn draw_span(&mut self, x_start: i32, x_end: i32, y: i32, col: u32) {
        for x in x_start..=x_end {
            self.set_pixel(x, y, col);
        }
    }

    /// Flat-colored triangle without depth test.
    ///
    /// Vertices are sorted by y and both halves are filled by walking the
    /// long edge against the two short ones.
    pub fn fill_triangle(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, x2: i32, y2: i32, col: u32) {
        let mut v = [(x0, y0), (x1, y1), (x2, y2)];
        v.sort_by_key(|&(_, y)| y);
        let [(ax, ay), (bx, by), (cx, cy)] = v;

        if ay == cy {
            let min = ax.min(bx).min(cx);
            let max = ax.max(bx).max(cx);
            self.draw_span(min, max, ay, col);
            return;
        }

        let edge_x = |ya: i32, xa: i32, yb: i32, xb: i32, y: i32| -> i32 {
            if yb == ya {
                xa
            } else {
                xa + ((xb - xa) as i64 * (y - ya) as i64 / (yb - ya) as i64) as i32
            }
        };

        for y in ay..=cy {
            let long = edge_x(ay, ax, cy, cx, y);
            let short = if y < by {
                edge_x(ay, ax, by, bx, y)
            } else {
                edge_x(by, bx, cy, cx, y)
            };
            self.draw_span(long.min(short), long.max(short), y, col);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_pixel_bounds() {
        let mut fb = Framebuffer::new(4, 4);
        fb.set_pixel(-1, 0, 7);
        fb.set_pixel(0, 4, 7);
        fb.set_pixel(4, 0, 7);
        assert!(fb.pixels.iter().all(|&p| p == 0));
        fb.set_pixel(3, 3, 7);
        assert_eq!(fb.get_pixel(3, 3), Some(7));
    }

    #[test]
    fn test_clear() {
        let mut fb = Framebuffer::new(3, 2);
        fb.clear(Color::RED);
        assert!(fb.pixels.iter().all(|&p| p == 0xff0000));
        assert_eq!(&fb.to_rgba()[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_draw_line_endpoints() {
        let mut fb = Framebuffer::new(10, 10);
        fb.draw_line(1, 1, 8, 5, 1);
        assert_eq!(fb.get_pixel(1, 1), Some(1));
        assert_eq!(fb.get_pixel(8, 5), Some(1));
        // Clipped off-screen segments must not panic
        fb.draw_line(-20, -3, 30, 12, 2);
    }

    #[test]
    fn test_fill_triangle_covers_interior() {
        let mut fb = Framebuffer::new(16, 16);
        fb.fill_triangle(1, 1, 14, 1, 1, 14, 5);
        assert_eq!(fb.get_pixel(3, 3), Some(5));
        assert_eq!(fb.get_pixel(1, 14), Some(5));
        assert_eq!(fb.get_pixel(14, 14), Some(0));
    }
}
