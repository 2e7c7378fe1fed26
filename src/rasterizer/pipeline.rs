//! Per-frame pipeline driver
//!
//! [`Renderer::raster`] turns object-space meshes into screen-space
//! triangles (cull, light, near clip, project). [`Renderer::draw`] clips
//! those against the screen edges and scan-converts them.

use super::assembler::{
    face_normal, is_visible, perspective_divide, projection_transform, shade, view_matrix,
    view_transform, viewport_scale, world_transform,
};
use super::camera::Camera;
use super::framebuffer::Framebuffer;
use super::math::Vec3;
use super::matrix::Mat4;
use super::render::{clip_to_screen, shaded_triangle, textured_triangle};
use super::triangle::Triangle;
use super::types::{Color, DrawMode, RasterSettings, Texture};
use super::zbuffer::ZBuffer;

/// One mesh as seen by the pipeline for a single frame
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    pub triangles: &'a [Triangle],
    pub world: Mat4,
    pub draw_mode: DrawMode,
}

/// Screen-space triangles sharing a draw mode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderBatch {
    pub draw_mode: DrawMode,
    pub triangles: Vec<Triangle>,
}

/// Triangle counts for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub submitted: usize,
    pub culled: usize,
    pub projected: usize,
    pub drawn: usize,
}

/// Render context: owns the pixel and depth buffers for its lifetime.
pub struct Renderer {
    pub framebuffer: Framebuffer,
    pub zbuffer: ZBuffer,
    pub settings: RasterSettings,
}

impl Renderer {
    pub fn new(width: usize, height: usize, settings: RasterSettings) -> Self {
        Self {
            framebuffer: Framebuffer::new(width, height),
            zbuffer: ZBuffer::new(width, height),
            settings,
        }
    }

    pub fn width(&self) -> usize {
        self.framebuffer.width
    }

    pub fn height(&self) -> usize {
        self.framebuffer.height
    }

    /// Geometry stage: world, cull, light, view, near clip, project.
    ///
    /// Returns one batch per item, in submission order. No depth sorting;
    /// the Z-buffer resolves visibility.
    pub fn raster(&self, items: &[DrawItem], camera: &Camera, stats: &mut FrameStats) -> Vec<RenderBatch> {
        let (view, _) = view_matrix(camera);
        let projection = camera.projection_matrix(self.settings.fov_mode);
        let light = Vec3::from(self.settings.light_dir);
        let near_p = Vec3::new(0.0, 0.0, camera.near);
        let near_n = Vec3::FORWARD;
        let (width, height) = (self.width(), self.height());

        let mut batches = Vec::with_capacity(items.len());
        let mut clipped = Vec::with_capacity(2);

        for item in items {
            let mut batch = RenderBatch {
                draw_mode: item.draw_mode,
                triangles: Vec::with_capacity(item.triangles.len()),
            };

            for tri in item.triangles {
                stats.submitted += 1;

                let world_tri = world_transform(tri, &item.world);
                let normal = face_normal(&world_tri);
                if !is_visible(&world_tri, normal, camera.position) {
                    stats.culled += 1;
                    continue;
                }

                let face_shade = shade(normal, light, self.settings.ambient);
                let viewed = view_transform(&world_tri, &view);

                clipped.clear();
                viewed.clip_against_plane(near_p, near_n).extend_into(&mut clipped);

                for fragment in &clipped {
                    let projected = projection_transform(fragment, &projection);
                    let mut screen = viewport_scale(&perspective_divide(&projected), width, height);
                    screen.shade = face_shade;
                    batch.triangles.push(screen);
                }
            }

            stats.projected += batch.triangles.len();
            batches.push(batch);
        }

        batches
    }

    /// Raster stage: clear, then screen-clip and fill every triangle.
    pub fn draw(&mut self, batches: &[RenderBatch], textures: &[Texture], stats: &mut FrameStats) {
        self.framebuffer.clear(self.settings.clear_color);
        self.zbuffer.reset();

        let (width, height) = (self.width(), self.height());

        for batch in batches {
            for tri in &batch.triangles {
                for piece in clip_to_screen(tri, width, height) {
                    self.draw_triangle(batch.draw_mode, &piece, textures);
                    stats.drawn += 1;
                }
            }
        }
    }

    fn draw_triangle(&mut self, mode: DrawMode, tri: &Triangle, textures: &[Texture]) {
        let [a, b, c] = tri.p;
        let (x0, y0, x1, y1, x2, y2) = (a.x as i32, a.y as i32, b.x as i32, b.y as i32, c.x as i32, c.y as i32);

        match mode {
            DrawMode::Textured => match tri.texture.and_then(|id| textures.get(id)) {
                Some(tex) => {
                    textured_triangle(&mut self.framebuffer, &mut self.zbuffer, tri, tex, &self.settings);
                }
                // Untextured meshes in textured mode fall back to their color
                None => {
                    shaded_triangle(&mut self.framebuffer, &mut self.zbuffer, tri, &self.settings);
                }
            },
            DrawMode::Wireframe => {
                self.framebuffer.draw_triangle(x0, y0, x1, y1, x2, y2, Color::WHITE.to_packed());
            }
            DrawMode::Surface => {
                self.framebuffer.fill_triangle(x0, y0, x1, y1, x2, y2, tri.color.to_packed());
            }
        }
    }

    /// Full frame: geometry then raster. The finished image is left in
    /// `self.framebuffer` for the display surface to read.
    pub fn render_frame(&mut self, items: &[DrawItem], camera: &Camera, textures: &[Texture]) -> FrameStats {
        let mut stats = FrameStats::default();
        let batches = self.raster(items, camera, &mut stats);
        self.draw(&batches, textures, &mut stats);

        tracing::trace!(
            submitted = stats.submitted,
            culled = stats.culled,
            projected = stats.projected,
            drawn = stats.drawn,
            "frame rendered"
        );
        stats
    }
}
