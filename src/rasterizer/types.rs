//! Core types for the rasterizer

use serde::{Deserialize, Serialize};
use super::matrix::FovMode;

/// RGB color (0-255 per channel)
///
/// Pixel and texel storage uses the packed `0x00RRGGBB` form; this struct
/// is the unpacked view used for per-channel math.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };
    pub const GRAY: Color = Color { r: 128, g: 128, b: 128 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255 };
    pub const ORANGE: Color = Color { r: 255, g: 165, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_packed(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
        }
    }

    pub const fn to_packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Scale every channel by `factor` (shading term)
    pub fn shade(self, factor: f64) -> Self {
        let scale = |c: u8| ((c as f64 * factor) as i64 & 0xff) as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
        }
    }

    /// Mix towards `other` by `ratio` (clamped to 0..1); 0 keeps `self`
    pub fn blend(self, other: Color, ratio: f64) -> Self {
        let ratio = ratio.clamp(0.0, 1.0);
        let inv = 1.0 - ratio;
        let mix = |a: u8, b: u8| (a as f64 * inv + b as f64 * ratio) as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    /// Channel-wise sum, wrapping at 8 bits
    pub fn mix(self, other: Color) -> Self {
        Self {
            r: self.r.wrapping_add(other.r),
            g: self.g.wrapping_add(other.g),
            b: self.b.wrapping_add(other.b),
        }
    }

    /// Channel-wise product, wrapping at 8 bits
    pub fn multiply(self, other: Color) -> Self {
        Self {
            r: self.r.wrapping_mul(other.r),
            g: self.g.wrapping_mul(other.g),
            b: self.b.wrapping_mul(other.b),
        }
    }

    /// Convert to [u8; 4] RGBA for display surfaces
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

/// Packed-RGB helpers used in the scan converter's inner loop
pub fn blend(col: u32, col2: u32, ratio: f64) -> u32 {
    Color::from_packed(col).blend(Color::from_packed(col2), ratio).to_packed()
}

pub fn dot_color(col: u32, factor: f64) -> u32 {
    Color::from_packed(col).shade(factor).to_packed()
}

/// Error raised when building a texture
#[derive(Debug)]
pub enum TextureError {
    Decode(String),
    NotPowerOfTwo { width: usize, height: usize },
    SizeMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for TextureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextureError::Decode(e) => write!(f, "Decode error: {}", e),
            TextureError::NotPowerOfTwo { width, height } => write!(
                f,
                "Texture is {}x{}, width and height must both be powers of two",
                width, height
            ),
            TextureError::SizeMismatch { expected, actual } => write!(
                f,
                "Expected {} pixels, got {}",
                expected, actual
            ),
        }
    }
}

impl std::error::Error for TextureError {}

/// Texture with power-of-two dimensions.
///
/// Sampling wraps with `& mask` and addresses rows with `<< width_shift`,
/// which is only correct because both dimensions are powers of two. The
/// constructors enforce that.
#[derive(Debug, Clone)]
pub struct Texture {
    width: usize,
    height: usize,
    width_mask: usize,
    height_mask: usize,
    width_shift: u32,
    pixels: Vec<u32>,
    pub name: String,
}

impl Texture {
    /// Build from packed RGB pixels in row-major order
    pub fn new(width: usize, height: usize, pixels: Vec<u32>, name: String) -> Result<Self, TextureError> {
        if !width.is_power_of_two() || !height.is_power_of_two() {
            return Err(TextureError::NotPowerOfTwo { width, height });
        }
        if pixels.len() != width * height {
            return Err(TextureError::SizeMismatch {
                expected: width * height,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            width_mask: width - 1,
            height_mask: height - 1,
            width_shift: width.trailing_zeros(),
            pixels,
            name,
        })
    }

    /// Load texture from an image file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|e| TextureError::Decode(format!("{}: {}", path.display(), e)))?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let tex = Self::from_image(img, name)?;
        tracing::info!(name = %tex.name, width = tex.width, height = tex.height, "loaded texture");
        Ok(tex)
    }

    /// Load texture from encoded image bytes
    pub fn from_bytes(bytes: &[u8], name: String) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| TextureError::Decode(e.to_string()))?;
        Self::from_image(img, name)
    }

    fn from_image(img: image::DynamicImage, name: String) -> Result<Self, TextureError> {
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();

        let pixels: Vec<u32> = rgb
            .pixels()
            .map(|p| Color::new(p[0], p[1], p[2]).to_packed())
            .collect();

        Self::new(width as usize, height as usize, pixels, name)
    }

    /// Create a checkerboard test texture (cells of 4x4 texels)
    pub fn checkerboard(width: usize, height: usize, color1: Color, color2: Color) -> Result<Self, TextureError> {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 }.to_packed());
            }
        }
        Self::new(width, height, pixels, "checkerboard".to_string())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width_mask(&self) -> usize {
        self.width_mask
    }

    pub fn height_mask(&self) -> usize {
        self.height_mask
    }

    pub fn width_shift(&self) -> u32 {
        self.width_shift
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Sample at normalised (u, v) with wrap-around addressing.
    ///
    /// The scaled coordinate is truncated towards zero and masked, so
    /// negative and >1 coordinates tile instead of clamping. NaN maps to 0.
    #[inline]
    pub fn sample(&self, u: f64, v: f64) -> u32 {
        let iu = ((u * self.width as f64) as i64 & self.width_mask as i64) as usize;
        let iv = ((v * self.height as f64) as i64 & self.height_mask as i64) as usize;
        self.pixels[iu + (iv << self.width_shift)]
    }

    /// Get texel at x,y coordinates (black when out of range)
    pub fn get_pixel(&self, x: usize, y: usize) -> u32 {
        if x < self.width && y < self.height {
            self.pixels[x + (y << self.width_shift)]
        } else {
            0
        }
    }
}

/// How a mesh is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrawMode {
    /// Perspective-correct texture mapping with depth test
    #[default]
    Textured,
    /// White triangle outlines
    Wireframe,
    /// Flat fill with the triangle's color
    Surface,
}

/// Rasterizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Scale texels by the face shading term
    pub lighting: bool,
    /// Blend texels towards the fog color by this visibility factor
    /// (1.0 = no fog, 0.0 = fog only)
    pub fog: Option<f64>,
    /// Field-of-view conversion for the projection matrix
    pub fov_mode: FovMode,
    /// Light direction (normalised when the shade term is computed)
    pub light_dir: [f64; 3],
    /// Lower bound for the shading term
    pub ambient: f64,
    /// Frame clear color
    pub clear_color: Color,
}

impl RasterSettings {
    /// Fog color used when `fog` is enabled
    pub fn fog_color() -> Color {
        Color::GRAY.blend(Color::WHITE, 0.4)
    }
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            lighting: true,
            fog: None,
            fov_mode: FovMode::Corrected,
            light_dir: [0.0, 0.0, -1.0],
            ambient: 0.1,
            clear_color: Color::BLACK,
        }
    }
}
