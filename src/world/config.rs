//! Scene files
//!
//! Uses RON (Rusty Object Notation) for human-readable scene descriptions.
//! Every field has a default, so a file only lists what it changes.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{create_test_cube, load_obj, Behavior, ObjError, Scene, SceneObject, Transform};
use crate::rasterizer::{Camera, Color, DrawMode, Lens, RasterSettings, Texture, TextureError, Vec3, HEIGHT, WIDTH};

/// Largest accepted width or height, in pixels
pub const MAX_SIDE: usize = u16::MAX as usize;

/// Error type for scene loading
#[derive(Debug)]
pub enum SceneError {
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
    Serialize(ron::Error),
    Obj { path: PathBuf, source: ObjError },
    Texture { path: PathBuf, source: TextureError },
    Invalid(String),
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        SceneError::Io(e)
    }
}

impl From<ron::error::SpannedError> for SceneError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneError::Parse(e)
    }
}

impl From<ron::Error> for SceneError {
    fn from(e: ron::Error) -> Self {
        SceneError::Serialize(e)
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::Io(e) => write!(f, "IO error: {}", e),
            SceneError::Parse(e) => write!(f, "Parse error: {}", e),
            SceneError::Serialize(e) => write!(f, "Serialize error: {}", e),
            SceneError::Obj { path, source } => write!(f, "Mesh {}: {}", path.display(), source),
            SceneError::Texture { path, source } => write!(f, "Texture {}: {}", path.display(), source),
            SceneError::Invalid(msg) => write!(f, "Invalid scene: {}", msg),
        }
    }
}

impl std::error::Error for SceneError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f64; 3],
    pub yaw: f64,
    pub pitch: f64,
    pub lens: Lens,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            yaw: 0.0,
            pitch: 0.0,
            lens: Lens::default(),
        }
    }
}

/// Where an object's triangles come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeshSource {
    /// Built-in 2x2x2 cube
    Cube,
    Obj { path: PathBuf, textured: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TextureSource {
    /// Image file; both sides must be powers of two
    File(PathBuf),
    /// Procedural checkerboard, `size` x `size` texels
    Checkerboard { size: usize, colors: (Color, Color) },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectConfig {
    pub mesh: MeshSource,
    pub texture: Option<TextureSource>,
    pub draw_mode: DrawMode,
    pub color: Color,
    pub transform: Transform,
    pub behavior: Behavior,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            mesh: MeshSource::Cube,
            texture: None,
            draw_mode: DrawMode::default(),
            color: Color::WHITE,
            transform: Transform::default(),
            behavior: Behavior::Static,
        }
    }
}

/// Top-level scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub width: usize,
    pub height: usize,
    pub camera: CameraConfig,
    pub render: RasterSettings,
    pub objects: Vec<ObjectConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            camera: CameraConfig::default(),
            render: RasterSettings::default(),
            objects: Vec::new(),
        }
    }
}

/// Everything needed to start rendering a scene file
#[derive(Debug, Clone)]
pub struct SceneSetup {
    pub width: usize,
    pub height: usize,
    pub camera: Camera,
    pub settings: RasterSettings,
    pub scene: Scene,
}

impl SceneConfig {
    /// Load meshes and textures and assemble the scene.
    ///
    /// Relative asset paths are resolved against `base_dir`. Any missing
    /// or malformed asset aborts the build.
    pub fn build(&self, base_dir: &Path) -> Result<SceneSetup, SceneError> {
        if self.width == 0 || self.height == 0 {
            return Err(SceneError::Invalid(format!(
                "resolution {}x{} has a zero side",
                self.width, self.height
            )));
        }
        // Display surfaces take u16 sides
        if self.width > MAX_SIDE || self.height > MAX_SIDE {
            return Err(SceneError::Invalid(format!(
                "resolution {}x{} exceeds {} on a side",
                self.width, self.height, MAX_SIDE
            )));
        }

        let Lens { fov, near, far } = self.camera.lens;
        if !(near > 0.0 && far > near && far.is_finite()) {
            return Err(SceneError::Invalid(format!(
                "lens needs 0 < near < far, got near {} far {}",
                near, far
            )));
        }
        if !(fov > 0.0 && fov < 180.0) {
            return Err(SceneError::Invalid(format!("field of view {} is outside 0..180 degrees", fov)));
        }

        let mut scene = Scene::new();
        let mut loaded: HashMap<PathBuf, usize> = HashMap::new();

        for object in &self.objects {
            let texture = match &object.texture {
                None => None,
                Some(TextureSource::File(path)) => {
                    let path = base_dir.join(path);
                    let slot = match loaded.get(&path) {
                        Some(&slot) => slot,
                        None => {
                            let texture = Texture::from_file(&path).map_err(|source| SceneError::Texture {
                                path: path.clone(),
                                source,
                            })?;
                            let slot = scene.add_texture(texture);
                            loaded.insert(path, slot);
                            slot
                        }
                    };
                    Some(slot)
                }
                Some(TextureSource::Checkerboard { size, colors }) => {
                    let texture = Texture::checkerboard(*size, *size, colors.0, colors.1).map_err(|source| {
                        SceneError::Texture {
                            path: PathBuf::from("<checkerboard>"),
                            source,
                        }
                    })?;
                    Some(scene.add_texture(texture))
                }
            };

            let mesh = match &object.mesh {
                MeshSource::Cube => create_test_cube(),
                MeshSource::Obj { path, textured } => {
                    let path = base_dir.join(path);
                    load_obj(&path, *textured).map_err(|source| SceneError::Obj { path, source })?
                }
            };

            let mesh = mesh
                .with_draw_mode(object.draw_mode)
                .with_texture(texture)
                .with_color(object.color);

            scene.add_object(
                SceneObject::new(mesh)
                    .with_transform(object.transform)
                    .with_behavior(object.behavior),
            );
        }

        let [x, y, z] = self.camera.position;
        let camera = Camera::new(self.width, self.height)
            .with_lens(self.camera.lens)
            .with_pose(Vec3::new(x, y, z), self.camera.yaw, self.camera.pitch);

        tracing::info!(
            objects = scene.objects.len(),
            triangles = scene.triangle_count(),
            textures = scene.textures.len(),
            "scene built"
        );

        Ok(SceneSetup {
            width: self.width,
            height: self.height,
            camera,
            settings: self.render.clone(),
            scene,
        })
    }
}

/// Load a scene description from a RON file
pub fn load_scene_config<P: AsRef<Path>>(path: P) -> Result<SceneConfig, SceneError> {
    let contents = fs::read_to_string(path)?;
    load_scene_config_from_str(&contents)
}

/// Load a scene description from a RON string (for embedded scenes or testing)
pub fn load_scene_config_from_str(s: &str) -> Result<SceneConfig, SceneError> {
    Ok(ron::from_str(s)?)
}

/// Save a scene description to a RON file
pub fn save_scene_config<P: AsRef<Path>>(config: &SceneConfig, path: P) -> Result<(), SceneError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Load a scene file and build it, resolving assets next to the file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneSetup, SceneError> {
    let path = path.as_ref();
    let config = load_scene_config(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    tracing::info!(path = %path.display(), "loading scene");
    config.build(base_dir)
}

/// Spinning checkerboard cube in front of the camera
pub fn default_scene() -> SceneConfig {
    SceneConfig {
        objects: vec![ObjectConfig {
            texture: Some(TextureSource::Checkerboard {
                size: 32,
                colors: (Color::ORANGE, Color::GRAY),
            }),
            transform: Transform {
                position: [0.0, 0.0, 5.0],
                rotation: [0.0, 0.0, 0.0],
            },
            behavior: Behavior::Spin([0.5, 1.0, 0.0]),
            ..Default::default()
        }],
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::{FovMode, Renderer};

    #[test]
    fn test_minimal_file_uses_defaults() {
        let config = load_scene_config_from_str("()").unwrap();
        assert_eq!(config, SceneConfig::default());
        assert_eq!((config.width, config.height), (WIDTH, HEIGHT));
        assert!(config.render.lighting);
        assert_eq!(config.render.fov_mode, FovMode::Corrected);
    }

    #[test]
    fn test_parse_full_scene() {
        let src = r#"(
            width: 160,
            height: 120,
            camera: (position: (0.0, 1.0, -3.0), yaw: 0.25, lens: (fov: 60.0)),
            render: (lighting: false, fog: Some(0.5), fov_mode: Legacy),
            objects: [
                (
                    mesh: Cube,
                    texture: Some(Checkerboard(size: 8, colors: ((r: 255, g: 0, b: 0), (r: 0, g: 0, b: 255)))),
                    transform: (position: (0.0, 0.0, 4.0)),
                    behavior: Spin((0.0, 1.0, 0.0)),
                ),
                (mesh: Obj(path: "models/ship.obj", textured: false), draw_mode: Wireframe),
            ],
        )"#;

        let config = load_scene_config_from_str(src).unwrap();
        assert_eq!(config.width, 160);
        assert_eq!(config.camera.position, [0.0, 1.0, -3.0]);
        assert_eq!(config.camera.lens.fov, 60.0);
        assert_eq!(config.camera.lens.near, 0.1);
        assert!(!config.render.lighting);
        assert_eq!(config.render.fog, Some(0.5));
        assert_eq!(config.render.fov_mode, FovMode::Legacy);
        assert_eq!(config.objects.len(), 2);
        assert_eq!(config.objects[0].behavior, Behavior::Spin([0.0, 1.0, 0.0]));
        assert_eq!(config.objects[1].draw_mode, DrawMode::Wireframe);
        assert_eq!(
            config.objects[1].mesh,
            MeshSource::Obj { path: PathBuf::from("models/ship.obj"), textured: false }
        );
    }

    #[test]
    fn test_bundled_scene_parses() {
        let config = load_scene_config_from_str(include_str!("../../scenes/cubes.ron")).unwrap();
        assert_eq!(config.objects.len(), 3);
        assert_eq!(config.objects[2].draw_mode, DrawMode::Surface);
        assert_eq!(config.objects[2].behavior, Behavior::Drift([0.0, 0.0, 0.25]));
        assert_eq!(config.camera.lens.far, 500.0);

        let setup = config.build(Path::new("scenes")).unwrap();
        assert_eq!(setup.scene.triangle_count(), 36);
        assert_eq!(setup.scene.textures.len(), 1);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            load_scene_config_from_str("(width: \"wide\")"),
            Err(SceneError::Parse(_))
        ));
    }

    #[test]
    fn test_default_scene_builds_and_renders() {
        let setup = default_scene().build(Path::new(".")).unwrap();
        assert_eq!(setup.scene.objects.len(), 1);
        assert_eq!(setup.scene.textures.len(), 1);
        assert_eq!(setup.scene.objects[0].mesh.triangles[0].texture, Some(0));

        let mut renderer = Renderer::new(setup.width, setup.height, setup.settings.clone());
        let stats = renderer.render_frame(&setup.scene.draw_items(), &setup.camera, &setup.scene.textures);
        assert!(stats.drawn > 0);
        // Off the front face's diagonal, where its two triangles meet
        let (cx, cy) = (setup.width / 2 + 10, setup.height / 2 - 10);
        assert_ne!(renderer.framebuffer.get_pixel(cx, cy), Some(0));
    }

    #[test]
    fn test_bad_assets_are_fatal() {
        let mut config = default_scene();
        config.objects[0].texture = Some(TextureSource::Checkerboard {
            size: 12,
            colors: (Color::WHITE, Color::BLACK),
        });
        assert!(matches!(config.build(Path::new(".")), Err(SceneError::Texture { .. })));

        let mut config = default_scene();
        config.objects[0].mesh = MeshSource::Obj { path: PathBuf::from("missing.obj"), textured: true };
        assert!(matches!(config.build(Path::new("/nonexistent")), Err(SceneError::Obj { .. })));

        let mut config = default_scene();
        config.width = 0;
        assert!(matches!(config.build(Path::new(".")), Err(SceneError::Invalid(_))));
    }

    #[test]
    fn test_oversized_resolution_rejected() {
        let mut config = default_scene();
        config.height = MAX_SIDE + 1;
        assert!(matches!(config.build(Path::new(".")), Err(SceneError::Invalid(_))));

        config.height = 200;
        config.width = 70_000;
        assert!(matches!(config.build(Path::new(".")), Err(SceneError::Invalid(_))));
    }

    #[test]
    fn test_bad_lens_rejected() {
        let bad = [
            Lens { near: 0.0, ..Lens::default() },
            Lens { near: -1.0, ..Lens::default() },
            Lens { near: 5.0, far: 5.0, ..Lens::default() },
            Lens { near: f64::NAN, ..Lens::default() },
            Lens { fov: 180.0, ..Lens::default() },
            Lens { fov: 0.0, ..Lens::default() },
        ];
        for lens in bad {
            let mut config = default_scene();
            config.camera.lens = lens;
            assert!(
                matches!(config.build(Path::new(".")), Err(SceneError::Invalid(_))),
                "{:?} accepted",
                lens
            );
        }

        let mut config = default_scene();
        config.camera.lens = Lens { fov: 60.0, near: 0.5, far: 50.0 };
        assert!(config.build(Path::new(".")).is_ok());
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join(format!("engine3d-scene-{}.ron", std::process::id()));
        let config = default_scene();
        save_scene_config(&config, &path).unwrap();
        let reloaded = load_scene_config(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(reloaded, config);
    }
}
