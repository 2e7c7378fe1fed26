//! Wavefront OBJ subset loader
//!
//! Reads `v` and `vt` records and triangle (or convex polygon) `f` records.
//! Everything else (normals, groups, materials) is ignored.

use std::fs;
use std::path::Path;

use super::Mesh;
use crate::rasterizer::{Triangle, Vec2, Vec3};

/// Error type for OBJ loading
#[derive(Debug)]
pub enum ObjError {
    Io(std::io::Error),
    Parse { line: usize, message: String },
    MissingIndex { line: usize, index: usize },
}

impl From<std::io::Error> for ObjError {
    fn from(e: std::io::Error) -> Self {
        ObjError::Io(e)
    }
}

impl std::fmt::Display for ObjError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjError::Io(e) => write!(f, "IO error: {}", e),
            ObjError::Parse { line, message } => write!(f, "Line {}: {}", line, message),
            ObjError::MissingIndex { line, index } => {
                write!(f, "Line {}: index {} does not refer to a loaded element", line, index)
            }
        }
    }
}

impl std::error::Error for ObjError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ObjError::Io(e) => Some(e),
            _ => None,
        }
    }
}

fn parse_f64(token: Option<&str>, line: usize, what: &str) -> Result<f64, ObjError> {
    let token = token.ok_or_else(|| ObjError::Parse {
        line,
        message: format!("missing {}", what),
    })?;
    token.parse().map_err(|_| ObjError::Parse {
        line,
        message: format!("bad {} '{}'", what, token),
    })
}

/// 1-based OBJ index to a 0-based slot, checked against `len`
fn resolve(token: &str, len: usize, line: usize) -> Result<usize, ObjError> {
    let index: usize = token.parse().map_err(|_| ObjError::Parse {
        line,
        message: format!("bad index '{}'", token),
    })?;
    if index == 0 || index > len {
        return Err(ObjError::MissingIndex { line, index });
    }
    Ok(index - 1)
}

/// Parse OBJ text into a mesh.
///
/// With `textured` set, faces must be written `v/vt` and texture coordinates
/// are attached; otherwise only the vertex index before any `/` is used.
/// Texture coordinates are clamped to 0..1.
pub fn parse_obj(src: &str, textured: bool, name: &str) -> Result<Mesh, ObjError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut texcoords: Vec<Vec2> = Vec::new();
    let mut triangles = Vec::new();

    for (i, raw) in src.lines().enumerate() {
        let line = i + 1;
        let mut tokens = raw.split_whitespace();

        match tokens.next() {
            Some("v") => {
                let x = parse_f64(tokens.next(), line, "x")?;
                let y = parse_f64(tokens.next(), line, "y")?;
                let z = parse_f64(tokens.next(), line, "z")?;
                positions.push(Vec3::new(x, y, z));
            }
            Some("vt") => {
                let u = parse_f64(tokens.next(), line, "u")?.clamp(0.0, 1.0);
                let v = parse_f64(tokens.next(), line, "v")?.clamp(0.0, 1.0);
                texcoords.push(Vec2::new(u, v));
            }
            Some("f") => {
                let mut corners = Vec::with_capacity(4);
                for token in tokens {
                    let mut parts = token.split('/');
                    let vi = resolve(parts.next().unwrap_or(""), positions.len(), line)?;
                    let tex = if textured {
                        let ti = match parts.next() {
                            Some(t) if !t.is_empty() => resolve(t, texcoords.len(), line)?,
                            _ => {
                                return Err(ObjError::Parse {
                                    line,
                                    message: format!("face corner '{}' has no texture index", token),
                                })
                            }
                        };
                        texcoords[ti]
                    } else {
                        Vec2::default()
                    };
                    corners.push((positions[vi], tex));
                }

                if corners.len() < 3 {
                    return Err(ObjError::Parse {
                        line,
                        message: format!("face needs 3 corners, got {}", corners.len()),
                    });
                }

                // Fan out polygons from the first corner
                for k in 1..corners.len() - 1 {
                    let (a, b, c) = (corners[0], corners[k], corners[k + 1]);
                    triangles.push(Triangle::new([a.0, b.0, c.0], [a.1, b.1, c.1]));
                }
            }
            _ => {}
        }
    }

    Ok(Mesh::new(name, triangles))
}

/// Load an OBJ file from disk
pub fn load_obj<P: AsRef<Path>>(path: P, textured: bool) -> Result<Mesh, ObjError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mesh = parse_obj(&contents, textured, &name)?;
    tracing::info!(path = %path.display(), triangles = mesh.len(), "loaded mesh");
    Ok(mesh)
}
