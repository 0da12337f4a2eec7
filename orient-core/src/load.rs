/// Pick a reader by file extension and load a mesh from disk.
use std::path::Path;

use tracing::debug;

use crate::error::LoadError;
use crate::geometry::Mesh;
use crate::{obj, ply, stl};

/// Mesh file formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Stl,
    Obj,
    Ply,
    Step,
    Iges,
}

impl MeshFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "stl" => Some(Self::Stl),
            "obj" => Some(Self::Obj),
            "ply" => Some(Self::Ply),
            "step" | "stp" => Some(Self::Step),
            "iges" | "igs" => Some(Self::Iges),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Whether a reader for this format is bundled.
    pub fn is_readable(&self) -> bool {
        matches!(self, Self::Stl | Self::Obj | Self::Ply)
    }

    /// Parse in-memory file content.
    pub fn parse(&self, data: &[u8]) -> Result<Mesh, LoadError> {
        match self {
            Self::Stl => stl::parse_stl(data),
            Self::Obj => {
                let text = std::str::from_utf8(data)
                    .map_err(|e| LoadError::parse("OBJ", format!("not valid UTF-8: {e}")))?;
                obj::parse_obj(text)
            }
            Self::Ply => ply::parse_ply(data),
            Self::Step | Self::Iges => Err(LoadError::UnsupportedFormat {
                extension: self.name().to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Stl => "stl",
            Self::Obj => "obj",
            Self::Ply => "ply",
            Self::Step => "step",
            Self::Iges => "iges",
        }
    }
}

fn unsupported(path: &Path) -> LoadError {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    LoadError::UnsupportedFormat { extension }
}

/// Load a mesh, choosing the reader from the file extension.
///
/// The format is checked before the file is opened, so an unsupported
/// extension is reported even when the file does not exist.
pub fn load_mesh(path: impl AsRef<Path>) -> Result<Mesh, LoadError> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path)
        .filter(MeshFormat::is_readable)
        .ok_or_else(|| unsupported(path))?;

    let data = std::fs::read(path)?;
    debug!(path = %path.display(), bytes = data.len(), format = format.name(), "read mesh file");

    let mesh = format.parse(&data)?;
    debug!(path = %path.display(), triangles = mesh.triangles.len(), "parsed mesh");
    Ok(mesh)
}
