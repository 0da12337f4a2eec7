/// Error types for mesh loading, configuration and analysis.
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the geometric analysis itself.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    /// Build direction is the zero vector or has non-finite components.
    #[error("Invalid build direction {0:?}: must be a finite, non-zero vector")]
    InvalidDirection([f64; 3]),

    /// The mesh has no faces, so there is nothing to measure.
    #[error("Mesh has no faces")]
    GeometryUnavailable,

    /// The surface reports a face but no normal for it.
    #[error("Face {face} has no normal")]
    MissingFaceNormal { face: usize },

    /// A face normal or area is NaN or infinite.
    #[error("Face {face} has non-finite geometry")]
    NonFiniteGeometry { face: usize },

    /// A build volume limit is zero, negative or non-finite.
    #[error("Invalid build volume {limits:?}: limits must be positive")]
    InvalidBuildVolume { limits: [f64; 3] },
}

/// Failures while reading a mesh from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {format}: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    /// Only triangles are analysed.
    #[error("Face {face} has {vertices} vertices, expected 3")]
    NonTriangularFace { face: usize, vertices: usize },
}

impl LoadError {
    pub(crate) fn parse(format: &'static str, message: impl Into<String>) -> Self {
        Self::Parse {
            format,
            message: message.into(),
        }
    }
}

/// Failures while reading or validating an analysis configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(#[from] AnalysisError),
}

/// Why a single file of a batch could not be analysed.
#[derive(Debug, Error)]
pub enum FileErrorKind {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// A per-file failure; the batch carries on with the next file.
#[derive(Debug, Error)]
#[error("{file_name}: {kind}")]
pub struct FileError {
    pub file_name: String,
    #[source]
    pub kind: FileErrorKind,
}

impl FileError {
    pub fn new(file_name: impl Into<String>, kind: impl Into<FileErrorKind>) -> Self {
        Self {
            file_name: file_name.into(),
            kind: kind.into(),
        }
    }
}
