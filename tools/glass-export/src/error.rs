//! Error type shared by every conversion stage

use std::path::PathBuf;

/// Result alias for conversion stages
pub type Result<T> = std::result::Result<T, ConversionError>;

/// Errors raised while converting one input into a USDZ package
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// Missing or empty vertex/face data, or faces that do not fit the vertex set
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// File read/write failure
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input file exists but could not be decoded as a mesh
    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// Extension not handled by any loader
    #[error("unsupported mesh format: {} (use .stl, .obj, .gltf, or .glb)", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Scene description writer failure
    #[error("scene serialization failed: {0}")]
    Serialization(String),

    /// Zip container failure
    #[error("USDZ packaging failed: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl ConversionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}
