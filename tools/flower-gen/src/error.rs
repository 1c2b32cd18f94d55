//! Error types for flower generation

use crate::mesh::MeshError;
use crate::scene::SceneError;

/// Errors surfaced to callers of the top-level generators
#[derive(Debug, thiserror::Error)]
pub enum FlowerError {
    /// Malformed or incomplete input (flower record, parameters)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Geometry that could not be built
    #[error("geometry error: {0}")]
    Geometry(#[from] MeshError),

    /// Scene graph with dangling references
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Serialization to glTF failed; no partial document is produced
    #[error("export failed: {0}")]
    ExportFailed(String),
}

pub type Result<T> = std::result::Result<T, FlowerError>;
