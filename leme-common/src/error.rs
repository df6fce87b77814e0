//! Common error types for LEME

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Common result type for LEME operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across LEME services
#[derive(Error, Debug)]
pub enum Error {
    /// A config or artifact file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON artifact could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration could not be parsed
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A model, encoder or catalog artifact is structurally invalid
    #[error("Invalid artifact {artifact}: {reason}")]
    InvalidArtifact { artifact: String, reason: String },
}

impl Error {
    /// Read failure for `path`
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Shorthand for [`Error::InvalidArtifact`]
    pub fn invalid_artifact(artifact: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArtifact {
            artifact: artifact.into(),
            reason: reason.into(),
        }
    }
}
