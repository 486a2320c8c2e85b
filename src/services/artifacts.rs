use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A required model or encoder artifact could not be loaded.
///
/// Raised only at startup; the service must not accept requests after one.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Artifact not found: {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error("Failed to read artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed artifact {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid artifact {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

impl ConfigurationError {
    pub fn invalid(path: &Path, reason: impl Into<String>) -> Self {
        ConfigurationError::Invalid {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// Read and deserialize a JSON artifact exported by the training pipeline
pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigurationError> {
    if !path.is_file() {
        return Err(ConfigurationError::MissingArtifact(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|source| ConfigurationError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_slice(&bytes).map_err(|source| ConfigurationError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}
