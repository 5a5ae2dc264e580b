//! Error types for artifact loading and prediction

use std::path::PathBuf;
use thiserror::Error;

/// Failure to load a single artifact file.
///
/// Never fatal: the loader logs it and leaves the slot empty.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid artifact {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Failure of a single prediction request
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredictError {
    /// Model or scaler was not loaded
    #[error("model is not loaded; check the artifact directory on the server")]
    ModelUnavailable,
    /// The request could not be turned into a valid feature vector
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl PredictError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        PredictError::InvalidInput(msg.into())
    }
}

pub type PredictResult<T> = std::result::Result<T, PredictError>;
