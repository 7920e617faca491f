//! @ai:module:intent Define error types for signature parsing and compatibility checking
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result
//! @ai:module:stateless true

use crate::model::NullMode;
use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for all sigcheck operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}:{line}: malformed signature: {message}")]
    MalformedSignature {
        file: String,
        line: usize,
        message: String,
    },

    #[error("Cannot compare a {previous} model against a {current} model; parse both with the same null mode")]
    NullModeMismatch { previous: NullMode, current: NullMode },

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// @ai:intent Line number of a parse failure, if this error carries one
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::MalformedSignature { line, .. } => Some(*line),
            _ => None,
        }
    }
}
