//! Error types for the parsing and configuration boundary
//!
//! Inference itself never fails: unknown constructs degrade to `Dynamic`.
//! Only reading source, parsing it, and loading configuration can error.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DucktypeError {
    #[error("Python parse error in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, DucktypeError>;
