//! Error types for IIIF document upgrades

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpgradeError {
    #[error("Failed to load document from {path}: {reason}")]
    LoadError { path: String, reason: String },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Failed to dereference {uri}: {reason}")]
    Dereference { uri: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),
}
