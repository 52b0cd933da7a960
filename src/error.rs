//! Error types for DCAT to CKAN uploads

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Failed to load document from {path}: {reason}")]
    LoadError { path: String, reason: String },

    #[error("Invalid graph document: {0}")]
    InvalidGraph(String),

    #[error("Node '{subject}' has no value for required property <{property}>")]
    MissingProperty { subject: String, property: String },

    #[error("Node '{subject}' has an unusable value '{value}' for <{property}>: {reason}")]
    InvalidValue {
        subject: String,
        property: String,
        value: String,
        reason: String,
    },

    #[error("Package '{0}' does not exist")]
    NotFound(String),

    #[error("Package '{0}' is no collection")]
    NotACollection(String),

    #[error("CKAN action '{action}' failed: {message}")]
    Api { action: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),
}

impl UploadError {
    /// True for the lookup failures raised while linking a package to a collection
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, UploadError::NotFound(_) | UploadError::NotACollection(_))
    }
}
