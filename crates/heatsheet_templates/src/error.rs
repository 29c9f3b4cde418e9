//! Error types for templates.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while building placeholder tables or rendering templates.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(PathBuf),

    #[error("Alias '{alias}' is claimed by both {first} and {second}")]
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },

    #[error("Alias '{alias}' of {key} collides with the built-in row index token")]
    ReservedAlias { alias: String, key: String },

    #[error("Invalid alias for {key}: '{alias}'")]
    InvalidAlias { alias: String, key: String },

    #[error("Malformed placeholder marker '{0}': must be non-empty and contain no letters, digits or whitespace")]
    InvalidMarker(String),

    #[error("Document part missing from {package}: {part}")]
    MissingPart { package: String, part: String },

    #[error("Document part {part} is not valid UTF-8")]
    InvalidPartEncoding { part: String },

    #[error("Malformed document body in {part}: {message}")]
    MalformedDocument { part: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}
