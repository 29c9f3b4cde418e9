//! Error types for document conversion.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for conversion operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Errors that can occur while selecting or running a converter.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("No converter available")]
    NoConverterAvailable,

    #[error("Converter not available: {0}")]
    ConverterNotAvailable(String),

    #[error("Input document not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Failed to start {converter}: {message}")]
    SpawnFailed { converter: String, message: String },

    #[error("{converter} exited with code {exit_code}: {stderr}")]
    ConversionFailed {
        converter: String,
        exit_code: i64,
        stderr: String,
    },

    #[error("{converter} finished but produced no output at {expected:?}")]
    OutputMissing { converter: String, expected: PathBuf },

    #[error("{converter} timed out after {seconds} seconds")]
    Timeout { converter: String, seconds: u64 },

    #[error("Failed to move converted file into place: {0}")]
    MoveFailed(#[from] fs_extra::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
