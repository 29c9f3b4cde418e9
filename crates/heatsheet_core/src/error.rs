//! Error types for the core module.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur during core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Strategy for {0} has no resolver")]
    MissingResolver(String),

    #[error("Strategy for {0} has no item source")]
    MissingItemSource(String),

    #[error("No strategy registered for {0}")]
    StrategyNotRegistered(String),

    #[error("Unknown sort mode '{mode}' for {kind} (expected one of: {expected})")]
    InvalidSortMode {
        kind: String,
        mode: String,
        expected: String,
    },

    #[error("Unknown filter mode '{mode}' for {kind} (expected one of: {expected})")]
    InvalidFilterMode {
        kind: String,
        mode: String,
        expected: String,
    },

    #[error("Invalid parameter '{value}' for filter {filter}")]
    InvalidFilterParameter { filter: String, value: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(#[from] heatsheet_templates::TemplateError),

    #[error("Conversion error: {0}")]
    Convert(#[from] heatsheet_convert::ConvertError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
