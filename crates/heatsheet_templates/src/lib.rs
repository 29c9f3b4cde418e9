//! # heatsheet_templates
//!
//! Placeholder handling and `.docx` substitution for heatsheet.
//!
//! This crate knows nothing about swimmers or races. It provides:
//!
//! - The placeholder registry mapping template aliases to canonical keys
//! - Text and table placeholder maps
//! - In-memory `.docx` package access
//! - The substitution engine (text, pages and table modes)
//! - Template discovery and validation
//!
//! ## Example
//!
//! ```rust,no_run
//! use heatsheet_templates::{
//!     PlaceholderKey, PlaceholderRegistry, SubstitutionEngine, SubstitutionOptions,
//!     TextPlaceholderMap,
//! };
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(PlaceholderRegistry::with_defaults().unwrap());
//! let engine = SubstitutionEngine::new(registry, SubstitutionOptions::default()).unwrap();
//!
//! let values = TextPlaceholderMap::new().with(PlaceholderKey::Name, "Anna Berg");
//! engine
//!     .render_text(Path::new("certificate.docx"), Path::new("out.docx"), &values)
//!     .unwrap();
//! ```

pub mod document;
pub mod engine;
pub mod error;
pub mod loader;
pub mod maps;
pub mod placeholders;
pub mod wordml;

pub use document::{DocxPackage, APP_PROPERTIES_PART, DOCUMENT_PART};
pub use engine::{
    SubstitutionEngine, SubstitutionOptions, TableFill, TemplateToken, UnknownPlaceholderPolicy,
    DEFAULT_MARKER,
};
pub use error::{TemplateError, TemplateResult};
pub use loader::{TemplateLoader, TemplateValidation};
pub use maps::{TablePlaceholderMap, TextPlaceholderMap, EMPTY_VALUE};
pub use placeholders::{
    PlaceholderKey, PlaceholderRegistry, RegistryBuilder, SlotKey, SupportedKeys,
    ROW_INDEX_TOKEN,
};
