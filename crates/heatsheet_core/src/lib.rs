//! # heatsheet_core
//!
//! Competition documents for heatsheet.
//!
//! This crate connects the competition data to the template engine: it
//! resolves persons, starts and races into placeholder values and binds each
//! document kind to its template, items and ordering.
//!
//! # Architecture
//!
//! - **Model**: Persons, starts, races and the competition header
//! - **Resolvers**: Map one item to placeholder values
//! - **Strategies**: Bind a document kind to template, items and resolver
//! - **Registry**: Maps document kinds to strategies
//! - **Generator**: Renders a strategy and optionally converts the result
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use heatsheet_core::{
//!     CompetitionData, DocumentGenerator, DocumentKind, StrategyRegistry, WorkspaceConfig,
//! };
//!
//! # fn main() -> heatsheet_core::CoreResult<()> {
//! let config = WorkspaceConfig::load_or_default(Path::new("."))?;
//! let data = Arc::new(CompetitionData::load(Path::new("competition.json"))?);
//!
//! let registry = StrategyRegistry::standard(data, &config)?;
//! let generator = DocumentGenerator::new(&config)?;
//!
//! let strategy = registry.get_required(DocumentKind::ResultList)?;
//! generator.generate(strategy.as_ref(), Path::new("results.docx"))?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod model;
pub mod registry;
pub mod resolver;
pub mod resolvers;
pub mod samples;
pub mod selection;
pub mod strategies;
pub mod strategy;

// Re-export main types for convenience
pub use config::{
    ConvertersConfig, FormattingConfig, PlaceholderConfig, WorkspaceConfig, CONFIG_FILE,
};
pub use error::{CoreError, CoreResult};
pub use generator::{DocumentGenerator, GenerateOutcome};
pub use model::{CompetitionData, CompetitionInfo, Gender, Person, PersonStart, Race, SwimmingStyle};
pub use registry::StrategyRegistry;
pub use resolver::ItemResolver;
pub use resolvers::{PersonResolver, PersonStartResolver, RaceResolver};
pub use selection::{
    PersonFilter, PersonSort, PersonStartFilter, PersonStartSort, RaceFilter, RaceSort,
};
pub use strategy::{
    DocumentKind, DocumentStrategy, FilterParameter, ItemSource, ItemStrategy, PageShape,
    Selection, StrategyBuilder, StrategyItem, StrategyMode,
};
