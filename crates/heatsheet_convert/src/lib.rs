//! # heatsheet_convert
//!
//! Document conversion backends for heatsheet.
//!
//! This crate turns rendered `.docx` files into other formats by driving an
//! installed office suite as an external process.
//!
//! # Features
//!
//! - **Multiple Backends**: LibreOffice (headless CLI) and Microsoft Word (COM, Windows)
//! - **Provenance Detection**: Prefer the application that authored the document
//! - **Selection with Fallback**: First available backend, with an ignore list for retries
//! - **Mock Converter**: For testing without an office suite
//!
//! # Example
//!
//! ```rust,no_run
//! use heatsheet_convert::{ConversionConfig, ConverterSelector, LibreOfficeConverter, OutputFormat};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let selector = ConverterSelector::standard(LibreOfficeConverter::new());
//!
//!     let outcome = selector
//!         .convert(
//!             Path::new("results.docx"),
//!             Path::new("results.pdf"),
//!             OutputFormat::Pdf,
//!             &ConversionConfig::default(),
//!             &[],
//!         )
//!         .await?;
//!     println!("Converted with {}", outcome.converter);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod libreoffice;
pub mod mock;
pub mod process;
pub mod provenance;
pub mod selector;
pub mod word;

pub use config::{ConversionConfig, DEFAULT_TIMEOUT_SECONDS};
pub use converter::{ConversionOutcome, DocumentConverter, OutputFormat};
pub use error::{ConvertError, ConvertResult};
pub use libreoffice::{LibreOfficeConverter, SOFFICE_ENV};
pub use mock::{CapturedCall, MockConverter, MockResponse};
pub use selector::{ConverterSelector, ConverterStatus};
pub use word::WordConverter;
