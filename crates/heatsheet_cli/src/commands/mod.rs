//! CLI command definitions.
//!
//! This module defines the command structure for the heatsheet CLI.
//! Each subcommand maps to one step of producing competition documents.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use thiserror::Error;

use heatsheet_convert::OutputFormat;
use heatsheet_core::{DocumentKind, WorkspaceConfig};

pub mod convert;
pub mod converters;
pub mod init;
pub mod placeholders;
pub mod render;
pub mod validate;

/// heatsheet - competition documents from Word templates
#[derive(Parser)]
#[command(name = "heatsheet")]
#[command(version, about = "heatsheet - competition documents from Word templates")]
#[command(long_about = r#"
heatsheet fills Word templates with swimming competition data: certificates,
result lists, participant lists, time forms, start lists and race cards.
Rendered documents can be converted to PDF with LibreOffice or Word.

COMMANDS:
  init          → Write heatsheet.yaml, sample templates and sample data
  render        → Render one document kind from a data file
  convert       → Convert a rendered document (e.g. to PDF)
  validate      → Check templates against their document kinds
  converters    → Show which conversion backends are available
  placeholders  → List placeholder keys and their aliases

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Validation failure
  4 - Template error
  5 - Conversion error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Workspace configuration file (defaults to ./heatsheet.yaml)
    #[arg(short, long, global = true, env = "HEATSHEET_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a workspace with configuration and sample templates
    Init(init::InitArgs),

    /// Render a document from competition data
    Render(render::RenderArgs),

    /// Convert a document with the first available backend
    Convert(convert::ConvertArgs),

    /// Validate templates against their document kinds
    Validate(validate::ValidateArgs),

    /// Show conversion backends and their availability
    Converters(converters::ConvertersArgs),

    /// List placeholder keys and aliases
    Placeholders(placeholders::PlaceholdersArgs),
}

/// Options shared by every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub quiet: bool,
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    /// Load the workspace configuration named on the command line, or the
    /// one in the current directory.
    pub fn workspace(&self) -> Result<WorkspaceConfig> {
        match &self.config {
            Some(path) => WorkspaceConfig::load(path)
                .with_context(|| format!("Failed to load configuration {:?}", path)),
            None => {
                let root = std::env::current_dir()?;
                WorkspaceConfig::load_or_default(&root).context("Failed to load configuration")
            }
        }
    }
}

/// Returned when templates do not pass validation.
#[derive(Debug, Error)]
#[error("Validation failed for {0} template(s)")]
pub struct ValidationFailed(pub usize);

/// Parse a document kind given on the command line.
pub fn parse_kind(s: &str) -> std::result::Result<DocumentKind, String> {
    DocumentKind::from_str(s).ok_or_else(|| {
        let expected: Vec<&str> = DocumentKind::all().iter().map(|k| k.as_str()).collect();
        format!("unknown document kind '{}' (expected one of: {})", s, expected.join(", "))
    })
}

/// Parse an output format given on the command line.
pub fn parse_format(s: &str) -> std::result::Result<OutputFormat, String> {
    OutputFormat::from_str(s).ok_or_else(|| {
        let expected: Vec<&str> = OutputFormat::all().iter().map(|f| f.as_str()).collect();
        format!("unknown output format '{}' (expected one of: {})", s, expected.join(", "))
    })
}

/// Output path for a converted document: same stem, new extension.
pub fn converted_path(input: &Path, format: OutputFormat) -> PathBuf {
    input.with_extension(format.extension())
}
