//! Convert command - Convert a document with an office suite.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use heatsheet_convert::{ConvertError, OutputFormat};
use heatsheet_core::DocumentGenerator;

use super::{converted_path, parse_format, GlobalArgs};

#[derive(Args)]
pub struct ConvertArgs {
    /// Document to convert
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (defaults to the input with the format's extension)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Target format (defaults to the output extension, then the configuration)
    #[arg(short, long, value_parser = parse_format)]
    pub format: Option<OutputFormat>,

    /// Converter to skip (repeatable)
    #[arg(long)]
    pub ignore_converter: Vec<String>,
}

pub async fn execute(args: ConvertArgs, global: &GlobalArgs) -> Result<()> {
    let config = global.workspace()?;

    if !args.input.is_file() {
        return Err(ConvertError::InputNotFound(args.input.clone()).into());
    }

    let format = args
        .format
        .or_else(|| args.output.as_deref().and_then(OutputFormat::from_path))
        .unwrap_or(config.converters.format);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| converted_path(&args.input, format));
    info!("Converting {:?} to {:?} ({})", args.input, output, format);

    let generator = DocumentGenerator::new(&config)?;
    let outcome = generator
        .convert(&args.input, &output, format, &args.ignore_converter)
        .await
        .context("Conversion failed")?;

    if !global.quiet {
        println!(
            "✅ Converted with {} to {} ({} ms)",
            outcome.converter,
            outcome.output.display(),
            outcome.duration_ms
        );
    }

    Ok(())
}
