//! Render command - Fill a template with competition data.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use heatsheet_convert::OutputFormat;
use heatsheet_core::{
    CompetitionData, DocumentGenerator, DocumentKind, Selection, StrategyRegistry,
};

use super::{converted_path, parse_format, parse_kind, GlobalArgs};

#[derive(Args)]
pub struct RenderArgs {
    /// Document kind to render
    #[arg(short, long, value_parser = parse_kind)]
    pub kind: DocumentKind,

    /// Competition data file (JSON)
    #[arg(short, long)]
    pub data: PathBuf,

    /// Output document (.docx)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Sort mode overriding the document default
    #[arg(long)]
    pub sort: Option<String>,

    /// Filter mode
    #[arg(long, requires = "filter_param")]
    pub filter: Option<String>,

    /// Parameter for the filter mode
    #[arg(long, requires = "filter")]
    pub filter_param: Option<String>,

    /// Also convert the rendered document to this format
    #[arg(long, value_parser = parse_format)]
    pub convert: Option<OutputFormat>,

    /// Converter to skip (repeatable)
    #[arg(long)]
    pub ignore_converter: Vec<String>,
}

pub async fn execute(args: RenderArgs, global: &GlobalArgs) -> Result<()> {
    let config = global.workspace()?;
    info!("Rendering {} from {:?}", args.kind, args.data);

    let data = CompetitionData::load(&args.data)
        .with_context(|| format!("Failed to load data file {:?}", args.data))?;
    let registry = StrategyRegistry::standard(Arc::new(data), &config)?;
    let mut strategy = registry.get_required(args.kind)?;

    let mut selection = Selection::new();
    if let Some(sort) = &args.sort {
        selection = selection.sort(sort.as_str());
    }
    if let (Some(filter), Some(parameter)) = (&args.filter, &args.filter_param) {
        selection = selection.filter(filter.as_str(), parameter.as_str());
    }
    if !selection.is_empty() {
        strategy = strategy
            .with_selection(&selection)
            .context("Invalid argument for --sort or --filter")?;
    }

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let generator = DocumentGenerator::new(&config)?;
    let outcome = generator
        .generate(strategy.as_ref(), &args.output)
        .with_context(|| format!("Template error while rendering {}", args.kind))?;

    if !outcome.written {
        if !global.quiet {
            println!("⚠️  No items to render for {}, nothing written", args.kind);
        }
        return Ok(());
    }

    if !global.quiet {
        println!(
            "✅ Rendered {} ({} item(s)) to {}",
            args.kind,
            outcome.items,
            args.output.display()
        );
        if !outcome.modified {
            println!("⚠️  The template contained no placeholders for this document");
        }
    }

    if let Some(format) = args.convert {
        let target = converted_path(&args.output, format);
        let converted = generator
            .convert(&args.output, &target, format, &args.ignore_converter)
            .await
            .context("Conversion failed")?;
        if !global.quiet {
            println!(
                "📄 Converted with {} to {} ({} ms)",
                converted.converter,
                converted.output.display(),
                converted.duration_ms
            );
        }
    }

    Ok(())
}
