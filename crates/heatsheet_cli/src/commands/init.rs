//! Init command - Initialize a workspace.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use heatsheet_core::samples::write_samples;
use heatsheet_core::{CompetitionData, WorkspaceConfig, CONFIG_FILE};

use super::GlobalArgs;

/// Sample data file written next to the configuration.
const SAMPLE_DATA_FILE: &str = "competition.json";

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Overwrite an existing configuration and templates
    #[arg(short, long)]
    force: bool,
}

pub async fn execute(args: InitArgs, global: &GlobalArgs) -> Result<()> {
    let dir = match args.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    info!("Initializing heatsheet workspace at {:?}", dir);

    std::fs::create_dir_all(&dir)?;
    let config_path = dir.join(CONFIG_FILE);
    if config_path.exists() && !args.force {
        anyhow::bail!(
            "Workspace already initialized at {:?}. Use --force to reinitialize.",
            dir
        );
    }

    let config = WorkspaceConfig {
        root: dir.clone(),
        ..WorkspaceConfig::default()
    };
    config
        .save(&config_path)
        .context("Failed to write configuration")?;

    let templates = write_samples(
        &config.templates_path(),
        &config.placeholders.marker,
        &config.formatting,
        args.force,
    )
    .context("Failed to write sample templates")?;

    let data_path = dir.join(SAMPLE_DATA_FILE);
    if !data_path.exists() || args.force {
        CompetitionData::sample()
            .save(&data_path)
            .context("Failed to write sample data")?;
    }

    if global.quiet {
        return Ok(());
    }

    println!("✅ heatsheet workspace initialized successfully!");
    println!();
    println!("Created:");
    println!("  📄 {:<20} - Workspace configuration", CONFIG_FILE);
    println!("  📄 {:<20} - Sample competition data", SAMPLE_DATA_FILE);
    println!(
        "  📁 {:<20} - {} sample template(s)",
        format!("{}/", config.templates_dir.display()),
        templates.len()
    );
    println!();
    println!("Next steps:");
    println!(
        "  heatsheet render --kind result-list --data {} --output results.docx",
        SAMPLE_DATA_FILE
    );

    Ok(())
}
