//! Converters command - Show conversion backends.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use heatsheet_core::DocumentGenerator;

use super::GlobalArgs;

#[derive(Args)]
pub struct ConvertersArgs {
    /// Also check which backend authored this document
    #[arg(short, long)]
    pub document: Option<PathBuf>,
}

pub async fn execute(args: ConvertersArgs, global: &GlobalArgs) -> Result<()> {
    let config = global.workspace()?;
    let generator = DocumentGenerator::new(&config)?;
    let statuses = generator.selector().statuses(args.document.as_deref());

    println!("🔌 Conversion backends (in order of preference):");
    for status in &statuses {
        let availability = if status.available { "✅ available" } else { "❌ not available" };
        match status.created_document {
            Some(true) => println!("   {:<12} {}  (authored the document)", status.name, availability),
            _ => println!("   {:<12} {}", status.name, availability),
        }
    }

    if let Some(executable) = config.libreoffice().locate() {
        println!();
        println!("LibreOffice executable: {}", executable.display());
    }

    if !global.quiet && !statuses.iter().any(|s| s.available) {
        println!();
        println!("⚠️  No backend available. Install LibreOffice or set HEATSHEET_SOFFICE.");
    }

    Ok(())
}
