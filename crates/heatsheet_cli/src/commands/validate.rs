//! Validate command - Check templates against their document kinds.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::info;

use heatsheet_core::{CompetitionData, DocumentGenerator, DocumentKind, StrategyRegistry};
use heatsheet_templates::TemplateError;

use super::{parse_kind, GlobalArgs, ValidationFailed};

#[derive(Args)]
pub struct ValidateArgs {
    /// Validate only this document kind
    #[arg(short, long, value_parser = parse_kind)]
    pub kind: Option<DocumentKind>,

    /// Treat missing templates as failures
    #[arg(long)]
    pub strict: bool,
}

pub async fn execute(args: ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let config = global.workspace()?;
    info!("Validating templates in {:?}", config.templates_path());

    let registry = StrategyRegistry::standard(Arc::new(CompetitionData::default()), &config)?;
    let generator = DocumentGenerator::new(&config)?;
    let kinds = match args.kind {
        Some(kind) => vec![kind],
        None => registry.kinds(),
    };

    println!("📋 Validating {} template(s)...", kinds.len());
    let mut failed = 0;

    for kind in kinds {
        let strategy = registry.get_required(kind)?;
        let path = strategy.template_path();

        let report = match generator.validate(strategy.as_ref()) {
            Ok(report) => report,
            Err(heatsheet_core::CoreError::Template(TemplateError::NotFound(_))) => {
                if args.strict || args.kind.is_some() {
                    failed += 1;
                    println!("   ❌ {}: template not found ({})", kind, path.display());
                } else {
                    println!("   ⏭️  {}: no template ({})", kind, path.display());
                }
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if report.is_valid() {
            println!("   ✅ {} ({} placeholder(s))", kind, report.tokens);
        } else {
            failed += 1;
            println!("   ❌ {}", kind);
        }
        for issue in report.issues() {
            println!("      - {}", issue);
        }
    }

    if args.kind.is_none() {
        let used: Vec<PathBuf> = registry
            .kinds()
            .into_iter()
            .filter_map(|kind| registry.get(kind))
            .map(|strategy| strategy.template_path().to_path_buf())
            .collect();
        for template in generator.loader().list()? {
            if !used.contains(&template) {
                println!("   ℹ️  {} is not used by any document", template.display());
            }
        }
    }

    println!();
    if failed > 0 {
        println!("❌ Some templates failed validation. Please fix the issues above.");
        return Err(ValidationFailed(failed).into());
    }
    if !global.quiet {
        println!("✅ All validations passed!");
    }

    Ok(())
}
