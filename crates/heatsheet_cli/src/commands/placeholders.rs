//! Placeholders command - List placeholder keys and aliases.

use anyhow::Result;
use clap::Args;

use heatsheet_templates::ROW_INDEX_TOKEN;

use super::GlobalArgs;

#[derive(Args)]
pub struct PlaceholdersArgs {
    /// Print only the aliases of this key
    #[arg(short, long)]
    pub key: Option<String>,
}

pub async fn execute(args: PlaceholdersArgs, global: &GlobalArgs) -> Result<()> {
    let config = global.workspace()?;
    let registry = config.placeholder_registry()?;
    let marker = &config.placeholders.marker;

    let keys = match &args.key {
        Some(token) => match registry.resolve_token(token) {
            Some(key) => vec![key],
            None => anyhow::bail!("Unknown placeholder argument: {}", token),
        },
        None => registry.keys(),
    };

    if !global.quiet {
        println!("🏷️  Placeholders (written as {m}Name{m}, case-insensitive):", m = marker);
        println!();
    }
    for key in keys {
        let aliases: Vec<String> = registry
            .aliases(key)
            .iter()
            .map(|alias| format!("{m}{}{m}", alias, m = marker))
            .collect();
        println!("   {:<22} {}", key.as_str(), aliases.join(", "));
    }

    if args.key.is_none() && !global.quiet {
        println!();
        println!(
            "   {m}{}{m} is the row number in tables. Append 1, 2, ... for race card slots ({m}Name1{m}).",
            ROW_INDEX_TOKEN,
            m = marker
        );
    }

    Ok(())
}
