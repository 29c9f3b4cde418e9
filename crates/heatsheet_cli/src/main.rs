//! heatsheet CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Validation failure
//! - 4: Template error
//! - 5: Conversion error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use heatsheet_convert::ConvertError;
use heatsheet_core::CoreError;
use heatsheet_templates::TemplateError;

mod commands;

use commands::{Cli, Commands, GlobalArgs, ValidationFailed};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const TEMPLATE_ERROR: u8 = 4;
    pub const CONVERSION_ERROR: u8 = 5;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        "heatsheet=debug"
    } else if cli.quiet {
        "heatsheet=warn"
    } else {
        "heatsheet=info"
    };
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(
            EnvFilter::from_default_env()
                .add_directive(level.parse().unwrap())
                .add_directive("warn".parse().unwrap()),
        )
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let global = GlobalArgs {
        quiet: cli.quiet,
        config: cli.config,
    };

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, &global).await,
        Commands::Render(args) => commands::render::execute(args, &global).await,
        Commands::Convert(args) => commands::convert::execute(args, &global).await,
        Commands::Validate(args) => commands::validate::execute(args, &global).await,
        Commands::Converters(args) => commands::converters::execute(args, &global).await,
        Commands::Placeholders(args) => commands::placeholders::execute(args, &global).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            // Determine appropriate exit code based on error
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if cause.is::<ValidationFailed>() {
            return ExitCodes::VALIDATION_FAILURE;
        }
        if cause.is::<ConvertError>() {
            return ExitCodes::CONVERSION_ERROR;
        }
        if cause.is::<TemplateError>() {
            return ExitCodes::TEMPLATE_ERROR;
        }
        if let Some(core) = cause.downcast_ref::<CoreError>() {
            match core {
                CoreError::Template(_) => return ExitCodes::TEMPLATE_ERROR,
                CoreError::Convert(_) => return ExitCodes::CONVERSION_ERROR,
                CoreError::InvalidSortMode { .. }
                | CoreError::InvalidFilterMode { .. }
                | CoreError::InvalidFilterParameter { .. }
                | CoreError::StrategyNotRegistered(_) => return ExitCodes::INVALID_ARGS,
                _ => {}
            }
        }
    }

    let msg = e.to_string().to_lowercase();
    if msg.contains("argument") || msg.contains("option") || msg.contains("not found") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
