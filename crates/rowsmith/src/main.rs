//! Rowsmith CLI binary.
//!
//! This binary provides command-line access to Rowsmith's functionality:
//! - Run a batch of rows against an HTTP generation endpoint
//! - Inspect the effective configuration

use clap::Parser;
use rowsmith::{ObservabilityConfig, RowsmithConfig};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use cli::{Cli, Commands, run_batch, show_config};

    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RowsmithConfig::from_file(path)?,
        None => RowsmithConfig::load()?,
    };

    let mut observability = ObservabilityConfig::from_logging("rowsmith", &config.logging);
    if cli.verbose {
        observability = observability.with_log_level("debug");
    }
    rowsmith::init_observability_with_config(observability)?;

    match cli.command {
        Commands::Run(args) => run_batch(args, config).await?,
        Commands::Config => show_config(&config)?,
    }

    rowsmith::shutdown_observability();
    Ok(())
}
