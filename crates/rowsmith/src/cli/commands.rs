//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Rowsmith - resilient bulk AI generation over rows of data
#[derive(Parser, Debug)]
#[command(name = "rowsmith")]
#[command(about = "Resilient bulk AI generation over rows of data", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Load configuration from this file instead of the default locations
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate one output per row against an HTTP endpoint
    Run(RunArgs),

    /// Print the effective configuration as TOML
    Config,
}

/// Arguments for `rowsmith run`
#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// JSON file holding an array of row objects
    #[arg(long)]
    pub rows: PathBuf,

    /// Prompt template with {{column}} placeholders
    #[arg(long, conflicts_with = "template_file", required_unless_present = "template_file")]
    pub template: Option<String>,

    /// Read the prompt template from a file
    #[arg(long)]
    pub template_file: Option<PathBuf>,

    /// Generation endpoint accepting {"prompt": ...} and returning {"text": ...}
    #[arg(long, env = "ROWSMITH_ENDPOINT")]
    pub endpoint: String,

    /// Bearer token sent to the endpoint
    #[arg(long, env = "ROWSMITH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Write results here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Rows executed at once (overrides configuration)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Retries per row (overrides configuration)
    #[arg(long)]
    pub max_retries: Option<u32>,
}
