//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the rowsmith binary.

mod commands;
mod config;
mod run;

pub use commands::{Cli, Commands, RunArgs};
pub use config::show_config;
pub use run::run_batch;
