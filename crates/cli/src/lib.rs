//! dotlayer CLI library
//!
//! This library contains all the CLI logic for dotlayer, making it reusable
//! for testing and integration with other tools.

pub mod cmd;
pub mod command;
pub mod common;
pub mod error;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use command::Command;
use common::RuntimeContext;
use error::CommandError;

/// dotlayer - layered dotfiles with pluggable merge strategies
#[derive(Debug, Parser)]
#[command(name = "dotlayer")]
#[command(about = "Compose layered dotfiles into their targets")]
#[command(version)]
#[command(long_about = "Compose layered dotfiles into their targets

Each tool under <DIR>/tools/<tool>/tool.toml lists ordered layers (base
first, overrides last), a target path, a merge hook and an optional install
hook. Merge hooks are builtin strategies (builtin:symlink, builtin:concat,
builtin:source, builtin:json-merge, builtin:skip) or scripts.")]
pub struct Cli {
    /// Path to the dotfiles directory
    #[arg(long, env = "DOTLAYER_DIR", value_name = "DIR")]
    pub dir: Option<String>,

    /// Machine profile exported to hooks as MACHINE
    #[arg(long, env = "DOTLAYER_MACHINE", value_name = "NAME")]
    pub machine: Option<String>,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "DOTLAYER_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the dotlayer CLI
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Back up, merge and install tools
    Apply(cmd::apply::ApplyCommand),

    /// Run a tool's merge hook only
    Merge(cmd::merge::MergeCommand),

    /// Run a tool's install hook only
    Install(cmd::install::InstallCommand),

    /// List registered merge strategies
    Strategies(cmd::strategies::StrategiesCommand),

    /// Show the environment hook scripts receive for a tool
    Env(cmd::env::EnvCommand),
}

/// Process exit status for an error returned by [`run`]
///
/// Command errors map onto the shared error taxonomy (or a hook's own exit
/// status); anything else exits with 1.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<CommandError>()
        .map_or(1, CommandError::exit_code)
}

fn execute_command(command: &Commands, context: &RuntimeContext) -> Result<()> {
    match command {
        Commands::Apply(apply_cmd) => {
            apply_cmd.execute(context)?;
        }
        Commands::Merge(merge_cmd) => merge_cmd.execute(context)?,
        Commands::Install(install_cmd) => install_cmd.execute(context)?,
        Commands::Strategies(strategies_cmd) => {
            strategies_cmd.execute(context)?;
        }
        Commands::Env(env_cmd) => env_cmd.execute(context)?,
    }
    Ok(())
}

/// Main entry point for the CLI logic
///
/// # Errors
///
/// Returns an error if:
/// - Logging initialization fails
/// - The dotfiles directory cannot be determined
/// - Configuration loading fails
/// - Command execution fails
pub fn run(cli: Cli) -> Result<()> {
    dotlayer_config::logging::init(cli.verbose, cli.log_file.as_deref())?;

    let dir = cli
        .dir
        .clone()
        .or_else(dotlayer_config::default_dotfiles_dir)
        .context("Could not determine dotfiles directory. Please specify with --dir or DOTLAYER_DIR.")?;

    let context = RuntimeContext::new(&dir, cli.machine.as_deref())?;
    execute_command(&cli.command, &context)
}
