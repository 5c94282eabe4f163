//! Env command implementation
//!
//! Print the environment a tool's hook scripts would receive, one
//! `KEY=value` per line.

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use clap::Args;

/// Env command
#[derive(Debug, Args)]
pub struct EnvCommand {
    /// Tool to describe
    #[arg(required = true)]
    pub tool: String,
}

impl Command for EnvCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let config = context.load_tool(&self.tool)?;
        print!("{}", context.runner.build_environment(&config));
        Ok(())
    }
}
