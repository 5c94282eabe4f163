//! Install command implementation
//!
//! Run a tool's install hook on its own. Tools without one succeed.

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use clap::Args;

/// Install command
#[derive(Debug, Args)]
pub struct InstallCommand {
    /// Tool to install
    #[arg(required = true)]
    pub tool: String,
}

impl Command for InstallCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let config = context.load_tool(&self.tool)?;
        let result = context.runner.run_install(&config);
        super::report_hook(&self.tool, "install", &result)
    }
}
