//! Merge command implementation
//!
//! Run a tool's merge hook without backup or install.

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use clap::Args;

/// Merge command
#[derive(Debug, Args)]
pub struct MergeCommand {
    /// Tool to merge
    #[arg(required = true)]
    pub tool: String,
}

impl Command for MergeCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let config = context.load_tool(&self.tool)?;
        let result = context.runner.run_merge(&config);
        super::report_hook(&self.tool, "merge", &result)
    }
}
