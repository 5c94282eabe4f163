//! CLI command implementations

pub mod apply;
pub mod env;
pub mod install;
pub mod merge;
pub mod strategies;

use crate::error::{CommandError, Result};
use dotlayer_engine::HookResult;
use owo_colors::OwoColorize;

/// Print one hook outcome and turn a failure into an error
pub(crate) fn report_hook(tool: &str, step: &'static str, result: &HookResult) -> Result<()> {
    if result.is_success() {
        println!("{} {step} {}", "✓".green(), tool.bold());
        for path in result.affected_files() {
            println!("  {} {}", "→".dimmed(), path.display());
        }
        return Ok(());
    }

    println!("{} {step} {}", "✗".red(), tool.bold());
    Err(CommandError::HookFailed {
        tool: tool.to_string(),
        step,
        code: result.error_code(),
        message: result.error_message().to_string(),
    })
}
