//! Apply command implementation
//!
//! Back up, merge, and install each requested tool (all tools when none are
//! named). A failing tool does not stop the others.

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::{CommandError, Result};
use clap::Args;
use dotlayer_config::discover_tools;
use dotlayer_engine::{ApplyReport, apply_tool};
use owo_colors::OwoColorize;

/// Apply command
#[derive(Debug, Args)]
pub struct ApplyCommand {
    /// Tools to apply (default: every directory under `tools/`)
    #[arg(value_name = "TOOL")]
    pub tools: Vec<String>,

    /// Do not back up existing targets
    #[arg(long)]
    pub no_backup: bool,
}

impl Command for ApplyCommand {
    type Output = Vec<ApplyReport>;

    fn execute(&self, context: &RuntimeContext) -> Result<Vec<ApplyReport>> {
        let tools = if self.tools.is_empty() {
            discover_tools(context.dotfiles_dir())?
        } else {
            self.tools.clone()
        };

        let backup_root = if self.no_backup {
            None
        } else {
            context.backup_dir.as_ref()
        };

        let mut reports = Vec::with_capacity(tools.len());
        let mut failed = 0;
        for tool in &tools {
            let config = match context.load_tool(tool) {
                Ok(config) => config,
                Err(e) => {
                    println!("{} {} {}", "✗".red(), tool.bold(), e.dimmed());
                    failed += 1;
                    continue;
                }
            };

            let report = apply_tool(&context.runner, &config, backup_root);
            print_report(&report);
            if !report.is_success() {
                failed += 1;
            }
            reports.push(report);
        }

        println!();
        if failed > 0 {
            return Err(CommandError::ApplyFailed {
                failed,
                total: tools.len(),
            });
        }
        println!("{} {} tools applied", "✓".green(), tools.len());
        Ok(reports)
    }
}

fn print_report(report: &ApplyReport) {
    match report.failure() {
        None => {
            println!("{} {}", "✓".green(), report.tool.bold());
            if let Some(backup) = &report.backup {
                println!("  {} backup at {backup}", "→".dimmed());
            }
        }
        Some(failure) => {
            let step = if report.merge.is_success() {
                "install"
            } else {
                "merge"
            };
            println!(
                "{} {} {step} failed: {}",
                "✗".red(),
                report.tool.bold(),
                failure.error_message()
            );
            if report.restored {
                println!("  {} previous target restored", "→".dimmed());
            }
        }
    }
}
