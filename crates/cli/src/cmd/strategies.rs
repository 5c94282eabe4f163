//! Strategies command implementation
//!
//! List registered merge strategies, marking those `dotlayer.toml` added or
//! replaced.

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use clap::Args;
use owo_colors::OwoColorize;

/// Strategies command
#[derive(Debug, Args)]
pub struct StrategiesCommand {}

impl Command for StrategiesCommand {
    type Output = Vec<String>;

    fn execute(&self, context: &RuntimeContext) -> Result<Vec<String>> {
        let names: Vec<String> = context
            .runner
            .registry()
            .list()
            .into_iter()
            .map(str::to_string)
            .collect();

        println!("{}", "Strategies:".bold());
        for name in &names {
            match context.config.strategies.get(name) {
                Some(script) => println!("  • {} {}", name.green(), format!("({script})").dimmed()),
                None => println!("  • {name}"),
            }
        }

        Ok(names)
    }
}
