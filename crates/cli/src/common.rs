//! Runtime context shared by CLI commands

use crate::error::Result;
use dotlayer_config::{Config, ToolConfig};
use dotlayer_core::path::AbsPath;
use dotlayer_engine::{HookRunner, RealSystem};

/// Runtime context for CLI commands
///
/// Holds the loaded `dotlayer.toml`, the resolved dotfiles directory, and a
/// hook runner with user strategies already registered.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Top-level configuration
    pub config: Config,
    /// Hook runner on the real filesystem
    pub runner: HookRunner<RealSystem>,
    /// Where backups go; `None` when disabled
    pub backup_dir: Option<AbsPath>,
}

impl RuntimeContext {
    /// Build the context for `dotfiles_dir`
    ///
    /// `machine` (from the command line) takes precedence over the `machine`
    /// key of `dotlayer.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is invalid, `dotlayer.toml` is
    /// malformed, or a `[strategies]` entry cannot be registered.
    pub fn new(dotfiles_dir: &str, machine: Option<&str>) -> Result<Self> {
        let mut runner = HookRunner::new(dotfiles_dir, RealSystem)?;
        let config = Config::load(runner.dotfiles_dir())?;

        if let Some(machine) = machine.or(config.machine.as_deref()) {
            runner.set_machine(machine);
        }

        for (name, script) in config.strategy_scripts(runner.dotfiles_dir())? {
            runner.register_script_strategy(&name, script)?;
        }

        let backup_dir = match config.backup_dir()? {
            Some(dir) => Some(AbsPath::new(dir)?),
            None => None,
        };

        tracing::debug!(
            dotfiles_dir = %runner.dotfiles_dir(),
            machine = runner.machine().unwrap_or_default(),
            strategies = runner.registry().count(),
            "Runtime context ready"
        );

        Ok(Self {
            config,
            runner,
            backup_dir,
        })
    }

    /// Dotfiles repository root
    pub fn dotfiles_dir(&self) -> &AbsPath {
        self.runner.dotfiles_dir()
    }

    /// Load and resolve `tools/<tool>/tool.toml`
    ///
    /// # Errors
    ///
    /// Returns an error if the tool has no configuration or it is malformed.
    pub fn load_tool(&self, tool: &str) -> Result<ToolConfig> {
        Ok(ToolConfig::load(self.dotfiles_dir(), tool)?)
    }
}
