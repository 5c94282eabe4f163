//! Hook runner
//!
//! The runner owns everything a hook needs: the dotfiles directory, the
//! machine profile, the detected OS, the strategy registry, and the
//! filesystem backend. It resolves a hook specifier to a builtin strategy or
//! a script, runs it, and reports a [`HookResult`].
//!
//! # Example
//!
//! ```ignore
//! let mut runner = HookRunner::new("~/.dotfiles", RealSystem)?;
//! runner.set_machine("laptop");
//! let result = runner.run_merge(&config);
//! if !result.is_success() {
//!     eprintln!("{}", result.error_message());
//! }
//! ```

use crate::environment::ExecutionEnvironment;
use crate::error::{Error, Result};
use crate::registry::StrategyRegistry;
use crate::result::{Effect, HookResult};
use crate::script::run_hook_script;
use crate::strategy::{ScriptStrategy, StrategyContext};
use crate::system::{RealSystem, System};
use dotlayer_config::{HookSpec, ToolConfig};
use dotlayer_core::path::{AbsPath, expand_tilde_path, normalize};
use dotlayer_core::platform::CURRENT_PLATFORM;
use std::path::Path;
use std::sync::Arc;

/// Executes merge and install hooks for tool configurations
#[derive(Debug)]
pub struct HookRunner<S: System = RealSystem> {
    dotfiles_dir: AbsPath,
    machine: Option<String>,
    os: &'static str,
    registry: StrategyRegistry,
    system: S,
}

impl<S: System> HookRunner<S> {
    /// Create a runner rooted at `dotfiles_dir` with the builtin strategies
    ///
    /// A leading `~` is expanded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `dotfiles_dir` is empty or not
    /// absolute after expansion.
    pub fn new(dotfiles_dir: &str, system: S) -> Result<Self> {
        if dotfiles_dir.trim().is_empty() {
            return Err(Error::InvalidInput("dotfiles directory is empty".to_string()));
        }
        let dotfiles_dir = AbsPath::expand(dotfiles_dir).map_err(|e| {
            Error::InvalidInput(format!("dotfiles directory '{dotfiles_dir}': {e}"))
        })?;

        tracing::debug!(dotfiles_dir = %dotfiles_dir, os = CURRENT_PLATFORM.os, "Created hook runner");

        Ok(Self {
            dotfiles_dir,
            machine: None,
            os: CURRENT_PLATFORM.os,
            registry: StrategyRegistry::with_builtins(),
            system,
        })
    }

    /// Set the machine profile exported as `MACHINE`
    pub fn set_machine(&mut self, machine: impl Into<String>) {
        let machine = machine.into();
        self.machine = (!machine.is_empty()).then_some(machine);
    }

    /// Machine profile, if set
    pub fn machine(&self) -> Option<&str> {
        self.machine.as_deref()
    }

    /// Dotfiles repository root
    pub fn dotfiles_dir(&self) -> &AbsPath {
        &self.dotfiles_dir
    }

    /// OS name exported as `OS`
    pub fn os(&self) -> &str {
        self.os
    }

    /// Filesystem backend
    pub fn system(&self) -> &S {
        &self.system
    }

    /// Strategy registry
    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Strategy registry, for adding or replacing strategies
    pub fn registry_mut(&mut self) -> &mut StrategyRegistry {
        &mut self.registry
    }

    /// Register `script` as a strategy called `name`
    ///
    /// The script's existence is checked when the strategy runs, not here.
    pub fn register_script_strategy(&mut self, name: &str, script: AbsPath) -> Result<()> {
        tracing::debug!(name, script = %script, "Registering script strategy");
        self.registry
            .register(name, Arc::new(ScriptStrategy::new(name, script)))
    }

    /// Build the environment a hook for `config` would see
    pub fn build_environment(&self, config: &ToolConfig) -> ExecutionEnvironment {
        ExecutionEnvironment::build(config, &self.dotfiles_dir, self.os, self.machine())
    }

    /// Parse and run a hook specifier
    ///
    /// `builtin:<name>` runs a registered strategy; anything else is a script
    /// path.
    pub fn execute(&self, hook_spec: &str, config: &ToolConfig) -> HookResult {
        match HookSpec::parse(hook_spec) {
            Ok(spec) => self.dispatch(&spec, config),
            Err(e) => HookResult::from_error(&e.into()),
        }
    }

    /// Run a pre-parsed hook specifier
    pub fn dispatch(&self, spec: &HookSpec, config: &ToolConfig) -> HookResult {
        match spec {
            HookSpec::Builtin(name) => self.execute_builtin(name, config),
            HookSpec::Script(path) => self.execute_script(path, config),
        }
    }

    /// Run the strategy registered as `name`
    #[tracing::instrument(skip(self, config), fields(tool = %config.tool_name))]
    pub fn execute_builtin(&self, name: &str, config: &ToolConfig) -> HookResult {
        let result = HookResult::from_outcome(self.apply_builtin(name, config));
        log_result(&result, config);
        result
    }

    /// Run a script hook
    ///
    /// Relative paths resolve against `<dotfiles_dir>/tools/<tool_name>/`.
    #[tracing::instrument(skip(self, config), fields(tool = %config.tool_name))]
    pub fn execute_script(&self, path: &Path, config: &ToolConfig) -> HookResult {
        let result = HookResult::from_outcome(self.run_script_hook(path, config));
        log_result(&result, config);
        result
    }

    /// Run the tool's merge hook
    ///
    /// A tool without a merge hook is a configuration error.
    pub fn run_merge(&self, config: &ToolConfig) -> HookResult {
        match &config.merge_hook {
            Some(spec) => {
                tracing::info!(tool = %config.tool_name, hook = %spec, "Merging");
                self.dispatch(spec, config)
            }
            None => HookResult::from_error(&Error::InvalidInput(format!(
                "tool '{}' has no merge hook",
                config.tool_name
            ))),
        }
    }

    /// Run the tool's install hook, if it has one
    pub fn run_install(&self, config: &ToolConfig) -> HookResult {
        match &config.install_hook {
            Some(spec) => {
                tracing::info!(tool = %config.tool_name, hook = %spec, "Installing");
                self.dispatch(spec, config)
            }
            None => {
                tracing::debug!(tool = %config.tool_name, "No install hook");
                HookResult::empty_success()
            }
        }
    }

    fn apply_builtin(&self, name: &str, config: &ToolConfig) -> Result<Effect> {
        let strategy = self.registry.get(name)?;
        let target = config
            .target_path()
            .inspect_err(|e| tracing::debug!(error = %e, "Target not expandable"))
            .ok();
        let environment = self.build_environment(config);

        tracing::info!(strategy = name, target = %config.target, "Applying strategy");

        let ctx = StrategyContext {
            config,
            target: target.as_ref(),
            system: &self.system,
            environment: &environment,
            dotfiles_dir: &self.dotfiles_dir,
        };
        strategy.apply(&ctx)
    }

    fn run_script_hook(&self, path: &Path, config: &ToolConfig) -> Result<Effect> {
        let tool_dir = config.tool_dir(&self.dotfiles_dir);
        let script = resolve_against(&tool_dir, path)?;
        let target = config.target_path()?;
        let environment = self.build_environment(config);

        tracing::info!(script = %script, "Running script");

        run_hook_script(&self.system, &script, &environment, &target)
    }
}

/// Expand `~` and anchor relative paths at `base`
fn resolve_against(base: &AbsPath, path: &Path) -> Result<AbsPath> {
    if path.as_os_str().is_empty() {
        return Err(Error::InvalidInput("script path is empty".to_string()));
    }
    let expanded = expand_tilde_path(path)?;
    if expanded.is_absolute() {
        Ok(AbsPath::new(normalize(&expanded))?)
    } else {
        Ok(base.join(expanded))
    }
}

fn log_result(result: &HookResult, config: &ToolConfig) {
    if result.is_success() {
        tracing::debug!(
            tool = %config.tool_name,
            files = result.affected_files().len(),
            "Hook succeeded"
        );
    } else {
        tracing::warn!(
            tool = %config.tool_name,
            code = result.error_code(),
            "{}",
            result.error_message()
        );
    }
}
