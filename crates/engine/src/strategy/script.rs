//! User-defined strategies backed by a script

use super::{MergeStrategy, StrategyContext};
use crate::error::Result;
use crate::result::Effect;
use crate::script::run_hook_script;
use dotlayer_core::path::AbsPath;

/// A strategy that runs a script through the isolated hook path
///
/// Registered from the `[strategies]` table of `dotlayer.toml`. Registering
/// under a builtin's name replaces the builtin for the runner's lifetime.
#[derive(Debug, Clone)]
pub struct ScriptStrategy {
    name: String,
    script: AbsPath,
}

impl ScriptStrategy {
    /// Create a strategy called `name` that runs `script`
    pub fn new(name: impl Into<String>, script: AbsPath) -> Self {
        Self {
            name: name.into(),
            script,
        }
    }

    /// Script this strategy runs
    pub fn script(&self) -> &AbsPath {
        &self.script
    }
}

impl MergeStrategy for ScriptStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, ctx: &StrategyContext<'_>) -> Result<Effect> {
        run_hook_script(ctx.system, &self.script, ctx.environment, ctx.target()?)
    }
}
