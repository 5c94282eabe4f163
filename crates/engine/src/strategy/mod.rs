//! Merge strategies
//!
//! A strategy composes a tool's layers into its target. Builtins cover the
//! common shapes (link the top layer, concatenate, aggregate `source` lines,
//! deep-merge JSON, do nothing); users add their own through
//! [`ScriptStrategy`].
//!
//! Strategies never build a [`HookResult`](crate::result::HookResult)
//! themselves: they return `Result<Effect>` and the runner converts it.

mod concat;
mod json_merge;
mod script;
mod skip;
mod source;
mod symlink;

pub use concat::{ConcatStrategy, layer_header};
pub use json_merge::{JsonMergeStrategy, deep_merge};
pub use script::ScriptStrategy;
pub use skip::SkipStrategy;
pub use source::{SOURCE_BANNER, SourceStrategy};
pub use symlink::SymlinkStrategy;

use crate::environment::ExecutionEnvironment;
use crate::error::{Error, Result};
use crate::result::Effect;
use crate::system::System;
use dotlayer_config::{Layer, ToolConfig};
use dotlayer_core::path::AbsPath;

/// Everything a strategy may look at while running
pub struct StrategyContext<'a> {
    /// Tool being merged
    pub config: &'a ToolConfig,
    /// Target with `~` already expanded, `None` if expansion failed
    pub target: Option<&'a AbsPath>,
    /// Filesystem backend
    pub system: &'a dyn System,
    /// Environment built for this invocation
    pub environment: &'a ExecutionEnvironment,
    /// Dotfiles repository root
    pub dotfiles_dir: &'a AbsPath,
}

impl<'a> StrategyContext<'a> {
    /// Expanded target
    ///
    /// # Errors
    ///
    /// Returns the expansion error (an `InvalidInput` code) when the tool's
    /// target is empty or not absolute.
    pub fn target(&self) -> Result<&'a AbsPath> {
        match self.target {
            Some(target) => Ok(target),
            None => Err(self.config.target_path().err().map_or_else(
                || Error::InvalidInput(format!("tool '{}' has no target", self.config.tool_name)),
                Error::from,
            )),
        }
    }

    /// Layers of the tool, failing when there are none
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] naming `strategy` for a tool without
    /// layers.
    pub fn require_layers(&self, strategy: &str) -> Result<&[Layer]> {
        if self.config.layers.is_empty() {
            return Err(Error::InvalidInput(format!(
                "strategy '{strategy}' needs at least one layer, tool '{}' has none",
                self.config.tool_name
            )));
        }
        Ok(&self.config.layers)
    }

    /// Remove a symlink sitting at the target so a write cannot land in a layer
    pub fn unlink_target(&self) -> Result<()> {
        let target = self.target()?;
        if self.system.is_symlink(target) {
            tracing::debug!(target = %target, "Removing symlink before write");
            self.system.remove(target)?;
        }
        Ok(())
    }
}

/// A named way of composing layers into a target
pub trait MergeStrategy: std::fmt::Debug {
    /// Identifier the strategy registers under
    fn name(&self) -> &str;

    /// Compose the layers and report what was touched
    fn apply(&self, ctx: &StrategyContext<'_>) -> Result<Effect>;
}

/// Absolute path of a resolved layer
pub(crate) fn layer_path(layer: &Layer) -> Result<AbsPath> {
    let resolved = layer.resolved()?;
    Ok(AbsPath::from_path(resolved)?)
}

/// Read a layer, reporting a missing file by layer name
pub(crate) fn read_layer(system: &dyn System, layer: &Layer) -> Result<Vec<u8>> {
    let path = layer_path(layer)?;
    if !system.is_file(&path) {
        return Err(Error::LayerNotFound {
            layer: layer.name.clone(),
            path: path.into_path_buf(),
        });
    }
    system.read_file(&path)
}
