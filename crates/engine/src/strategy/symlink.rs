//! Link the target to the highest-priority layer

use super::{MergeStrategy, StrategyContext, layer_path};
use crate::error::{Error, Result};
use crate::result::Effect;

/// Replace the target with a symlink to the last layer
///
/// Only the last layer matters; lower layers are ignored. Whatever sits at
/// the target (file, directory, link, dangling link) is removed first. The
/// target's parent directory must already exist.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymlinkStrategy;

impl MergeStrategy for SymlinkStrategy {
    fn name(&self) -> &str {
        "symlink"
    }

    fn apply(&self, ctx: &StrategyContext<'_>) -> Result<Effect> {
        let target = ctx.target()?;
        let layers = ctx.require_layers(self.name())?;
        let Some(top) = layers.last() else {
            return Err(Error::InvalidInput("no layers".to_string()));
        };
        let source = layer_path(top)?;

        let system = ctx.system;
        if system.is_symlink(target) || system.is_file(target) {
            system.remove(target)?;
        } else if system.is_dir(target) {
            system.remove_all(target)?;
        }

        tracing::debug!(link = %target, layer = %top.name, "Linking");
        system.symlink(source.as_path(), target)?;

        Ok(Effect::touched(target))
    }
}
