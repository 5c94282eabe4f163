//! Strategy that leaves the filesystem alone

use super::{MergeStrategy, StrategyContext};
use crate::error::Result;
use crate::result::Effect;

/// Do nothing and succeed
///
/// Useful for tools managed entirely by their install hook.
#[derive(Debug, Default, Clone, Copy)]
pub struct SkipStrategy;

impl MergeStrategy for SkipStrategy {
    fn name(&self) -> &str {
        "skip"
    }

    fn apply(&self, ctx: &StrategyContext<'_>) -> Result<Effect> {
        tracing::debug!(tool = %ctx.config.tool_name, "Skipping merge");
        Ok(Effect::none())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::strategy::test_support::{config, run};
    use crate::system::MockSystem;

    #[test]
    fn test_skip_touches_nothing() {
        let fs = MockSystem::new();
        let effect = run(&SkipStrategy, &config("tmux", "/home/user/.tmux.conf", &[]), &fs).unwrap();
        assert!(effect.affected().is_empty());
        assert!(fs.operations().is_empty());
    }
}
