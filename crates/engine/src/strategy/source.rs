//! Write a file that sources every layer

use super::{MergeStrategy, StrategyContext, layer_path};
use crate::error::Result;
use crate::result::Effect;

/// First line of every generated file
pub const SOURCE_BANNER: &str = "# Generated by dotlayer. Do not edit; changes are overwritten.\n";

/// Emit one `source` line per layer instead of inlining content
///
/// Missing layer files are written anyway (with a warning) so a layer that
/// appears later is picked up without re-running the merge.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceStrategy;

impl MergeStrategy for SourceStrategy {
    fn name(&self) -> &str {
        "source"
    }

    fn apply(&self, ctx: &StrategyContext<'_>) -> Result<Effect> {
        let target = ctx.target()?;
        let layers = ctx.require_layers(self.name())?;

        let mut output = String::from(SOURCE_BANNER);
        for layer in layers {
            let path = layer_path(layer)?;
            if !ctx.system.is_file(&path) {
                tracing::warn!(layer = %layer.name, path = %path, "Sourced layer does not exist");
            }
            output.push_str(&format!("source {}\n", shell_quote(&path.to_string())));
        }

        ctx.unlink_target()?;
        ctx.system.write_file(target, output.as_bytes())?;

        Ok(Effect::touched(target))
    }
}

/// Double-quote a path for POSIX shells
fn shell_quote(path: &str) -> String {
    let mut quoted = String::with_capacity(path.len() + 2);
    quoted.push('"');
    for c in path.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
