//! Concatenate every layer into the target

use super::{MergeStrategy, StrategyContext, read_layer};
use crate::error::Result;
use crate::result::Effect;

/// Header line written before each layer's content
pub fn layer_header(name: &str) -> String {
    format!("# --- layer: {name} ---\n")
}

/// Write all layers, lowest priority first, each under a header line
///
/// Layer content is copied verbatim. A newline is added after content that
/// does not end with one so every header starts on its own line.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConcatStrategy;

impl MergeStrategy for ConcatStrategy {
    fn name(&self) -> &str {
        "concat"
    }

    fn apply(&self, ctx: &StrategyContext<'_>) -> Result<Effect> {
        let target = ctx.target()?;
        let layers = ctx.require_layers(self.name())?;

        // Read everything before touching the target
        let mut output = Vec::new();
        for layer in layers {
            let content = read_layer(ctx.system, layer)?;
            output.extend_from_slice(layer_header(&layer.name).as_bytes());
            if !content.is_empty() {
                let terminated = content.ends_with(b"\n");
                output.extend_from_slice(&content);
                if !terminated {
                    output.push(b'\n');
                }
            }
            tracing::debug!(layer = %layer.name, bytes = content.len(), "Concatenated layer");
        }

        ctx.unlink_target()?;
        ctx.system.write_file(target, &output)?;

        Ok(Effect::touched(target))
    }
}
