//! Deep-merge JSON layers
//!
//! Merge semantics:
//! - Objects: merged key by key, recursively
//! - Arrays: replaced wholesale by the later layer
//! - Scalars and mixed pairings: the later value wins
//! - `null` overrides like any other value
//!
//! Keys keep the position of their first appearance.

use super::{MergeStrategy, StrategyContext, read_layer};
use crate::error::{Error, Result};
use crate::result::Effect;
use serde_json::Value;

/// Merge `overlay` on top of `base`
pub fn deep_merge(mut base: Value, overlay: Value) -> Value {
    merge_into(&mut base, overlay);
    base
}

// In place so existing keys keep their position; Map::remove would reorder
fn merge_into(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(base_value) => merge_into(base_value, overlay_value),
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Parse every layer as JSON and fold them with [`deep_merge`]
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonMergeStrategy;

impl MergeStrategy for JsonMergeStrategy {
    fn name(&self) -> &str {
        "json-merge"
    }

    fn apply(&self, ctx: &StrategyContext<'_>) -> Result<Effect> {
        let target = ctx.target()?;
        let layers = ctx.require_layers(self.name())?;

        let mut merged: Option<Value> = None;
        for layer in layers {
            let content = read_layer(ctx.system, layer)?;
            let value: Value =
                serde_json::from_slice(&content).map_err(|e| Error::InvalidJson {
                    layer: layer.name.clone(),
                    path: layer.resolved_path.clone().unwrap_or_default(),
                    source: e,
                })?;
            merged = Some(match merged {
                Some(base) => deep_merge(base, value),
                None => value,
            });
        }

        let merged = merged.unwrap_or(Value::Null);
        let mut output = serde_json::to_string_pretty(&merged).map_err(|e| Error::InvalidJson {
            layer: layers
                .last()
                .map(|l| l.name.clone())
                .unwrap_or_default(),
            path: target.as_path().to_path_buf(),
            source: e,
        })?;
        output.push('\n');

        ctx.unlink_target()?;
        ctx.system.write_file(target, output.as_bytes())?;

        Ok(Effect::touched(target))
    }
}
