//! Strategy registry
//!
//! Maps strategy names to shared handlers. Each [`HookRunner`] owns one, so
//! runners (and tests) never see each other's registrations.
//!
//! [`HookRunner`]: crate::runner::HookRunner

use crate::error::{Error, Result};
use crate::strategy::{
    ConcatStrategy, JsonMergeStrategy, MergeStrategy, SkipStrategy, SourceStrategy,
    SymlinkStrategy,
};
use indexmap::IndexMap;
use std::sync::Arc;

/// Name the JSON strategy is also reachable under
pub const JSON_ALIAS: &str = "json";

/// Name → strategy map with insertion-ordered listing
#[derive(Debug, Default, Clone)]
pub struct StrategyRegistry {
    strategies: IndexMap<String, Arc<dyn MergeStrategy>>,
}

impl StrategyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the builtin strategies
    ///
    /// Registers `symlink`, `concat`, `source`, `json-merge`, `json` (the same
    /// handler as `json-merge`) and `skip`, in that order.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let json: Arc<dyn MergeStrategy> = Arc::new(JsonMergeStrategy);
        let builtins: [(&str, Arc<dyn MergeStrategy>); 6] = [
            ("symlink", Arc::new(SymlinkStrategy)),
            ("concat", Arc::new(ConcatStrategy)),
            ("source", Arc::new(SourceStrategy)),
            ("json-merge", Arc::clone(&json)),
            (JSON_ALIAS, json),
            ("skip", Arc::new(SkipStrategy)),
        ];
        for (name, strategy) in builtins {
            registry.strategies.insert(name.to_string(), strategy);
        }
        registry
    }

    /// Register `strategy` under `name`, replacing any previous entry
    ///
    /// A replaced entry keeps its position in [`Self::list`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `name` or the strategy's own name is
    /// empty.
    pub fn register(&mut self, name: &str, strategy: Arc<dyn MergeStrategy>) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidInput("strategy name is empty".to_string()));
        }
        if strategy.name().is_empty() {
            return Err(Error::InvalidInput(format!(
                "strategy registered as '{name}' has an empty identifier"
            )));
        }

        if self.strategies.insert(name.to_string(), strategy).is_some() {
            tracing::debug!(name, "Replaced strategy");
        } else {
            tracing::debug!(name, "Registered strategy");
        }
        Ok(())
    }

    /// Whether `name` is registered
    pub fn exists(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Look up a strategy
    ///
    /// # Errors
    ///
    /// Returns [`Error::StrategyNotFound`] (which names `name`) if nothing is
    /// registered under it.
    pub fn get(&self, name: &str) -> Result<Arc<dyn MergeStrategy>> {
        self.strategies
            .get(name)
            .cloned()
            .ok_or_else(|| Error::StrategyNotFound {
                name: name.to_string(),
            })
    }

    /// Registered names in registration order
    pub fn list(&self) -> Vec<&str> {
        self.strategies.keys().map(String::as_str).collect()
    }

    /// Remove a strategy
    ///
    /// # Errors
    ///
    /// Returns [`Error::StrategyNotFound`] if `name` is not registered.
    pub fn unregister(&mut self, name: &str) -> Result<()> {
        self.strategies
            .shift_remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::StrategyNotFound {
                name: name.to_string(),
            })
    }

    /// Remove every strategy
    pub fn clear(&mut self) {
        self.strategies.clear();
    }

    /// Number of registered names (aliases count separately)
    pub fn count(&self) -> usize {
        self.strategies.len()
    }
}
