//! Environment handed to hook scripts
//!
//! Built fresh for every hook invocation from the tool configuration and the
//! runner's state. Construction is pure: the same inputs always produce the
//! same entries in the same order.

use dotlayer_config::ToolConfig;
use dotlayer_core::path::AbsPath;
use indexmap::IndexMap;
use std::fmt;

/// Tool name
pub const TOOL: &str = "TOOL";
/// Tilde-expanded target path
pub const TARGET: &str = "TARGET";
/// Colon-joined layer names
pub const LAYERS: &str = "LAYERS";
/// Colon-joined resolved layer paths, aligned with [`LAYERS`]
pub const LAYER_PATHS: &str = "LAYER_PATHS";
/// Dotfiles repository root
pub const DOTFILES_DIR: &str = "DOTFILES_DIR";
/// `darwin`, `linux` or `unknown`
pub const OS: &str = "OS";
/// Machine profile name, empty when unset
pub const MACHINE: &str = "MACHINE";

/// Every key, in the order entries are built
pub const KEYS: [&str; 7] = [TOOL, TARGET, LAYERS, LAYER_PATHS, DOTFILES_DIR, OS, MACHINE];

/// Separator for list-valued entries
const LIST_SEPARATOR: &str = ":";

/// Ordered key/value set describing one hook invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionEnvironment {
    vars: IndexMap<String, String>,
}

impl ExecutionEnvironment {
    /// Build the environment for `config`
    ///
    /// `TARGET` carries the expanded target; if expansion fails (empty or
    /// relative target) the raw value is passed through and the strategy
    /// reports the problem.
    pub fn build(
        config: &ToolConfig,
        dotfiles_dir: &AbsPath,
        os: &str,
        machine: Option<&str>,
    ) -> Self {
        let target = config
            .target_path()
            .map_or_else(|_| config.target.clone(), |p| p.to_string());

        let names: Vec<&str> = config.layers.iter().map(|l| l.name.as_str()).collect();
        let paths: Vec<String> = config.layers.iter().map(|l| l.resolved_display()).collect();

        let mut vars = IndexMap::with_capacity(KEYS.len());
        vars.insert(TOOL.to_string(), config.tool_name.clone());
        vars.insert(TARGET.to_string(), target);
        vars.insert(LAYERS.to_string(), names.join(LIST_SEPARATOR));
        vars.insert(LAYER_PATHS.to_string(), paths.join(LIST_SEPARATOR));
        vars.insert(DOTFILES_DIR.to_string(), dotfiles_dir.to_string());
        vars.insert(OS.to_string(), os.to_string());
        vars.insert(MACHINE.to_string(), machine.unwrap_or_default().to_string());

        Self { vars }
    }

    /// Value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Entries in build order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Copy of the entries, ready to extend with passthrough variables
    pub fn to_map(&self) -> IndexMap<String, String> {
        self.vars.clone()
    }
}

impl fmt::Display for ExecutionEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.vars {
            writeln!(f, "{key}={value}")?;
        }
        Ok(())
    }
}
