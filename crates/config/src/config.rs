//! Configuration management
//!
//! This module loads the optional `dotlayer.toml` at the root of the
//! dotfiles directory:
//!
//! ```toml
//! machine = "laptop"
//!
//! [backup]
//! enabled = true
//! dir = "~/.local/state/dotlayer/backups"
//!
//! [strategies]
//! # Register a script as a named strategy. A name that matches a builtin
//! # replaces it for every tool.
//! yaml-merge = "scripts/yaml-merge.sh"
//! ```

use crate::Result;
use dotlayer_core::Error;
use dotlayer_core::path::{AbsPath, expand_tilde};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// File name of the top-level configuration
pub const CONFIG_FILE: &str = "dotlayer.toml";

/// Backup configuration section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackupConfig {
    /// Back up an existing target before a merge touches it
    #[serde(default = "default_backup_enabled")]
    pub enabled: bool,

    /// Where backups are kept (defaults to the XDG state directory)
    #[serde(default)]
    pub dir: Option<String>,
}

fn default_backup_enabled() -> bool {
    true
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: default_backup_enabled(),
            dir: None,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Machine profile name exported to hooks as `MACHINE`
    #[serde(default)]
    pub machine: Option<String>,

    /// Backup settings
    #[serde(default)]
    pub backup: BackupConfig,

    /// User strategies: name → script path (relative to the dotfiles dir)
    #[serde(default)]
    pub strategies: IndexMap<String, String>,
}

impl Config {
    /// Load `dotlayer.toml` from the dotfiles directory
    ///
    /// A missing file yields the default configuration.
    pub fn load(dotfiles_dir: &AbsPath) -> Result<Self> {
        let path = dotfiles_dir.join(CONFIG_FILE);
        if !path.as_path().exists() {
            tracing::debug!("No {} found, using defaults", CONFIG_FILE);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path.as_path())?;
        Self::from_toml(&content).map_err(|e| Error::Validation(format!("{path}: {e}")))
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Resolved backup directory
    ///
    /// Returns `None` when backups are disabled or no directory can be
    /// determined.
    pub fn backup_dir(&self) -> Result<Option<PathBuf>> {
        if !self.backup.enabled {
            return Ok(None);
        }

        match &self.backup.dir {
            Some(dir) => Ok(Some(expand_tilde(dir)?)),
            None => Ok(crate::dirs::backup_dir()),
        }
    }

    /// User strategies with their script paths resolved against `dotfiles_dir`
    pub fn strategy_scripts(&self, dotfiles_dir: &AbsPath) -> Result<Vec<(String, AbsPath)>> {
        self.strategies
            .iter()
            .map(|(name, script)| {
                if name.is_empty() || script.is_empty() {
                    return Err(Error::InvalidInput(format!(
                        "strategy entry '{name}' = '{script}' is incomplete"
                    )));
                }
                let expanded = expand_tilde(script)?;
                let path = if expanded.is_absolute() {
                    AbsPath::new(expanded)?
                } else {
                    dotfiles_dir.join(expanded)
                };
                Ok((name.clone(), path))
            })
            .collect()
    }
}
