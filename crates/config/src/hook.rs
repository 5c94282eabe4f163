//! Hook specifiers
//!
//! A hook is written in `tool.toml` as a single string:
//!
//! - `builtin:<name>` selects a strategy registered with the runner
//! - anything else is a script path, absolute or relative to
//!   `<dotfiles_dir>/tools/<tool_name>/`
//!
//! The string is parsed once, when the configuration is loaded.

use dotlayer_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Prefix that marks a builtin strategy reference
pub const BUILTIN_PREFIX: &str = "builtin:";

/// A parsed merge or install hook
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HookSpec {
    /// A registered strategy, looked up by name
    Builtin(String),
    /// A script on disk
    Script(PathBuf),
}

impl HookSpec {
    /// Parse a hook specifier
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an empty specifier. A bare
    /// `builtin:` parses to an empty builtin name, which no registry holds.
    ///
    /// # Examples
    ///
    /// ```
    /// use dotlayer_config::HookSpec;
    ///
    /// let spec = HookSpec::parse("builtin:symlink").unwrap();
    /// assert_eq!(spec, HookSpec::Builtin("symlink".to_string()));
    ///
    /// let spec = HookSpec::parse("./merge.sh").unwrap();
    /// assert!(matches!(spec, HookSpec::Script(_)));
    /// ```
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(Error::InvalidInput("hook specifier is empty".to_string()));
        }

        match spec.strip_prefix(BUILTIN_PREFIX) {
            Some(name) => Ok(Self::Builtin(name.to_string())),
            None => Ok(Self::Script(PathBuf::from(spec))),
        }
    }

    /// Name of the builtin strategy, if this is one
    pub fn builtin_name(&self) -> Option<&str> {
        match self {
            Self::Builtin(name) => Some(name),
            Self::Script(_) => None,
        }
    }

    /// Script path, if this is one
    pub fn script_path(&self) -> Option<&Path> {
        match self {
            Self::Builtin(_) => None,
            Self::Script(path) => Some(path),
        }
    }
}

impl FromStr for HookSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HookSpec {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<HookSpec> for String {
    fn from(spec: HookSpec) -> Self {
        spec.to_string()
    }
}

impl std::fmt::Display for HookSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin(name) => write!(f, "{BUILTIN_PREFIX}{name}"),
            Self::Script(path) => write!(f, "{}", path.display()),
        }
    }
}
