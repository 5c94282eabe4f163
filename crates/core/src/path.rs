//! Type-safe absolute paths and tilde expansion
//!
//! Targets and the dotfiles directory are written by users as either absolute
//! paths or `~`-prefixed paths. [`expand_tilde`] turns the latter into the
//! former against the invoking user's home directory, and [`AbsPath`] carries
//! the guarantee that expansion happened.
//!
//! # Examples
//!
//! ```
//! use dotlayer_core::path::AbsPath;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let home = AbsPath::new("/home/user".into())?;
//! let gitconfig = home.join(".gitconfig");
//! assert_eq!(gitconfig.as_path().to_str().unwrap(), "/home/user/.gitconfig");
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Expand a leading `~` against the current user's home directory
///
/// Only a bare `~` or a `~/` prefix is expanded; `~user` forms are returned
/// unchanged, as is every path that does not start with `~`.
///
/// # Errors
///
/// Returns [`Error::HomeDirUnknown`] when the path needs expansion and the
/// home directory cannot be determined.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    expand_tilde_path(Path::new(path))
}

/// [`expand_tilde`] for paths that may not be valid UTF-8
///
/// # Errors
///
/// Returns [`Error::HomeDirUnknown`] when the path needs expansion and the
/// home directory cannot be determined.
pub fn expand_tilde_path(path: &Path) -> Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = dirs::home_dir().ok_or(Error::HomeDirUnknown)?;
    if rest.as_os_str().is_empty() {
        Ok(home)
    } else {
        Ok(home.join(rest))
    }
}

/// Drop `.` components so `tools/nvim/./merge.sh` becomes `tools/nvim/merge.sh`
///
/// `..` is kept as-is; resolving it would require touching the filesystem.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// An absolute path on the filesystem
///
/// This type guarantees that the path is absolute. Every filesystem
/// operation in the engine takes one of these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbsPath(PathBuf);

impl AbsPath {
    /// Create a new `AbsPath` from a `PathBuf`
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute.
    ///
    /// # Examples
    ///
    /// ```
    /// use dotlayer_core::path::AbsPath;
    ///
    /// assert!(AbsPath::new("/etc/hosts".into()).is_ok());
    /// assert!(AbsPath::new("relative/path".into()).is_err());
    /// ```
    pub fn new(path: PathBuf) -> Result<Self> {
        if path.is_absolute() {
            Ok(AbsPath(path))
        } else {
            Err(Error::PathNotAbsolute { path })
        }
    }

    /// Create a new `AbsPath` from a reference to a `Path`
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::new(path.to_path_buf())
    }

    /// Expand a leading `~` and require the result to be absolute
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, the home directory is unknown,
    /// or the expanded path is relative.
    pub fn expand(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(Error::InvalidInput("path is empty".to_string()));
        }
        Self::new(expand_tilde(path)?)
    }

    /// Get the underlying `Path`
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Convert to a `PathBuf`
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// Join with a path segment
    ///
    /// Joining an absolute segment replaces the base, exactly as
    /// [`Path::join`] does, so the result is always absolute.
    #[must_use]
    pub fn join(&self, segment: impl AsRef<Path>) -> Self {
        AbsPath(normalize(&self.0.join(segment)))
    }

    /// Get the parent directory
    ///
    /// Returns `None` if this is the root directory.
    pub fn parent(&self) -> Option<Self> {
        self.0.parent().map(|p| AbsPath(p.to_path_buf()))
    }

    /// Get the file name
    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name().and_then(|s| s.to_str())
    }
}

impl AsRef<Path> for AbsPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl std::fmt::Display for AbsPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
