//! Base error types for dotlayer
//!
//! This module provides the shared error taxonomy and the foundation error
//! type that all crates can use.

use std::path::PathBuf;
use thiserror::Error;

/// Error taxonomy shared by every dotlayer component
///
/// The integer values are stable: they are what a hook result reports and
/// what the CLI uses as its process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    /// No error
    Ok = 0,
    /// Unclassified failure
    Generic = 1,
    /// Missing or empty required argument
    InvalidInput = 2,
    /// Unknown strategy, missing script, layer file or backup
    NotFound = 3,
    /// Permission denied
    Permission = 4,
    /// Malformed structured content (e.g. bad JSON)
    Validation = 5,
    /// External tool unavailable
    Dependency = 6,
    /// Backup or restore failure
    Backup = 7,
}

impl ErrorCode {
    /// Integer value of this code
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Map an integer back onto the taxonomy
    ///
    /// Returns `None` for values outside the taxonomy, such as a script's
    /// arbitrary exit status.
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Ok),
            1 => Some(Self::Generic),
            2 => Some(Self::InvalidInput),
            3 => Some(Self::NotFound),
            4 => Some(Self::Permission),
            5 => Some(Self::Validation),
            6 => Some(Self::Dependency),
            7 => Some(Self::Backup),
            _ => None,
        }
    }

    /// Lowercase name used in log output
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Generic => "generic",
            Self::InvalidInput => "invalid-input",
            Self::NotFound => "not-found",
            Self::Permission => "permission",
            Self::Validation => "validation",
            Self::Dependency => "dependency",
            Self::Backup => "backup",
        }
    }

    /// Classify an I/O error by its kind
    #[must_use]
    pub fn from_io(err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound,
            std::io::ErrorKind::PermissionDenied => Self::Permission,
            _ => Self::Generic,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_i32())
    }
}

/// Base error type for shared functionality
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Path is not absolute
    #[error("Path must be absolute: {}", path.display())]
    PathNotAbsolute { path: PathBuf },

    /// Home directory could not be determined for tilde expansion
    #[error("Cannot expand '~': home directory is unknown")]
    HomeDirUnknown,

    /// Missing or empty required argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Something that was looked up does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed content
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Generic error message
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Position of this error in the shared taxonomy
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Io(e) => ErrorCode::from_io(e),
            Self::PathNotAbsolute { .. } | Self::HomeDirUnknown | Self::InvalidInput(_) => {
                ErrorCode::InvalidInput
            }
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::Validation(_) => ErrorCode::Validation,
            Self::Message(_) => ErrorCode::Generic,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
