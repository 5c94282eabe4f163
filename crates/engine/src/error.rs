//! Error types for dotlayer-engine
//!
//! Every variant maps onto the shared [`ErrorCode`] taxonomy through
//! [`Error::code`]; that mapping is what a failed [`HookResult`] reports.
//!
//! [`HookResult`]: crate::result::HookResult

use dotlayer_core::ErrorCode;
use dotlayer_core::path::AbsPath;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for dotlayer-engine
#[derive(Error, Debug)]
pub enum Error {
    /// Error reading a file
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: AbsPath,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a file
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: AbsPath,
        #[source]
        source: std::io::Error,
    },

    /// Error copying a file
    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: AbsPath,
        to: AbsPath,
        #[source]
        source: std::io::Error,
    },

    /// Error creating a directory
    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: AbsPath,
        #[source]
        source: std::io::Error,
    },

    /// Error reading a directory
    #[error("Failed to read directory {path}: {source}")]
    DirectoryRead {
        path: AbsPath,
        #[source]
        source: std::io::Error,
    },

    /// Error removing a path
    #[error("Failed to remove {path}: {source}")]
    Remove {
        path: AbsPath,
        #[source]
        source: std::io::Error,
    },

    /// Error creating or reading a symlink
    #[error("Failed to symlink {link} -> {}: {source}", target.display())]
    Symlink {
        link: AbsPath,
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error changing permissions
    #[error("Failed to set permissions on {path}: {source}")]
    Permissions {
        path: AbsPath,
        #[source]
        source: std::io::Error,
    },

    /// Error launching a script
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: AbsPath,
        #[source]
        source: std::io::Error,
    },

    /// A script ran but exited nonzero
    #[error("Hook script {path} exited with code {exit_code}")]
    ScriptFailed { path: AbsPath, exit_code: i32 },

    /// A hook script does not exist
    #[error("Hook script not found: {path}")]
    ScriptNotFound { path: AbsPath },

    /// No strategy registered under this name
    #[error("Strategy not found: '{name}'")]
    StrategyNotFound { name: String },

    /// A layer file a strategy needs is missing
    #[error("Layer '{layer}' not found at {}", path.display())]
    LayerNotFound { layer: String, path: PathBuf },

    /// A layer holds malformed JSON
    #[error("Layer '{layer}' is not valid JSON ({}): {source}", path.display())]
    InvalidJson {
        layer: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Missing or empty required argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Backup or restore failed
    #[error("Backup failed: {0}")]
    Backup(String),

    /// A backup that should exist is gone
    #[error("Backup not found: {path}")]
    BackupNotFound { path: AbsPath },

    /// Error from the core or config crates
    #[error(transparent)]
    Core(#[from] dotlayer_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Position of this error in the shared taxonomy
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::FileRead { source, .. }
            | Self::FileWrite { source, .. }
            | Self::Copy { source, .. }
            | Self::DirectoryCreate { source, .. }
            | Self::DirectoryRead { source, .. }
            | Self::Remove { source, .. }
            | Self::Permissions { source, .. }
            | Self::Io(source) => ErrorCode::from_io(source),
            Self::Symlink { .. } | Self::ScriptFailed { .. } => ErrorCode::Generic,
            Self::Spawn { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::Dependency,
                _ => ErrorCode::from_io(source),
            },
            Self::ScriptNotFound { .. }
            | Self::StrategyNotFound { .. }
            | Self::LayerNotFound { .. }
            | Self::BackupNotFound { .. } => ErrorCode::NotFound,
            Self::InvalidJson { .. } => ErrorCode::Validation,
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::Backup(_) => ErrorCode::Backup,
            Self::Core(e) => e.code(),
        }
    }

    /// Exit status of a failed script, if this error came from one
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ScriptFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    fn abs(p: &str) -> AbsPath {
        AbsPath::new(p.into()).unwrap()
    }

    #[test]
    fn test_not_found_family() {
        let errors = [
            Error::ScriptNotFound {
                path: abs("/dotfiles/tools/nvim/merge.sh"),
            },
            Error::StrategyNotFound {
                name: "unknown".into(),
            },
            Error::LayerNotFound {
                layer: "base".into(),
                path: "/dotfiles/base".into(),
            },
            Error::BackupNotFound {
                path: abs("/backups/git/.gitconfig"),
            },
        ];
        for err in errors {
            assert_eq!(err.code(), ErrorCode::NotFound, "{err}");
        }
    }

    #[test]
    fn test_symlink_failure_is_generic() {
        let err = Error::Symlink {
            link: abs("/home/user/.gitconfig"),
            target: "/dotfiles/git".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.code(), ErrorCode::Generic);
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_spawn_missing_interpreter_is_dependency() {
        let err = Error::Spawn {
            program: abs("/dotfiles/tools/git/merge.sh"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(err.code(), ErrorCode::Dependency);
    }

    #[test]
    fn test_core_errors_keep_their_code() {
        let err: Error = dotlayer_core::Error::InvalidInput("empty".into()).into();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
        assert_eq!(err.to_string(), "Invalid input: empty");
    }

    #[test]
    fn test_invalid_json_names_layer() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::InvalidJson {
            layer: "work".into(),
            path: "/dotfiles/vscode/work.json".into(),
            source,
        };
        assert_eq!(err.code(), ErrorCode::Validation);
        assert!(err.to_string().contains("'work'"));
    }

    #[test]
    fn test_exit_code_only_for_script_failures() {
        let failed = Error::ScriptFailed {
            path: abs("/x.sh"),
            exit_code: 42,
        };
        assert_eq!(failed.exit_code(), Some(42));
        assert_eq!(Error::Backup("x".into()).exit_code(), None);
        assert_eq!(Error::Backup("x".into()).code(), ErrorCode::Backup);
    }
}
