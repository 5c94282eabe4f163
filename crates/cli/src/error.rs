//! Error types for CLI commands

use dotlayer_core::ErrorCode;
use thiserror::Error;

/// Errors that can occur during command execution
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// A single hook failed
    #[error("{step} for '{tool}' failed: {message}")]
    HookFailed {
        /// Tool whose hook failed
        tool: String,
        /// "merge" or "install"
        step: &'static str,
        /// Code reported by the hook
        code: i32,
        /// Hook's error message
        message: String,
    },

    /// Some tools in an apply run failed
    #[error("Apply failed: {failed} out of {total} tools")]
    ApplyFailed {
        /// Number of tools that failed
        failed: usize,
        /// Total number of tools
        total: usize,
    },

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] dotlayer_core::Error),

    /// Engine setup failed
    #[error(transparent)]
    Engine(#[from] dotlayer_engine::Error),
}

impl CommandError {
    /// Process exit status for this error
    ///
    /// Hook failures exit with the hook's code so scripts driving dotlayer
    /// can tell failures apart.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::HookFailed { code, .. } => *code,
            Self::ApplyFailed { .. } => ErrorCode::Generic.as_i32(),
            Self::Config(e) => e.code().as_i32(),
            Self::Engine(e) => e.code().as_i32(),
        }
    }
}

/// Result type for CLI commands
pub type Result<T> = std::result::Result<T, CommandError>;
