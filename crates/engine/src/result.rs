//! Outcome of a single hook execution
//!
//! Strategies and script runs produce `Result<Effect>`; the runner turns that
//! into a [`HookResult`] in exactly one place ([`HookResult::from_outcome`]).
//! A `HookResult` is built once and never modified afterwards.

use crate::error::Error;
use dotlayer_core::ErrorCode;
use indexmap::IndexSet;
use std::path::{Path, PathBuf};

/// Files touched by a successful strategy or script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Effect {
    affected: IndexSet<PathBuf>,
}

impl Effect {
    /// Nothing was touched
    pub fn none() -> Self {
        Self::default()
    }

    /// A single path was touched
    pub fn touched(path: impl AsRef<Path>) -> Self {
        let mut affected = IndexSet::new();
        affected.insert(path.as_ref().to_path_buf());
        Self { affected }
    }

    /// Add another touched path (duplicates collapse)
    #[must_use]
    pub fn and(mut self, path: impl AsRef<Path>) -> Self {
        self.affected.insert(path.as_ref().to_path_buf());
        self
    }

    /// Paths touched, in first-touch order
    pub fn affected(&self) -> &IndexSet<PathBuf> {
        &self.affected
    }
}

/// Immutable result of running one hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookResult {
    success: bool,
    error_code: i32,
    error_message: String,
    affected_files: IndexSet<PathBuf>,
}

impl HookResult {
    /// Successful run that touched `affected_files`
    pub fn success(affected_files: IndexSet<PathBuf>) -> Self {
        Self {
            success: true,
            error_code: ErrorCode::Ok.as_i32(),
            error_message: String::new(),
            affected_files,
        }
    }

    /// Successful run that touched nothing
    pub fn empty_success() -> Self {
        Self::success(IndexSet::new())
    }

    /// Failed run with a taxonomy code
    ///
    /// `ErrorCode::Ok` is never reported for a failure; it is coerced to
    /// `Generic`.
    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        let code = if code == ErrorCode::Ok {
            ErrorCode::Generic
        } else {
            code
        };
        Self::exit_failure(code.as_i32(), message)
    }

    /// Failed run carrying a raw exit status (0 is coerced to `Generic`)
    pub fn exit_failure(exit_code: i32, message: impl Into<String>) -> Self {
        let error_code = if exit_code == 0 {
            ErrorCode::Generic.as_i32()
        } else {
            exit_code
        };
        Self {
            success: false,
            error_code,
            error_message: message.into(),
            affected_files: IndexSet::new(),
        }
    }

    /// Failure describing an engine error
    ///
    /// Script failures report the script's exit status; everything else
    /// reports the error's taxonomy code.
    pub fn from_error(error: &Error) -> Self {
        match error.exit_code() {
            Some(exit_code) => Self::exit_failure(exit_code, error.to_string()),
            None => Self::failure(error.code(), error.to_string()),
        }
    }

    /// Convert a strategy or script outcome
    pub fn from_outcome(outcome: crate::Result<Effect>) -> Self {
        match outcome {
            Ok(effect) => Self::success(effect.affected),
            Err(e) => Self::from_error(&e),
        }
    }

    /// Whether the hook succeeded
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// `0` on success; a taxonomy value or a script's exit status otherwise
    pub fn error_code(&self) -> i32 {
        self.error_code
    }

    /// Taxonomy interpretation of [`Self::error_code`], if it is one
    ///
    /// A script exiting with 3 reads as `NotFound` here; callers that need
    /// to tell the two apart should keep the original error.
    pub fn error_kind(&self) -> Option<ErrorCode> {
        ErrorCode::from_i32(self.error_code)
    }

    /// Human-readable failure description (empty on success)
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Absolute paths touched, in order
    pub fn affected_files(&self) -> &IndexSet<PathBuf> {
        &self.affected_files
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use dotlayer_core::path::AbsPath;

    #[test]
    fn test_success_has_zero_code() {
        let result = HookResult::from_outcome(Ok(Effect::touched("/home/user/.gitconfig")));
        assert!(result.is_success());
        assert_eq!(result.error_code(), 0);
        assert_eq!(result.error_kind(), Some(ErrorCode::Ok));
        assert!(result.error_message().is_empty());
        assert_eq!(result.affected_files().len(), 1);
    }

    #[test]
    fn test_failure_never_reports_ok() {
        let result = HookResult::failure(ErrorCode::Ok, "broken");
        assert!(!result.is_success());
        assert_eq!(result.error_code(), ErrorCode::Generic.as_i32());

        let result = HookResult::exit_failure(0, "broken");
        assert_ne!(result.error_code(), 0);
    }

    #[test]
    fn test_from_error_uses_taxonomy() {
        let err = Error::StrategyNotFound {
            name: "unknown".into(),
        };
        let result = HookResult::from_outcome(Err(err));
        assert!(!result.is_success());
        assert_eq!(result.error_kind(), Some(ErrorCode::NotFound));
        assert!(result.error_message().contains("unknown"));
        assert!(result.affected_files().is_empty());
    }

    #[test]
    fn test_from_error_keeps_script_exit_code() {
        let err = Error::ScriptFailed {
            path: AbsPath::new("/dotfiles/tools/nvim/merge.sh".into()).unwrap(),
            exit_code: 42,
        };
        let result = HookResult::from_error(&err);
        assert_eq!(result.error_code(), 42);
        assert!(result.error_message().contains("42"));
        assert_eq!(result.error_kind(), None);
    }

    #[test]
    fn test_effect_collapses_duplicates() {
        let effect = Effect::touched("/a").and("/b").and("/a");
        let paths: Vec<_> = effect.affected().iter().cloned().collect();
        assert_eq!(paths, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        assert!(Effect::none().affected().is_empty());
    }
}
