//! Directory utilities
//!
//! - The dotfiles directory comes from `$DOTLAYER_DIR`, falling back to
//!   `~/.dotfiles`
//! - Backups live under `$XDG_STATE_HOME/dotlayer` (via the `xdg` crate),
//!   defaulting to `~/.local/state/dotlayer`

use std::path::PathBuf;
use xdg::BaseDirectories;

/// Environment variable that overrides the dotfiles directory
pub const DOTFILES_DIR_ENV: &str = "DOTLAYER_DIR";

/// Get the dotlayer state directory
///
/// Returns `$XDG_STATE_HOME/dotlayer` or `~/.local/state/dotlayer`
#[must_use]
pub fn state_dir() -> Option<PathBuf> {
    BaseDirectories::with_prefix("dotlayer").get_state_home()
}

/// Get the default backup directory
///
/// Returns `<state_dir>/backups`
#[must_use]
pub fn backup_dir() -> Option<PathBuf> {
    state_dir().map(|d| d.join("backups"))
}

/// Get the default dotfiles directory
///
/// `$DOTLAYER_DIR` wins when set and non-empty; otherwise `~/.dotfiles`.
/// The value is returned unexpanded so a `~` in the variable is expanded by
/// the runner like any other configured path.
#[must_use]
pub fn default_dotfiles_dir() -> Option<String> {
    if let Ok(dir) = std::env::var(DOTFILES_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(dir);
    }

    dirs::home_dir().map(|home| home.join(".dotfiles").display().to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_backup_dir_is_under_state_dir() {
        if let (Some(state), Some(backup)) = (state_dir(), backup_dir()) {
            assert!(backup.starts_with(&state));
            assert!(backup.ends_with("backups"));
            assert!(state.to_string_lossy().contains("dotlayer"));
        }
    }

    #[test]
    #[serial]
    fn test_default_dotfiles_dir_from_env() {
        temp_env::with_var(DOTFILES_DIR_ENV, Some("/srv/dotfiles"), || {
            assert_eq!(default_dotfiles_dir().as_deref(), Some("/srv/dotfiles"));
        });
    }

    #[test]
    #[serial]
    fn test_default_dotfiles_dir_fallback() {
        temp_env::with_var(DOTFILES_DIR_ENV, None::<&str>, || {
            let home = dirs::home_dir().unwrap();
            assert_eq!(
                default_dotfiles_dir(),
                Some(home.join(".dotfiles").display().to_string())
            );
        });
    }

    #[test]
    #[serial]
    fn test_empty_env_is_ignored() {
        temp_env::with_var(DOTFILES_DIR_ENV, Some(""), || {
            let dir = default_dotfiles_dir().unwrap();
            assert!(dir.ends_with(".dotfiles"));
        });
    }
}
