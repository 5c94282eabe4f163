//! Single-tool apply: backup, merge, restore on failure, install

use crate::backup::BackupGuard;
use crate::result::HookResult;
use crate::runner::HookRunner;
use crate::system::System;
use dotlayer_config::ToolConfig;
use dotlayer_core::ErrorCode;
use dotlayer_core::path::AbsPath;

/// Outcome of applying one tool
#[derive(Debug, Clone)]
pub struct ApplyReport {
    /// Tool name
    pub tool: String,
    /// Merge hook result
    pub merge: HookResult,
    /// Install hook result; `None` when the merge failed and install was skipped
    pub install: Option<HookResult>,
    /// Backup kept on disk, if one was taken
    pub backup: Option<AbsPath>,
    /// Whether the previous target was put back after a failed merge
    pub restored: bool,
}

impl ApplyReport {
    /// Merge and install (if run) both succeeded
    pub fn is_success(&self) -> bool {
        self.merge.is_success() && self.install.as_ref().is_none_or(HookResult::is_success)
    }

    /// First failing result
    pub fn failure(&self) -> Option<&HookResult> {
        if !self.merge.is_success() {
            return Some(&self.merge);
        }
        self.install.as_ref().filter(|r| !r.is_success())
    }
}

/// Apply one tool
///
/// With `backup_root`, the existing target is snapshotted first and put back
/// if the merge fails. The install hook only runs after a successful merge.
#[tracing::instrument(skip_all, fields(tool = %config.tool_name))]
pub fn apply_tool<S: System>(
    runner: &HookRunner<S>,
    config: &ToolConfig,
    backup_root: Option<&AbsPath>,
) -> ApplyReport {
    let mut report = ApplyReport {
        tool: config.tool_name.clone(),
        merge: HookResult::empty_success(),
        install: None,
        backup: None,
        restored: false,
    };

    let guard = match (backup_root, config.target_path()) {
        (Some(root), Ok(target)) => {
            match BackupGuard::create(runner.system(), &config.tool_name, &target, root) {
                Ok(guard) => Some(guard),
                Err(e) => {
                    report.merge = HookResult::from_error(&e);
                    return report;
                }
            }
        }
        _ => None,
    };

    report.merge = runner.run_merge(config);

    if !report.merge.is_success() {
        if let Some(guard) = guard {
            match guard.restore() {
                Ok(()) => report.restored = true,
                Err(e) => {
                    tracing::error!("{e}");
                    let message = format!(
                        "{}; restoring previous target failed: {e}",
                        report.merge.error_message()
                    );
                    report.merge = HookResult::failure(ErrorCode::Backup, message);
                }
            }
        }
        return report;
    }

    report.backup = guard.and_then(BackupGuard::commit);
    report.install = Some(runner.run_install(config));
    report
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::system::{MockSystem, Operation};
    use dotlayer_config::{HookSpec, Layer};

    fn runner(fs: MockSystem) -> HookRunner<MockSystem> {
        HookRunner::new("/dotfiles", fs).unwrap()
    }

    fn ssh(merge: &str) -> ToolConfig {
        ToolConfig::new("ssh", "/home/user/.ssh/config")
            .with_layer(Layer::new("base", "ssh/base").with_resolved("/dotfiles/ssh/base"))
            .with_merge(HookSpec::parse(merge).unwrap())
            .with_install(HookSpec::parse("install.sh").unwrap())
    }

    #[test]
    fn test_success_runs_install_and_keeps_backup() {
        let fs = MockSystem::new()
            .with_file("/dotfiles/ssh/base", "Host *\n")
            .with_file("/home/user/.ssh/config", "old\n")
            .with_executable("/dotfiles/tools/ssh/install.sh", "#!/bin/sh\n");
        let runner = runner(fs);
        let backups = AbsPath::new("/backups".into()).unwrap();

        let report = apply_tool(&runner, &ssh("builtin:concat"), Some(&backups));

        assert!(report.is_success());
        assert!(report.install.as_ref().unwrap().is_success());
        assert_eq!(report.backup, Some(backups.join("ssh/config")));
        assert!(!report.restored);
        assert!(
            runner
                .system()
                .operations()
                .iter()
                .any(|op| matches!(op, Operation::Spawn { .. }))
        );
    }

    #[test]
    fn test_repeated_apply_keeps_original() {
        let fs = MockSystem::new()
            .with_file("/dotfiles/ssh/base", "Host *\n")
            .with_file("/home/user/.ssh/config", "ORIGINAL\n")
            .with_executable("/dotfiles/tools/ssh/install.sh", "#!/bin/sh\n");
        let runner = runner(fs);
        let backups = AbsPath::new("/backups".into()).unwrap();

        let first = apply_tool(&runner, &ssh("builtin:concat"), Some(&backups));
        let second = apply_tool(&runner, &ssh("builtin:concat"), Some(&backups));

        assert!(first.is_success() && second.is_success());
        assert_eq!(first.backup, Some(backups.join("ssh/config")));
        assert_eq!(second.backup, Some(backups.join("ssh/config.1")));
        assert_eq!(
            runner.system().contents("/backups/ssh/config").as_deref(),
            Some("ORIGINAL\n")
        );
        assert_eq!(
            runner.system().contents("/backups/ssh/config.1").as_deref(),
            Some("# --- layer: base ---\nHost *\n")
        );
    }

    #[test]
    fn test_failed_merge_restores_and_skips_install() {
        let fs = MockSystem::new()
            .with_file("/home/user/.ssh/config", "old\n")
            .with_executable("/dotfiles/tools/ssh/install.sh", "#!/bin/sh\n");
        let runner = runner(fs);
        let backups = AbsPath::new("/backups".into()).unwrap();

        // Layer file is missing, so concat fails
        let report = apply_tool(&runner, &ssh("builtin:concat"), Some(&backups));

        assert!(!report.is_success());
        assert!(report.restored);
        assert!(report.install.is_none());
        assert_eq!(
            runner.system().contents("/home/user/.ssh/config").as_deref(),
            Some("old\n")
        );
        assert_eq!(report.failure().unwrap().error_code(), ErrorCode::NotFound.as_i32());
    }

    #[test]
    fn test_without_backup_root() {
        let fs = MockSystem::new()
            .with_file("/dotfiles/ssh/base", "Host *\n")
            .with_executable("/dotfiles/tools/ssh/install.sh", "#!/bin/sh\n");
        let runner = runner(fs);

        let report = apply_tool(&runner, &ssh("builtin:concat"), None);

        assert!(report.is_success());
        assert!(report.backup.is_none());
    }

    #[test]
    fn test_failed_install_is_reported() {
        let fs = MockSystem::new()
            .with_file("/dotfiles/ssh/base", "Host *\n")
            .with_executable("/dotfiles/tools/ssh/install.sh", "#!/bin/sh\nexit 9\n")
            .with_exit_code("/dotfiles/tools/ssh/install.sh", 9);
        let runner = runner(fs);

        let report = apply_tool(&runner, &ssh("builtin:concat"), None);

        assert!(report.merge.is_success());
        assert!(!report.is_success());
        assert_eq!(report.failure().unwrap().error_code(), 9);
    }
}
