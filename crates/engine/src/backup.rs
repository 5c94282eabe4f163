//! Backup of a target before a merge replaces it
//!
//! [`BackupGuard::create`] snapshots whatever sits at the target (file,
//! directory, or symlink) into `<backup_root>/<tool>/<file name>`, or
//! `<file name>.<n>` with the lowest free `n` when earlier snapshots exist.
//! An existing snapshot is never overwritten, so the first one taken keeps
//! the target as it was before dotlayer ever managed it. After the
//! merge, the caller either keeps the snapshot ([`BackupGuard::commit`]),
//! puts it back ([`BackupGuard::restore`]), or throws it away
//! ([`BackupGuard::discard`]).

use crate::error::{Error, Result};
use crate::system::System;
use dotlayer_core::path::AbsPath;

/// What was at the target when the guard was created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupKind {
    /// Nothing; restoring removes whatever the merge created
    Absent,
    /// A regular file
    File,
    /// A directory tree
    Dir,
    /// A symlink (copied as a link, never followed)
    Symlink,
}

/// Scoped snapshot of a target
#[must_use = "a backup guard should be committed, restored or discarded"]
pub struct BackupGuard<'a> {
    system: &'a dyn System,
    target: AbsPath,
    backup: AbsPath,
    kind: BackupKind,
}

impl std::fmt::Debug for BackupGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupGuard")
            .field("target", &self.target)
            .field("backup", &self.backup)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<'a> BackupGuard<'a> {
    /// Snapshot `target` for `tool` under `backup_root`
    ///
    /// Earlier backups of the same target are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backup`] if the target has no file name, no free
    /// backup slot remains, or the copy fails.
    #[tracing::instrument(skip(system, target, backup_root), fields(target = %target))]
    pub fn create(
        system: &'a dyn System,
        tool: &str,
        target: &AbsPath,
        backup_root: &AbsPath,
    ) -> Result<Self> {
        let Some(file_name) = target.file_name() else {
            return Err(Error::Backup(format!("cannot back up {target}: no file name")));
        };
        let backup = free_slot(system, &backup_root.join(tool), file_name)
            .ok_or_else(|| Error::Backup(format!("no free backup slot for {target}")))?;
        let kind = kind_of(system, target);

        let guard = Self {
            system,
            target: target.clone(),
            backup,
            kind,
        };
        if kind == BackupKind::Absent {
            tracing::debug!("Nothing to back up");
            return Ok(guard);
        }

        snapshot(system, kind, target, &guard.backup).map_err(|e| guard.failed("create", &e))?;
        tracing::info!(backup = %guard.backup, "Backed up existing target");
        Ok(guard)
    }

    /// What the snapshot holds
    pub fn kind(&self) -> BackupKind {
        self.kind
    }

    /// Target being protected
    pub fn target(&self) -> &AbsPath {
        &self.target
    }

    /// Where the snapshot lives (nothing is there for [`BackupKind::Absent`])
    pub fn backup_path(&self) -> &AbsPath {
        &self.backup
    }

    /// Put the snapshot back at the target
    ///
    /// Whatever the merge left at the target is removed first. For an absent
    /// snapshot that is the whole restore.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BackupNotFound`] if the snapshot disappeared, or
    /// [`Error::Backup`] if the filesystem operations fail.
    #[tracing::instrument(skip(self), fields(target = %self.target))]
    pub fn restore(self) -> Result<()> {
        if self.kind != BackupKind::Absent
            && !self.system.exists(&self.backup)
            && !self.system.is_symlink(&self.backup)
        {
            return Err(Error::BackupNotFound { path: self.backup });
        }

        self.clear(&self.target)
            .map_err(|e| self.failed("restore", &e))?;
        if self.kind != BackupKind::Absent {
            snapshot(self.system, self.kind, &self.backup, &self.target)
                .map_err(|e| self.failed("restore", &e))?;
        }

        tracing::info!("Restored target from backup");
        Ok(())
    }

    /// Keep the snapshot on disk and return its location
    pub fn commit(self) -> Option<AbsPath> {
        (self.kind != BackupKind::Absent).then_some(self.backup)
    }

    /// Delete the snapshot
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backup`] if the snapshot cannot be removed.
    pub fn discard(self) -> Result<()> {
        self.clear(&self.backup)
            .map_err(|e| self.failed("discard", &e))
    }

    /// Remove whatever is at `path`
    fn clear(&self, path: &AbsPath) -> Result<()> {
        match kind_of(self.system, path) {
            BackupKind::Absent => Ok(()),
            BackupKind::Dir => self.system.remove_all(path),
            BackupKind::File | BackupKind::Symlink => self.system.remove(path),
        }
    }

    fn failed(&self, step: &str, err: &Error) -> Error {
        Error::Backup(format!("{step} for {} failed: {err}", self.target))
    }
}

/// First unused `<dir>/<name>`, `<dir>/<name>.1`, `<dir>/<name>.2`, ...
fn free_slot(system: &dyn System, dir: &AbsPath, name: &str) -> Option<AbsPath> {
    let first = dir.join(name);
    if kind_of(system, &first) == BackupKind::Absent {
        return Some(first);
    }
    (1..=u32::MAX)
        .map(|n| dir.join(format!("{name}.{n}")))
        .find(|slot| kind_of(system, slot) == BackupKind::Absent)
}

fn kind_of(system: &dyn System, path: &AbsPath) -> BackupKind {
    if system.is_symlink(path) {
        BackupKind::Symlink
    } else if system.is_dir(path) {
        BackupKind::Dir
    } else if system.exists(path) {
        BackupKind::File
    } else {
        BackupKind::Absent
    }
}

fn snapshot(system: &dyn System, kind: BackupKind, from: &AbsPath, to: &AbsPath) -> Result<()> {
    if let Some(parent) = to.parent() {
        system.create_dir_all(&parent)?;
    }
    match kind {
        BackupKind::Absent => Ok(()),
        BackupKind::File => system.copy(from, to),
        BackupKind::Symlink => system.symlink(&system.read_link(from)?, to),
        BackupKind::Dir => copy_tree(system, from, to),
    }
}

fn copy_tree(system: &dyn System, from: &AbsPath, to: &AbsPath) -> Result<()> {
    system.create_dir_all(to)?;
    for entry in system.list_dir(from)? {
        let Some(name) = entry.file_name() else {
            continue;
        };
        let dest = to.join(name);
        match kind_of(system, &entry) {
            BackupKind::Symlink => system.symlink(&system.read_link(&entry)?, &dest)?,
            BackupKind::Dir => copy_tree(system, &entry, &dest)?,
            BackupKind::File => system.copy(&entry, &dest)?,
            BackupKind::Absent => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::system::{MockNode, MockSystem, RealSystem};
    use dotlayer_core::ErrorCode;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn abs(p: &str) -> AbsPath {
        AbsPath::new(p.into()).unwrap()
    }

    #[test]
    fn test_file_backup_and_restore() {
        let fs = MockSystem::new().with_file("/home/user/.gitconfig", "original");
        let target = abs("/home/user/.gitconfig");

        let guard = BackupGuard::create(&fs, "git", &target, &abs("/backups")).unwrap();
        assert_eq!(guard.kind(), BackupKind::File);
        assert_eq!(fs.contents("/backups/git/.gitconfig").as_deref(), Some("original"));

        fs.write_file(&target, b"merged").unwrap();
        guard.restore().unwrap();

        assert_eq!(fs.contents("/home/user/.gitconfig").as_deref(), Some("original"));
    }

    #[test]
    fn test_symlink_backed_up_as_link() {
        let fs = MockSystem::new()
            .with_dir("/home/user")
            .with_symlink("/home/user/.vimrc", "/old/vimrc");
        let target = abs("/home/user/.vimrc");

        let guard = BackupGuard::create(&fs, "vim", &target, &abs("/backups")).unwrap();
        assert_eq!(
            fs.node("/backups/vim/.vimrc"),
            Some(MockNode::Symlink(PathBuf::from("/old/vimrc")))
        );

        fs.remove(&target).unwrap();
        guard.restore().unwrap();
        assert_eq!(
            fs.node("/home/user/.vimrc"),
            Some(MockNode::Symlink(PathBuf::from("/old/vimrc")))
        );
    }

    #[test]
    fn test_directory_backup() {
        let fs = MockSystem::new()
            .with_file("/home/user/.config/nvim/init.lua", "a")
            .with_file("/home/user/.config/nvim/lua/plugins.lua", "b");
        let target = abs("/home/user/.config/nvim");

        let guard = BackupGuard::create(&fs, "nvim", &target, &abs("/backups")).unwrap();
        assert_eq!(guard.kind(), BackupKind::Dir);
        assert_eq!(fs.contents("/backups/nvim/nvim/lua/plugins.lua").as_deref(), Some("b"));

        fs.remove_all(&target).unwrap();
        guard.restore().unwrap();
        assert_eq!(fs.contents("/home/user/.config/nvim/init.lua").as_deref(), Some("a"));
    }

    #[test]
    fn test_absent_target_restore_removes_new_file() {
        let fs = MockSystem::new().with_dir("/home/user");
        let target = abs("/home/user/.tmux.conf");

        let guard = BackupGuard::create(&fs, "tmux", &target, &abs("/backups")).unwrap();
        assert_eq!(guard.kind(), BackupKind::Absent);

        fs.write_file(&target, b"partial").unwrap();
        guard.restore().unwrap();
        assert!(!fs.exists(&target));
    }

    #[test]
    fn test_commit_keeps_backup() {
        let fs = MockSystem::new().with_file("/home/user/.zshrc", "x");
        let guard = BackupGuard::create(&fs, "zsh", &abs("/home/user/.zshrc"), &abs("/b")).unwrap();
        assert_eq!(guard.commit(), Some(abs("/b/zsh/.zshrc")));
        assert!(fs.exists(&abs("/b/zsh/.zshrc")));
    }

    #[test]
    fn test_discard_removes_backup() {
        let fs = MockSystem::new().with_file("/home/user/.zshrc", "x");
        let guard = BackupGuard::create(&fs, "zsh", &abs("/home/user/.zshrc"), &abs("/b")).unwrap();
        guard.discard().unwrap();
        assert!(!fs.exists(&abs("/b/zsh/.zshrc")));
    }

    #[test]
    fn test_earlier_backup_never_overwritten() {
        let fs = MockSystem::new().with_file("/home/user/.zshrc", "original");
        let target = abs("/home/user/.zshrc");

        let first = BackupGuard::create(&fs, "zsh", &target, &abs("/b")).unwrap();
        assert_eq!(first.commit(), Some(abs("/b/zsh/.zshrc")));

        fs.write_file(&target, b"merged once").unwrap();
        let second = BackupGuard::create(&fs, "zsh", &target, &abs("/b")).unwrap();
        assert_eq!(second.backup_path(), &abs("/b/zsh/.zshrc.1"));

        fs.write_file(&target, b"merged twice").unwrap();
        second.restore().unwrap();

        assert_eq!(fs.contents("/home/user/.zshrc").as_deref(), Some("merged once"));
        assert_eq!(fs.contents("/b/zsh/.zshrc").as_deref(), Some("original"));
        assert_eq!(fs.contents("/b/zsh/.zshrc.1").as_deref(), Some("merged once"));
    }

    #[test]
    fn test_discard_leaves_earlier_backups() {
        let fs = MockSystem::new().with_file("/home/user/.zshrc", "original");
        let target = abs("/home/user/.zshrc");

        let _ = BackupGuard::create(&fs, "zsh", &target, &abs("/b")).unwrap().commit();
        BackupGuard::create(&fs, "zsh", &target, &abs("/b"))
            .unwrap()
            .discard()
            .unwrap();

        assert_eq!(fs.contents("/b/zsh/.zshrc").as_deref(), Some("original"));
        assert!(!fs.exists(&abs("/b/zsh/.zshrc.1")));
    }

    #[test]
    fn test_missing_backup_on_restore() {
        let fs = MockSystem::new().with_file("/home/user/.zshrc", "x");
        let guard = BackupGuard::create(&fs, "zsh", &abs("/home/user/.zshrc"), &abs("/b")).unwrap();
        fs.remove(&abs("/b/zsh/.zshrc")).unwrap();

        let err = guard.restore().unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[test]
    fn test_real_filesystem_roundtrip() {
        let temp = TempDir::new().unwrap();
        let root = AbsPath::from_path(temp.path()).unwrap();
        let target = root.join("home/.gitconfig");
        RealSystem.write_file(&target, b"[user]\n").unwrap();

        let guard = BackupGuard::create(&RealSystem, "git", &target, &root.join("backups")).unwrap();
        RealSystem.write_file(&target, b"broken").unwrap();
        guard.restore().unwrap();

        assert_eq!(RealSystem.read_file(&target).unwrap(), b"[user]\n");
    }
}
