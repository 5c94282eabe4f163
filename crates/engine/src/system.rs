//! System abstraction for filesystem and process operations
//!
//! Strategies and the hook runner never touch `std::fs` directly; they go
//! through [`System`], which has two backends:
//! - [`RealSystem`]: actual filesystem operations and real child processes
//! - [`MockSystem`]: an in-memory tree that logs every mutation and simulates
//!   script execution without spawning anything
//!
//! The backend is picked once, when the runner is constructed.

use crate::error::{Error, Result};
use dotlayer_core::path::{AbsPath, normalize};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Everything needed to launch a hook script
///
/// The environment is complete: the child starts from an empty environment
/// and receives exactly these variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptInvocation {
    /// Script to execute
    pub program: AbsPath,
    /// Arguments after the program
    pub args: Vec<String>,
    /// Working directory of the child
    pub working_dir: AbsPath,
    /// Full environment of the child
    pub env: IndexMap<String, String>,
}

/// Abstraction over filesystem and process operations
pub trait System {
    /// Check if a path exists (follows symlinks)
    fn exists(&self, path: &AbsPath) -> bool;

    /// Check if a path is a regular file (follows symlinks)
    fn is_file(&self, path: &AbsPath) -> bool;

    /// Check if a path is a directory (follows symlinks)
    fn is_dir(&self, path: &AbsPath) -> bool;

    /// Check if a path is itself a symlink, dangling or not
    fn is_symlink(&self, path: &AbsPath) -> bool;

    /// Read a file's contents
    fn read_file(&self, path: &AbsPath) -> Result<Vec<u8>>;

    /// Write a file's contents, creating parent directories
    fn write_file(&self, path: &AbsPath, content: &[u8]) -> Result<()>;

    /// Append to a file, creating it (and its parents) if needed
    fn append_file(&self, path: &AbsPath, content: &[u8]) -> Result<()>;

    /// Copy a regular file, creating the destination's parent directories
    fn copy(&self, from: &AbsPath, to: &AbsPath) -> Result<()>;

    /// Remove a file, a symlink, or an empty directory
    fn remove(&self, path: &AbsPath) -> Result<()>;

    /// Remove a directory and all its contents
    fn remove_all(&self, path: &AbsPath) -> Result<()>;

    /// Create a directory and all missing parents
    fn create_dir_all(&self, path: &AbsPath) -> Result<()>;

    /// Create a symbolic link at `link` pointing to `target`
    fn symlink(&self, target: &Path, link: &AbsPath) -> Result<()>;

    /// Read a symbolic link
    fn read_link(&self, path: &AbsPath) -> Result<PathBuf>;

    /// List the entries of a directory, sorted
    fn list_dir(&self, path: &AbsPath) -> Result<Vec<AbsPath>>;

    /// Check whether any execute bit is set
    fn is_executable(&self, path: &AbsPath) -> bool;

    /// Add the execute bits to a file
    fn set_executable(&self, path: &AbsPath) -> Result<()>;

    /// Run a script to completion and return its exit status
    fn spawn(&self, invocation: &ScriptInvocation) -> Result<i32>;
}

/// Real filesystem implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct RealSystem;

impl RealSystem {
    fn ensure_parent(&self, path: &AbsPath) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.create_dir_all(&parent)?;
        }
        Ok(())
    }
}

impl System for RealSystem {
    fn exists(&self, path: &AbsPath) -> bool {
        path.as_path().exists()
    }

    fn is_file(&self, path: &AbsPath) -> bool {
        path.as_path().is_file()
    }

    fn is_dir(&self, path: &AbsPath) -> bool {
        path.as_path().is_dir()
    }

    fn is_symlink(&self, path: &AbsPath) -> bool {
        path.as_path().is_symlink()
    }

    fn read_file(&self, path: &AbsPath) -> Result<Vec<u8>> {
        fs::read(path.as_path()).map_err(|e| Error::FileRead {
            path: path.clone(),
            source: e,
        })
    }

    fn write_file(&self, path: &AbsPath, content: &[u8]) -> Result<()> {
        self.ensure_parent(path)?;
        fs::write(path.as_path(), content).map_err(|e| Error::FileWrite {
            path: path.clone(),
            source: e,
        })
    }

    fn append_file(&self, path: &AbsPath, content: &[u8]) -> Result<()> {
        self.ensure_parent(path)?;
        let to_write_err = |e| Error::FileWrite {
            path: path.clone(),
            source: e,
        };
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_path())
            .map_err(to_write_err)?;
        file.write_all(content).map_err(to_write_err)
    }

    fn copy(&self, from: &AbsPath, to: &AbsPath) -> Result<()> {
        self.ensure_parent(to)?;
        fs::copy(from.as_path(), to.as_path())
            .map(|_| ())
            .map_err(|e| Error::Copy {
                from: from.clone(),
                to: to.clone(),
                source: e,
            })
    }

    fn remove(&self, path: &AbsPath) -> Result<()> {
        let to_remove_err = |e| Error::Remove {
            path: path.clone(),
            source: e,
        };
        // symlink_metadata so a link to a directory is unlinked, not descended into
        let metadata = fs::symlink_metadata(path.as_path()).map_err(to_remove_err)?;
        if metadata.is_dir() {
            fs::remove_dir(path.as_path()).map_err(to_remove_err)
        } else {
            fs::remove_file(path.as_path()).map_err(to_remove_err)
        }
    }

    fn remove_all(&self, path: &AbsPath) -> Result<()> {
        fs::remove_dir_all(path.as_path()).map_err(|e| Error::Remove {
            path: path.clone(),
            source: e,
        })
    }

    fn create_dir_all(&self, path: &AbsPath) -> Result<()> {
        fs::create_dir_all(path.as_path()).map_err(|e| Error::DirectoryCreate {
            path: path.clone(),
            source: e,
        })
    }

    fn symlink(&self, target: &Path, link: &AbsPath) -> Result<()> {
        let to_symlink_err = |e| Error::Symlink {
            link: link.clone(),
            target: target.to_path_buf(),
            source: e,
        };

        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(target, link.as_path()).map_err(to_symlink_err)
        }

        #[cfg(windows)]
        {
            if target.is_dir() {
                std::os::windows::fs::symlink_dir(target, link.as_path()).map_err(to_symlink_err)
            } else {
                std::os::windows::fs::symlink_file(target, link.as_path()).map_err(to_symlink_err)
            }
        }
    }

    fn read_link(&self, path: &AbsPath) -> Result<PathBuf> {
        fs::read_link(path.as_path()).map_err(|e| Error::Symlink {
            link: path.clone(),
            target: PathBuf::new(),
            source: e,
        })
    }

    fn list_dir(&self, path: &AbsPath) -> Result<Vec<AbsPath>> {
        let to_read_err = |e| Error::DirectoryRead {
            path: path.clone(),
            source: e,
        };
        let mut entries = Vec::new();
        for entry in fs::read_dir(path.as_path()).map_err(to_read_err)? {
            let entry = entry.map_err(to_read_err)?;
            entries.push(path.join(entry.file_name()));
        }
        entries.sort();
        Ok(entries)
    }

    fn is_executable(&self, path: &AbsPath) -> bool {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::metadata(path.as_path()).is_ok_and(|m| m.permissions().mode() & 0o111 != 0)
        }

        #[cfg(not(unix))]
        {
            path.as_path().is_file()
        }
    }

    fn set_executable(&self, path: &AbsPath) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let to_perm_err = |e| Error::Permissions {
                path: path.clone(),
                source: e,
            };
            let mut permissions = fs::metadata(path.as_path())
                .map_err(to_perm_err)?
                .permissions();
            permissions.set_mode(permissions.mode() | 0o111);
            fs::set_permissions(path.as_path(), permissions).map_err(to_perm_err)
        }

        #[cfg(not(unix))]
        {
            let _ = path;
            Ok(())
        }
    }

    #[tracing::instrument(skip(self, invocation), fields(program = %invocation.program))]
    fn spawn(&self, invocation: &ScriptInvocation) -> Result<i32> {
        tracing::debug!("Working directory: {}", invocation.working_dir);

        // full_env: the child inherits nothing we did not put in the map
        let output = duct::cmd(invocation.program.as_path(), &invocation.args)
            .dir(invocation.working_dir.as_path())
            .full_env(&invocation.env)
            .unchecked()
            .run()
            .map_err(|e| Error::Spawn {
                program: invocation.program.clone(),
                source: e,
            })?;

        Ok(exit_status_code(output.status))
    }
}

/// Exit code of a finished child, with signals reported shell-style (128 + n)
fn exit_status_code(status: std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}

/// A node of the in-memory tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockNode {
    /// Regular file
    File {
        /// File contents
        content: Vec<u8>,
        /// Whether the execute bits are set
        executable: bool,
    },
    /// Directory
    Dir,
    /// Symbolic link
    Symlink(PathBuf),
}

/// A mutation (or spawn) performed against [`MockSystem`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// File written
    WriteFile { path: AbsPath, size: usize },
    /// File appended to
    AppendFile { path: AbsPath, size: usize },
    /// File copied
    Copy { from: AbsPath, to: AbsPath },
    /// Directory created
    CreateDir { path: AbsPath },
    /// Path removed (recursively or not)
    Remove { path: AbsPath },
    /// Symlink created
    Symlink { link: AbsPath, target: PathBuf },
    /// Execute bit set
    SetExecutable { path: AbsPath },
    /// Script "run"
    Spawn { invocation: ScriptInvocation },
}

/// Symlink hops followed before giving up on a loop
const MAX_LINK_DEPTH: usize = 32;

/// In-memory filesystem for tests
///
/// Paths are stored normalized. `/` always exists. Seeding helpers
/// ([`MockSystem::with_file`] and friends) are not recorded; every trait
/// mutation is, and [`MockSystem::operations`] returns them in order.
///
/// `spawn` never starts a process. It records the invocation and reports
/// exit status 0, or whatever [`MockSystem::with_exit_code`] configured for
/// that program.
#[derive(Debug, Default)]
pub struct MockSystem {
    nodes: RefCell<BTreeMap<PathBuf, MockNode>>,
    operations: RefCell<Vec<Operation>>,
    exit_codes: RefCell<HashMap<PathBuf, i32>>,
}

impl MockSystem {
    /// Create an empty mock filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file (parents are created)
    #[must_use]
    pub fn with_file(self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> Self {
        let path = normalize(path.as_ref());
        self.seed_parents(&path);
        self.nodes.borrow_mut().insert(
            path,
            MockNode::File {
                content: content.as_ref().to_vec(),
                executable: false,
            },
        );
        self
    }

    /// Seed an executable file
    #[must_use]
    pub fn with_executable(self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> Self {
        let path = normalize(path.as_ref());
        self.seed_parents(&path);
        self.nodes.borrow_mut().insert(
            path,
            MockNode::File {
                content: content.as_ref().to_vec(),
                executable: true,
            },
        );
        self
    }

    /// Seed a directory (and its parents)
    #[must_use]
    pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
        let path = normalize(path.as_ref());
        self.seed_parents(&path);
        self.nodes.borrow_mut().insert(path, MockNode::Dir);
        self
    }

    /// Seed a symlink
    #[must_use]
    pub fn with_symlink(self, link: impl AsRef<Path>, target: impl Into<PathBuf>) -> Self {
        let link = normalize(link.as_ref());
        self.seed_parents(&link);
        self.nodes
            .borrow_mut()
            .insert(link, MockNode::Symlink(target.into()));
        self
    }

    /// Make `spawn` of `program` report `code`
    #[must_use]
    pub fn with_exit_code(self, program: impl AsRef<Path>, code: i32) -> Self {
        self.exit_codes
            .borrow_mut()
            .insert(normalize(program.as_ref()), code);
        self
    }

    /// Operations performed so far, in order
    pub fn operations(&self) -> Vec<Operation> {
        self.operations.borrow().clone()
    }

    /// Forget recorded operations (the tree is kept)
    pub fn clear_operations(&self) {
        self.operations.borrow_mut().clear();
    }

    /// Node stored at exactly this path (symlinks are not followed)
    pub fn node(&self, path: impl AsRef<Path>) -> Option<MockNode> {
        self.nodes.borrow().get(&normalize(path.as_ref())).cloned()
    }

    /// Contents of a file as UTF-8, following symlinks
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let resolved = self.resolve(&normalize(path.as_ref()))?;
        match self.nodes.borrow().get(&resolved) {
            Some(MockNode::File { content, .. }) => String::from_utf8(content.clone()).ok(),
            _ => None,
        }
    }

    fn record(&self, op: Operation) {
        self.operations.borrow_mut().push(op);
    }

    fn seed_parents(&self, path: &Path) {
        let mut nodes = self.nodes.borrow_mut();
        for ancestor in path.ancestors().skip(1) {
            if ancestor.parent().is_none() {
                break;
            }
            nodes
                .entry(ancestor.to_path_buf())
                .or_insert(MockNode::Dir);
        }
    }

    /// Follow symlinks until a non-link node (or a missing path) is reached
    fn resolve(&self, path: &Path) -> Option<PathBuf> {
        let nodes = self.nodes.borrow();
        let mut current = path.to_path_buf();
        for _ in 0..MAX_LINK_DEPTH {
            match nodes.get(&current) {
                Some(MockNode::Symlink(target)) => {
                    let next = if target.is_absolute() {
                        target.clone()
                    } else {
                        current.parent().unwrap_or(Path::new("/")).join(target)
                    };
                    current = normalize(&next);
                }
                _ => return Some(current),
            }
        }
        None
    }

    fn resolved_node(&self, path: &AbsPath) -> Option<MockNode> {
        let resolved = self.resolve(path.as_path())?;
        if resolved.parent().is_none() {
            return Some(MockNode::Dir);
        }
        self.nodes.borrow().get(&resolved).cloned()
    }

    fn parent_is_dir(&self, path: &Path) -> bool {
        match path.parent() {
            None => true,
            Some(parent) if parent.parent().is_none() => true,
            Some(parent) => matches!(
                self.resolve(parent)
                    .and_then(|p| self.nodes.borrow().get(&p).cloned()),
                Some(MockNode::Dir)
            ),
        }
    }

    fn has_children(&self, path: &Path) -> bool {
        self.nodes
            .borrow()
            .keys()
            .any(|k| k.parent() == Some(path))
    }

    fn io_error(kind: std::io::ErrorKind, msg: &str) -> std::io::Error {
        std::io::Error::new(kind, format!("mock: {msg}"))
    }

    /// Write through symlinks to the final file, like the real filesystem
    fn store_file(&self, path: &AbsPath, content: Vec<u8>) -> std::io::Result<()> {
        let resolved = self
            .resolve(path.as_path())
            .ok_or_else(|| Self::io_error(std::io::ErrorKind::Other, "symlink loop"))?;
        let executable = match self.nodes.borrow().get(&resolved) {
            Some(MockNode::Dir) => {
                return Err(Self::io_error(
                    std::io::ErrorKind::IsADirectory,
                    "is a directory",
                ));
            }
            Some(MockNode::File { executable, .. }) => *executable,
            _ => false,
        };
        self.seed_parents(&resolved);
        self.nodes
            .borrow_mut()
            .insert(resolved, MockNode::File { content, executable });
        Ok(())
    }
}

impl System for MockSystem {
    fn exists(&self, path: &AbsPath) -> bool {
        self.resolved_node(path).is_some()
    }

    fn is_file(&self, path: &AbsPath) -> bool {
        matches!(self.resolved_node(path), Some(MockNode::File { .. }))
    }

    fn is_dir(&self, path: &AbsPath) -> bool {
        matches!(self.resolved_node(path), Some(MockNode::Dir))
    }

    fn is_symlink(&self, path: &AbsPath) -> bool {
        matches!(self.node(path.as_path()), Some(MockNode::Symlink(_)))
    }

    fn read_file(&self, path: &AbsPath) -> Result<Vec<u8>> {
        match self.resolved_node(path) {
            Some(MockNode::File { content, .. }) => Ok(content),
            Some(_) => Err(Error::FileRead {
                path: path.clone(),
                source: Self::io_error(std::io::ErrorKind::IsADirectory, "not a file"),
            }),
            None => Err(Error::FileRead {
                path: path.clone(),
                source: Self::io_error(std::io::ErrorKind::NotFound, "no such file"),
            }),
        }
    }

    fn write_file(&self, path: &AbsPath, content: &[u8]) -> Result<()> {
        self.store_file(path, content.to_vec())
            .map_err(|e| Error::FileWrite {
                path: path.clone(),
                source: e,
            })?;
        self.record(Operation::WriteFile {
            path: path.clone(),
            size: content.len(),
        });
        Ok(())
    }

    fn append_file(&self, path: &AbsPath, content: &[u8]) -> Result<()> {
        let mut existing = match self.resolved_node(path) {
            Some(MockNode::File { content, .. }) => content,
            _ => Vec::new(),
        };
        existing.extend_from_slice(content);
        self.store_file(path, existing)
            .map_err(|e| Error::FileWrite {
                path: path.clone(),
                source: e,
            })?;
        self.record(Operation::AppendFile {
            path: path.clone(),
            size: content.len(),
        });
        Ok(())
    }

    fn copy(&self, from: &AbsPath, to: &AbsPath) -> Result<()> {
        let content = match self.resolved_node(from) {
            Some(MockNode::File { content, .. }) => content,
            _ => {
                return Err(Error::Copy {
                    from: from.clone(),
                    to: to.clone(),
                    source: Self::io_error(std::io::ErrorKind::NotFound, "no such file"),
                });
            }
        };
        self.store_file(to, content).map_err(|e| Error::Copy {
            from: from.clone(),
            to: to.clone(),
            source: e,
        })?;
        self.record(Operation::Copy {
            from: from.clone(),
            to: to.clone(),
        });
        Ok(())
    }

    fn remove(&self, path: &AbsPath) -> Result<()> {
        let key = path.as_path().to_path_buf();
        let to_remove_err = |kind, msg| Error::Remove {
            path: path.clone(),
            source: Self::io_error(kind, msg),
        };
        match self.node(&key) {
            None => return Err(to_remove_err(std::io::ErrorKind::NotFound, "no such path")),
            Some(MockNode::Dir) if self.has_children(&key) => {
                return Err(to_remove_err(
                    std::io::ErrorKind::DirectoryNotEmpty,
                    "directory not empty",
                ));
            }
            Some(_) => {}
        }
        self.nodes.borrow_mut().remove(&key);
        self.record(Operation::Remove { path: path.clone() });
        Ok(())
    }

    fn remove_all(&self, path: &AbsPath) -> Result<()> {
        let key = path.as_path().to_path_buf();
        if self.node(&key).is_none() {
            return Err(Error::Remove {
                path: path.clone(),
                source: Self::io_error(std::io::ErrorKind::NotFound, "no such path"),
            });
        }
        self.nodes
            .borrow_mut()
            .retain(|k, _| k != &key && !k.starts_with(&key));
        self.record(Operation::Remove { path: path.clone() });
        Ok(())
    }

    fn create_dir_all(&self, path: &AbsPath) -> Result<()> {
        if self.is_dir(path) {
            return Ok(());
        }
        if self.exists(path) {
            return Err(Error::DirectoryCreate {
                path: path.clone(),
                source: Self::io_error(std::io::ErrorKind::AlreadyExists, "file exists"),
            });
        }
        self.seed_parents(path.as_path());
        self.nodes
            .borrow_mut()
            .insert(path.as_path().to_path_buf(), MockNode::Dir);
        self.record(Operation::CreateDir { path: path.clone() });
        Ok(())
    }

    fn symlink(&self, target: &Path, link: &AbsPath) -> Result<()> {
        let to_symlink_err = |kind, msg| Error::Symlink {
            link: link.clone(),
            target: target.to_path_buf(),
            source: Self::io_error(kind, msg),
        };
        if self.node(link.as_path()).is_some() {
            return Err(to_symlink_err(std::io::ErrorKind::AlreadyExists, "file exists"));
        }
        if !self.parent_is_dir(link.as_path()) {
            return Err(to_symlink_err(
                std::io::ErrorKind::NotFound,
                "parent directory missing",
            ));
        }
        self.nodes.borrow_mut().insert(
            link.as_path().to_path_buf(),
            MockNode::Symlink(target.to_path_buf()),
        );
        self.record(Operation::Symlink {
            link: link.clone(),
            target: target.to_path_buf(),
        });
        Ok(())
    }

    fn read_link(&self, path: &AbsPath) -> Result<PathBuf> {
        match self.node(path.as_path()) {
            Some(MockNode::Symlink(target)) => Ok(target),
            _ => Err(Error::Symlink {
                link: path.clone(),
                target: PathBuf::new(),
                source: Self::io_error(std::io::ErrorKind::InvalidInput, "not a symlink"),
            }),
        }
    }

    fn list_dir(&self, path: &AbsPath) -> Result<Vec<AbsPath>> {
        if !self.is_dir(path) {
            return Err(Error::DirectoryRead {
                path: path.clone(),
                source: Self::io_error(std::io::ErrorKind::NotFound, "not a directory"),
            });
        }
        let dir = self
            .resolve(path.as_path())
            .unwrap_or_else(|| path.as_path().to_path_buf());
        let entries = self
            .nodes
            .borrow()
            .keys()
            .filter(|k| k.parent() == Some(dir.as_path()))
            .filter_map(|k| k.file_name().map(|name| path.join(name)))
            .collect();
        // BTreeMap keys are already sorted
        Ok(entries)
    }

    fn is_executable(&self, path: &AbsPath) -> bool {
        matches!(
            self.resolved_node(path),
            Some(MockNode::File {
                executable: true,
                ..
            })
        )
    }

    fn set_executable(&self, path: &AbsPath) -> Result<()> {
        let resolved = self.resolve(path.as_path());
        let mut nodes = self.nodes.borrow_mut();
        match resolved.as_ref().and_then(|p| nodes.get_mut(p)) {
            Some(MockNode::File { executable, .. }) => *executable = true,
            _ => {
                return Err(Error::Permissions {
                    path: path.clone(),
                    source: Self::io_error(std::io::ErrorKind::NotFound, "no such file"),
                });
            }
        }
        drop(nodes);
        self.record(Operation::SetExecutable { path: path.clone() });
        Ok(())
    }

    fn spawn(&self, invocation: &ScriptInvocation) -> Result<i32> {
        if !self.is_file(&invocation.program) {
            return Err(Error::Spawn {
                program: invocation.program.clone(),
                source: Self::io_error(std::io::ErrorKind::NotFound, "no such file"),
            });
        }
        self.record(Operation::Spawn {
            invocation: invocation.clone(),
        });
        let code = self
            .exit_codes
            .borrow()
            .get(invocation.program.as_path())
            .copied()
            .unwrap_or(0);
        tracing::debug!(program = %invocation.program, code, "Simulated script run");
        Ok(code)
    }
}
