//! # dotlayer engine
//!
//! Executor for the dotlayer dotfiles manager.
//!
//! This crate turns a loaded [`ToolConfig`](dotlayer_config::ToolConfig)
//! into files on disk:
//!
//! - **System Abstraction**: Filesystem and process operations behind a
//!   trait, with an in-memory mock for tests
//! - **Strategies**: Builtin merge strategies (symlink, concat, source,
//!   json-merge, skip) and user script strategies
//! - **Registry**: Per-runner name → strategy map
//! - **Hook Runner**: Environment construction, isolated script execution,
//!   and the [`HookResult`] contract
//! - **Backup**: Snapshot and restore of a target around a merge

pub mod apply;
pub mod backup;
pub mod environment;
pub mod error;
pub mod registry;
pub mod result;
pub mod runner;
pub mod script;
pub mod strategy;
pub mod system;

// Re-export path types from core
pub use dotlayer_core::path::AbsPath;

pub use error::{Error, Result};

// Re-export commonly used types
pub use apply::{ApplyReport, apply_tool};
pub use backup::{BackupGuard, BackupKind};
pub use environment::ExecutionEnvironment;
pub use registry::StrategyRegistry;
pub use result::{Effect, HookResult};
pub use runner::HookRunner;
pub use strategy::{MergeStrategy, ScriptStrategy, StrategyContext};
pub use system::{MockSystem, Operation, RealSystem, ScriptInvocation, System};
