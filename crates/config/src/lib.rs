//! Configuration management for dotlayer
//!
//! This crate handles:
//! - Tool configuration (`tools/<tool>/tool.toml`) and layer resolution
//! - Hook specifier parsing
//! - The top-level `dotlayer.toml`
//! - XDG directory management
//! - Logging initialization

pub mod config;
pub mod dirs;
pub mod hook;
pub mod logging;
pub mod tool;

// Re-export error types from core
pub use dotlayer_core::{Error, Result};

// Re-export main types
pub use config::{BackupConfig, Config};
pub use dirs::{backup_dir, default_dotfiles_dir, state_dir};
pub use hook::HookSpec;
pub use tool::{Layer, ToolConfig, discover_tools};
