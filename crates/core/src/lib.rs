//! Core types and utilities for dotlayer
//!
//! This is the foundation crate (Layer 0) that all other dotlayer crates depend on.
//! It provides:
//! - The shared error taxonomy ([`ErrorCode`]) and base error type
//! - Path types (`AbsPath`) and tilde expansion
//! - Platform detection
//!
//! This crate has no dependencies on other dotlayer crates.

pub mod error;
pub mod path;
pub mod platform;

pub use error::{Error, ErrorCode, Result};
