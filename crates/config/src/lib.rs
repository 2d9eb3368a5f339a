//! Tool settings for jconfig
//!
//! This crate handles:
//! - Loading `jconfig.toml` settings
//! - Logging initialization

pub mod logging;
pub mod settings;

// Re-export error types from core
pub use jconfig_core::{Error, Result};

// Re-export main types
pub use settings::{OutputSettings, RepoSettings, Settings};
