//! Base error types for jconfig
//!
//! Every library crate in the workspace reports failures through [`Error`].
//! Only [`Error::Validation`] is recoverable: a dialog may ask again after it.
//! Everything else aborts processing of the affected subtree.

use std::path::PathBuf;
use thiserror::Error;

/// A raw value that failed an item's format, range, or non-empty rule
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid value for {item}: {reason}")]
pub struct ValidationError {
    /// Name of the item that rejected the value
    pub item: String,
    /// Human readable rule that was violated
    pub reason: String,
}

impl ValidationError {
    /// Create a validation error for `item`
    pub fn new(item: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            reason: reason.into(),
        }
    }
}

/// Base error type for shared functionality
#[derive(Error, Debug)]
pub enum Error {
    /// Schema file or recipe target is missing
    #[error("{} doesn't exist", path.display())]
    FileNotFound { path: PathBuf },

    /// Value rejected by an item
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Repo manifest names a different package than the descriptor
    #[error("Unexpected package name: {found} (expected {expected})")]
    UnexpectedRepoManifest { expected: String, found: String },

    /// Programmer error in a schema, e.g. a forced item without a default
    #[error("Configuration logic error: {0}")]
    ConfigurationLogic(String),

    /// Malformed schema entry
    #[error("Schema error in {}: {message}", path.display())]
    Schema { path: PathBuf, message: String },

    /// A generation expression could not convert the item's value
    #[error("Cannot apply {conversion} to {item} (value '{value}')")]
    Conversion {
        item: String,
        conversion: String,
        value: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error message
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Whether the caller may retry with different input
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Create a `FileNotFound` error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
