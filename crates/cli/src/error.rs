//! Error types for CLI commands

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during command execution
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// Engine failure (schema, validation, missing file, ...)
    #[error(transparent)]
    Engine(#[from] jconfig_core::Error),

    /// Repo checkout is missing and the schema gives no URL
    #[error("Repo {name} is missing at {} and has no url to clone from", path.display())]
    MissingRepoUrl {
        /// Repo entry name
        name: String,
        /// Expected checkout directory
        path: PathBuf,
    },

    /// Git operation error
    #[error("Failed to clone {url}: {source}")]
    Clone {
        /// Remote URL
        url: String,
        /// Underlying git error
        #[source]
        source: git2::Error,
    },

    /// A repo build command exited unsuccessfully
    #[error("Build command '{command}' failed in {}: {source}", dir.display())]
    BuildFailed {
        /// Shell command line
        command: String,
        /// Working directory
        dir: PathBuf,
        /// Underlying process error
        #[source]
        source: std::io::Error,
    },

    /// A manifest output could not be copied
    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    CopyOutput {
        /// Artifact inside the checkout
        from: PathBuf,
        /// Destination directory
        to: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Terminal interaction failed
    #[error("Failed to read user input: {0}")]
    Input(#[from] dialoguer::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for command operations
pub type Result<T> = std::result::Result<T, CommandError>;
