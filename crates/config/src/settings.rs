//! Settings file handling
//!
//! `jconfig.toml` is optional. Every field has a default, so a missing file
//! and an empty file behave the same.
//!
//! ```toml
//! [output]
//! config = ".config"
//! header = "autogen.h"
//! ledger = "autorecipe.mk"
//!
//! [repos]
//! enabled = true
//! clean_ledger = true
//! ```

use crate::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings file looked up in the working directory
pub const SETTINGS_FILE: &str = "jconfig.toml";

/// Environment variable naming an explicit settings file
pub const SETTINGS_ENV: &str = "JCONFIG_SETTINGS";

/// Output file locations
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Resolved variables, recipe includes, and the `DEF+=` line
    pub config: PathBuf,

    /// Generated C header
    pub header: PathBuf,

    /// Repo ledger file name, created next to the schema that declares repos
    pub ledger: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            config: PathBuf::from(".config"),
            header: PathBuf::from("autogen.h"),
            ledger: "autorecipe.mk".to_string(),
        }
    }
}

/// Repo handling
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RepoSettings {
    /// Clone and build repos declared in schemas
    pub enabled: bool,

    /// Truncate existing ledgers at the start of a run
    pub clean_ledger: bool,
}

impl Default for RepoSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            clean_ledger: true,
        }
    }
}

/// Contents of `jconfig.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `[output]` section
    pub output: OutputSettings,

    /// `[repos]` section
    pub repos: RepoSettings,
}

impl Settings {
    /// Load settings from a file
    ///
    /// Relative output paths are resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or TOML parsing fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            jconfig_core::Error::Message(format!(
                "Failed to read settings file {}: {e}",
                path.display()
            ))
        })?;

        let mut settings = Self::from_toml_str(&content).map_err(|e| {
            jconfig_core::Error::Message(format!("{e} ({})", path.display()))
        })?;

        if let Some(parent) = path.parent() {
            settings.resolve_relative_paths(parent);
        }
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Parse settings from TOML text without resolving paths
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            jconfig_core::Error::Message(format!("Failed to parse settings TOML: {e}"))
        })
    }

    /// Find and load the settings for a run
    ///
    /// An explicit path must exist. Otherwise `jconfig.toml` in `cwd` is used
    /// when present, and built-in defaults when not.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = cwd.join(SETTINGS_FILE);
        if candidate.is_file() {
            Self::load(candidate)
        } else {
            Ok(Self::default())
        }
    }

    fn resolve_relative_paths(&mut self, base: &Path) {
        for path in [&mut self.output.config, &mut self.output.header] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}
