//! Repo package manifests and the artifact ledger
//!
//! A repo checkout carries a `package.json` describing its headers, build
//! commands, and outputs. After building, each repo contributes a few lines to
//! `autorecipe.mk`:
//!
//! ```text
//! SLIB-y+=libfoo.a
//! INC-y+=/proj/libfoo/include
//! REPO-y+=/proj/libfoo
//! LDIR-y+=/proj/dep
//! ```
//!
//! Library directories are listed once per run even when several repos share
//! an output directory.

use jconfig_core::{Error, Result};
use serde::Deserialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Ledger file name written next to the owning schema
pub const LEDGER_FILE: &str = "autorecipe.mk";

/// Contents of a repo's package manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RepoManifest {
    /// Package name; must match the schema entry name
    pub name: String,

    /// Header directories, relative to the checkout
    #[serde(default)]
    pub include: Vec<String>,

    /// Build artifacts, relative to the checkout
    #[serde(default)]
    pub output: Vec<String>,

    /// Shell commands run inside the checkout
    #[serde(default)]
    pub buildcmd: Vec<String>,

    /// Package version, informational only
    #[serde(default)]
    pub version: Option<String>,
}

impl RepoManifest {
    /// Load a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::file_not_found(path));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Library kind inferred from an output file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibKind {
    /// Static archive (`.a`)
    Static,
    /// Shared object (`.so`)
    Dynamic,
}

impl LibKind {
    /// Classify an output; other files are copied but not linked
    #[must_use]
    pub fn of(output: &str) -> Option<Self> {
        if output.contains(".a") {
            Some(Self::Static)
        } else if output.contains(".so") {
            Some(Self::Dynamic)
        } else {
            None
        }
    }
}

/// Accumulates ledger text for one run, remembering emitted library directories
#[derive(Debug, Default)]
pub struct RepoLedger {
    lib_dirs: Vec<PathBuf>,
}

impl RepoLedger {
    /// Empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger lines for one built repo
    #[must_use]
    pub fn entry(&mut self, repo_dir: &Path, out_dir: &Path, manifest: &RepoManifest) -> String {
        let mut text = String::new();

        for output in &manifest.output {
            match LibKind::of(output) {
                Some(LibKind::Static) => {
                    let _ = writeln!(text, "SLIB-y+={output}");
                }
                Some(LibKind::Dynamic) => {
                    let _ = writeln!(text, "DLIB-y+={output}");
                }
                None => {}
            }
        }
        for inc in &manifest.include {
            let inc_dir = jconfig_core::path::join_normalized(repo_dir, inc);
            let _ = writeln!(text, "INC-y+={}", inc_dir.display());
        }
        let _ = writeln!(text, "REPO-y+={}", repo_dir.display());

        if !self.lib_dirs.iter().any(|d| d == out_dir) {
            self.lib_dirs.push(out_dir.to_path_buf());
            let _ = writeln!(text, "LDIR-y+={}", out_dir.display());
        }

        text
    }

    /// Library directories emitted so far
    #[must_use]
    pub fn lib_dirs(&self) -> &[PathBuf] {
        &self.lib_dirs
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn manifest() -> RepoManifest {
        serde_json::from_str(
            r#"{
                "name": "libfoo",
                "include": ["include", "./api/../pub"],
                "output": ["libfoo.a", "libfoo.so", "README"],
                "buildcmd": ["make"],
                "version": "1.2.0"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_manifest_fields() {
        let m = manifest();
        assert_eq!(m.name, "libfoo");
        assert_eq!(m.version.as_deref(), Some("1.2.0"));
        assert_eq!(m.output.len(), 3);
    }

    #[test]
    fn test_manifest_missing_file() {
        let err = RepoManifest::load(Path::new("/no/such/package.json")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_lib_kind() {
        assert_eq!(LibKind::of("libx.a"), Some(LibKind::Static));
        assert_eq!(LibKind::of("libx.so.1"), Some(LibKind::Dynamic));
        assert_eq!(LibKind::of("x.bin"), None);
    }

    #[test]
    fn test_entry_lines() {
        let mut ledger = RepoLedger::new();
        let text = ledger.entry(Path::new("/p/libfoo"), Path::new("/p/dep"), &manifest());
        assert_eq!(
            text,
            "SLIB-y+=libfoo.a\n\
             DLIB-y+=libfoo.so\n\
             INC-y+=/p/libfoo/include\n\
             INC-y+=/p/libfoo/pub\n\
             REPO-y+=/p/libfoo\n\
             LDIR-y+=/p/dep\n"
        );
    }

    #[test]
    fn test_lib_dir_listed_once() {
        let mut ledger = RepoLedger::new();
        let m = RepoManifest {
            name: "a".to_string(),
            ..RepoManifest::default()
        };
        let first = ledger.entry(Path::new("/p/a"), Path::new("/p/dep"), &m);
        let second = ledger.entry(Path::new("/p/b"), Path::new("/p/dep"), &m);
        let third = ledger.entry(Path::new("/p/c"), Path::new("/p/other"), &m);

        assert!(first.contains("LDIR-y+=/p/dep"));
        assert!(!second.contains("LDIR-y+="));
        assert!(third.contains("LDIR-y+=/p/other"));
        assert_eq!(ledger.lib_dirs().len(), 2);
    }
}
