//! Recipe and repo descriptors
//!
//! Both are leaves attached to a parsed node. They only resolve paths; reading
//! manifests is as far as the engine goes. Cloning and building belong to the
//! caller.

use crate::node::BoundPath;
use crate::repo::RepoManifest;
use crate::schema::RepoSpec;
use indexmap::IndexMap;
use jconfig_core::{Error, Result, VariableStore};
use std::fmt;
use std::path::{Path, PathBuf};

/// A Makefile emitted as an `include` directive
#[derive(Debug, Clone)]
pub struct Recipe {
    name: String,
    path: BoundPath,
}

impl Recipe {
    /// Bind a recipe at `raw_path` relative to `base_dir`
    pub fn new(
        name: &str,
        raw_path: &str,
        base_dir: &Path,
        vars: &IndexMap<String, String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            path: BoundPath::new(raw_path, base_dir, vars),
        }
    }

    /// Entry name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path as written in the schema
    #[must_use]
    pub fn raw_path(&self) -> &str {
        self.path.raw()
    }

    pub(crate) fn subscriptions(&self) -> Vec<String> {
        self.path.vars().map(str::to_string).collect()
    }

    /// Absolute include target, using live store values where available
    #[must_use]
    pub fn resolved_path<K>(&self, store: &VariableStore<K>) -> PathBuf
    where
        K: Copy + Eq + fmt::Debug,
    {
        self.path.resolve_with(store)
    }

    pub(crate) fn on_update_var(&mut self, name: &str, value: &str) {
        self.path.update(name, value);
    }
}

/// An external package checked out and built next to the schema
#[derive(Debug, Clone)]
pub struct Repo {
    name: String,
    dir: BoundPath,
    out: BoundPath,
    url: Option<String>,
    pkg: String,
    buildcmd: Vec<String>,
}

impl Repo {
    /// Bind a repo entry; the checkout directory defaults to the entry name
    pub fn new(
        name: &str,
        spec: RepoSpec,
        base_dir: &Path,
        vars: &IndexMap<String, String>,
    ) -> Self {
        let dir = spec.path.unwrap_or_else(|| name.to_string());
        Self {
            name: name.to_string(),
            dir: BoundPath::new(&dir, base_dir, vars),
            out: BoundPath::new(&spec.out, base_dir, vars),
            url: spec.url,
            pkg: spec.pkg,
            buildcmd: spec.buildcmd,
        }
    }

    /// Entry name, which is also the expected package name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Git URL, if the entry has one
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Build commands that override the manifest's own
    #[must_use]
    pub fn buildcmd_override(&self) -> &[String] {
        &self.buildcmd
    }

    pub(crate) fn subscriptions(&self) -> Vec<String> {
        let mut names: Vec<String> = self.dir.vars().map(str::to_string).collect();
        for var in self.out.vars() {
            if !names.iter().any(|n| n == var) {
                names.push(var.to_string());
            }
        }
        names
    }

    /// Checkout directory
    #[must_use]
    pub fn resolved_dir<K>(&self, store: &VariableStore<K>) -> PathBuf
    where
        K: Copy + Eq + fmt::Debug,
    {
        self.dir.resolve_with(store)
    }

    /// Directory receiving build outputs
    #[must_use]
    pub fn resolved_out_dir<K>(&self, store: &VariableStore<K>) -> PathBuf
    where
        K: Copy + Eq + fmt::Debug,
    {
        self.out.resolve_with(store)
    }

    /// Package manifest inside the checkout
    #[must_use]
    pub fn manifest_path<K>(&self, store: &VariableStore<K>) -> PathBuf
    where
        K: Copy + Eq + fmt::Debug,
    {
        self.resolved_dir(store).join(&self.pkg)
    }

    /// Read the manifest and check that it describes this repo
    ///
    /// # Errors
    ///
    /// `FileNotFound` if the checkout has no manifest, `UnexpectedRepoManifest`
    /// if it names another package.
    pub fn load_manifest<K>(&self, store: &VariableStore<K>) -> Result<RepoManifest>
    where
        K: Copy + Eq + fmt::Debug,
    {
        let manifest = RepoManifest::load(&self.manifest_path(store))?;
        if manifest.name != self.name {
            return Err(Error::UnexpectedRepoManifest {
                expected: self.name.clone(),
                found: manifest.name,
            });
        }
        Ok(manifest)
    }

    /// Build commands to run: the entry's override, else the manifest's
    #[must_use]
    pub fn build_commands<'a>(&'a self, manifest: &'a RepoManifest) -> &'a [String] {
        if self.buildcmd.is_empty() {
            &manifest.buildcmd
        } else {
            &self.buildcmd
        }
    }

    pub(crate) fn on_update_var(&mut self, name: &str, value: &str) {
        self.dir.update(name, value);
        self.out.update(name, value);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entry::Handle;
    use std::fs;
    use tempfile::TempDir;

    fn store() -> VariableStore<Handle> {
        VariableStore::new()
    }

    #[test]
    fn test_recipe_defaults_relative_to_base() {
        let recipe = Recipe::new("mk", "./Makefile", Path::new("/proj/sub"), &IndexMap::new());
        assert_eq!(recipe.resolved_path(&store()), PathBuf::from("/proj/sub/Makefile"));
        assert!(recipe.subscriptions().is_empty());
    }

    #[test]
    fn test_recipe_resolves_cached_then_live() {
        let mut recipe = Recipe::new("mk", "./$BOARD/board.mk", Path::new("/p"), &IndexMap::new());
        assert_eq!(recipe.subscriptions(), vec!["BOARD".to_string()]);
        assert_eq!(recipe.resolved_path(&store()), PathBuf::from("/p/$BOARD/board.mk"));

        recipe.on_update_var("BOARD", "stm32");
        assert_eq!(recipe.resolved_path(&store()), PathBuf::from("/p/stm32/board.mk"));
    }

    #[test]
    fn test_repo_paths() {
        let spec = RepoSpec {
            out: "./$OUT/".to_string(),
            pkg: "package.json".to_string(),
            ..RepoSpec::default()
        };
        let mut repo = Repo::new("libfoo", spec, Path::new("/p"), &IndexMap::new());
        repo.on_update_var("OUT", "dep");

        let s = store();
        assert_eq!(repo.resolved_dir(&s), PathBuf::from("/p/libfoo"));
        assert_eq!(repo.resolved_out_dir(&s), PathBuf::from("/p/dep"));
        assert_eq!(repo.manifest_path(&s), PathBuf::from("/p/libfoo/package.json"));
    }

    #[test]
    fn test_repo_manifest_name_check() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("libfoo");
        fs::create_dir(&dir).unwrap();
        fs::write(
            dir.join("package.json"),
            r#"{ "name": "libbar", "include": [], "output": [], "buildcmd": [] }"#,
        )
        .unwrap();

        let spec = RepoSpec {
            pkg: "package.json".to_string(),
            out: "./dep/".to_string(),
            ..RepoSpec::default()
        };
        let repo = Repo::new("libfoo", spec, temp.path(), &IndexMap::new());
        let err = repo.load_manifest(&store()).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedRepoManifest { ref found, .. } if found == "libbar"
        ));
    }

    #[test]
    fn test_build_commands_override() {
        let manifest: RepoManifest = serde_json::from_str(
            r#"{ "name": "x", "buildcmd": ["make"] }"#,
        )
        .unwrap();
        let plain = Repo::new("x", RepoSpec::default(), Path::new("/p"), &IndexMap::new());
        assert_eq!(plain.build_commands(&manifest), ["make".to_string()]);

        let spec = RepoSpec {
            buildcmd: vec!["make lib".to_string()],
            ..RepoSpec::default()
        };
        let custom = Repo::new("x", spec, Path::new("/p"), &IndexMap::new());
        assert_eq!(custom.build_commands(&manifest), ["make lib".to_string()]);
    }
}
