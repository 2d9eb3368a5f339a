//! Configuration nodes and late-bound schema paths
//!
//! A node is constructed as soon as its parent schema mentions it, but its
//! file is only read when [`ConfigTree::parse`](crate::tree::ConfigTree::parse)
//! runs. In between, variables named by `$VAR` tokens in its path may be set
//! by sibling items; the node caches those values as they arrive.

use crate::entry::{ItemId, NodeId, RecipeId, RepoId};
use indexmap::IndexMap;
use jconfig_core::VariableStore;
use jconfig_core::path;
use serde_json::Value as JsonValue;
use std::fmt;
use std::path::{Path, PathBuf};

/// A schema path with `$VAR` tokens and the last known value of each variable
#[derive(Debug, Clone)]
pub struct BoundPath {
    raw: String,
    origin: PathBuf,
    cache: IndexMap<String, Option<String>>,
}

impl BoundPath {
    /// Bind `raw` (relative to `origin`) and seed the cache from `vars`
    pub fn new(raw: &str, origin: &Path, vars: &IndexMap<String, String>) -> Self {
        let cache = path::path_vars(raw)
            .into_iter()
            .map(|name| {
                let value = vars.get(&name).cloned();
                (name, value)
            })
            .collect();
        Self {
            raw: raw.to_string(),
            origin: origin.to_path_buf(),
            cache,
        }
    }

    /// Path as written in the schema
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Directory the path is relative to
    #[must_use]
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Variables referenced by the path
    pub fn vars(&self) -> impl Iterator<Item = &str> {
        self.cache.keys().map(String::as_str)
    }

    /// Variables whose value is still unknown
    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.cache
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| k.as_str())
    }

    /// Record a new value; returns whether `name` is one of our variables
    pub fn update(&mut self, name: &str, value: &str) -> bool {
        match self.cache.get_mut(name) {
            Some(slot) => {
                *slot = Some(value.to_string());
                true
            }
            None => false,
        }
    }

    /// Substitute cached values, then join onto the origin
    ///
    /// Substitution happens before joining so a variable holding an absolute
    /// path replaces the origin entirely.
    #[must_use]
    pub fn resolve(&self) -> PathBuf {
        let substituted = path::substitute(&self.raw, |name| self.cached(name));
        path::join_normalized(&self.origin, &substituted)
    }

    /// Like [`resolve`](Self::resolve) but prefers live store values
    #[must_use]
    pub fn resolve_with<K>(&self, store: &VariableStore<K>) -> PathBuf
    where
        K: Copy + Eq + fmt::Debug,
    {
        let substituted =
            path::substitute(&self.raw, |name| store.get(name).or_else(|| self.cached(name)));
        path::join_normalized(&self.origin, &substituted)
    }

    fn cached(&self, name: &str) -> Option<&str> {
        self.cache.get(name).and_then(Option::as_deref)
    }
}

/// Lifecycle of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Subscribed to its path and dependency variables, file not read yet
    Constructed,
    /// File read and contents populated
    Parsed,
}

/// Entities created by parsing one schema file, in document order
#[derive(Debug, Clone, Default)]
pub(crate) struct Contents {
    pub(crate) items: Vec<ItemId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) recipes: Vec<RecipeId>,
    pub(crate) repos: Vec<RepoId>,
}

/// One schema file in the configuration tree
#[derive(Debug, Clone)]
pub struct ConfigNode {
    name: String,
    path: BoundPath,
    var_map: IndexMap<String, String>,
    depend: IndexMap<String, JsonValue>,
    visible: bool,
    state: NodeState,
    file: Option<PathBuf>,
    contents: Contents,
}

impl ConfigNode {
    /// Construct a node whose schema lives at `raw_path` relative to `origin`
    ///
    /// The node takes a snapshot of the store to resolve what it can now.
    pub fn new<K>(
        name: &str,
        raw_path: &str,
        origin: &Path,
        depend: IndexMap<String, JsonValue>,
        store: &VariableStore<K>,
    ) -> Self
    where
        K: Copy + Eq + fmt::Debug,
    {
        let mut var_map = IndexMap::new();
        store.snapshot_into(&mut var_map);
        let path = BoundPath::new(raw_path, origin, &var_map);
        let visible = store.check_dependency(&depend);

        Self {
            name: name.to_string(),
            path,
            var_map,
            depend,
            visible,
            state: NodeState::Constructed,
            file: None,
            contents: Contents::default(),
        }
    }

    /// Entry name in the parent schema (`root` for the tree root)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema path as written
    #[must_use]
    pub fn raw_path(&self) -> &str {
        self.path.raw()
    }

    /// Path variables and dependency variables, without duplicates
    pub(crate) fn subscriptions(&self) -> Vec<String> {
        let mut names: Vec<String> = self.depend.keys().cloned().collect();
        for var in self.path.vars() {
            if !names.iter().any(|n| n == var) {
                names.push(var.to_string());
            }
        }
        names
    }

    /// Path the schema would be read from right now
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        self.path.resolve()
    }

    /// Path variables that have not been seen yet
    pub fn unresolved_vars(&self) -> impl Iterator<Item = &str> {
        self.path.unresolved()
    }

    /// Variables known to this node
    #[must_use]
    pub fn var_map(&self) -> &IndexMap<String, String> {
        &self.var_map
    }

    /// Dependency clauses
    #[must_use]
    pub fn depends(&self) -> &IndexMap<String, JsonValue> {
        &self.depend
    }

    /// Whether every dependency clause currently holds
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Lifecycle state
    #[must_use]
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Whether the schema file has been read
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        self.state == NodeState::Parsed
    }

    /// Schema file read by the last successful parse
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Directory that children, recipes, and repos are relative to
    #[must_use]
    pub fn base_dir(&self) -> Option<&Path> {
        self.file.as_deref().and_then(Path::parent)
    }

    /// Items in document order
    #[must_use]
    pub fn items(&self) -> &[ItemId] {
        &self.contents.items
    }

    /// Child nodes in document order
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.contents.children
    }

    /// Recipes in document order
    #[must_use]
    pub fn recipes(&self) -> &[RecipeId] {
        &self.contents.recipes
    }

    /// Repos in document order
    #[must_use]
    pub fn repos(&self) -> &[RepoId] {
        &self.contents.repos
    }

    pub(crate) fn on_update_var<K>(&mut self, name: &str, value: &str, store: &VariableStore<K>)
    where
        K: Copy + Eq + fmt::Debug,
    {
        if self.path.update(name, value) {
            self.var_map.insert(name.to_string(), value.to_string());
            tracing::debug!(node = %self.name, var = name, value, "path variable resolved");
        } else if let Some(known) = self.var_map.get_mut(name) {
            value.clone_into(known);
        }
        if self.depend.contains_key(name) {
            self.visible = store.check_dependency(&self.depend);
        }
    }

    pub(crate) fn finish_parse(&mut self, file: PathBuf, contents: Contents) {
        self.file = Some(file);
        self.contents = contents;
        self.state = NodeState::Parsed;
    }

    pub(crate) fn take_contents(&mut self) -> Contents {
        self.state = NodeState::Constructed;
        self.file = None;
        std::mem::take(&mut self.contents)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entry::Handle;
    use jconfig_core::Subscriber;

    struct Discard;

    impl Subscriber<Handle> for Discard {
        fn on_update_var(&mut self, _: Handle, _: &str, _: &str, _: &VariableStore<Handle>) {}
    }

    #[test]
    fn test_bound_path_seeds_from_snapshot() {
        let mut vars = IndexMap::new();
        vars.insert("ARCH".to_string(), "arm".to_string());
        let bound = BoundPath::new("$ROOT/$ARCH/config.json", Path::new("/base"), &vars);

        assert_eq!(bound.unresolved().collect::<Vec<_>>(), vec!["ROOT"]);
        assert_eq!(bound.resolve(), PathBuf::from("/base/$ROOT/arm/config.json"));
    }

    #[test]
    fn test_bound_path_absolute_variable_replaces_origin() {
        let mut bound =
            BoundPath::new("$ROOT/sub/config.json", Path::new("/base"), &IndexMap::new());
        assert!(bound.update("ROOT", "/tmp/proj"));
        assert!(!bound.update("OTHER", "x"));
        assert_eq!(bound.resolve(), PathBuf::from("/tmp/proj/sub/config.json"));
    }

    #[test]
    fn test_resolve_with_prefers_store() {
        let mut store: VariableStore<Handle> = VariableStore::new();
        let mut vars = IndexMap::new();
        vars.insert("DIR".to_string(), "old".to_string());
        let bound = BoundPath::new("./$DIR/Makefile", Path::new("/base"), &vars);

        assert_eq!(bound.resolve_with(&store), PathBuf::from("/base/old/Makefile"));
        store.set("DIR", "new", &mut Discard);
        assert_eq!(bound.resolve_with(&store), PathBuf::from("/base/new/Makefile"));
    }

    #[test]
    fn test_node_caches_path_variable_updates() {
        let store: VariableStore<Handle> = VariableStore::new();
        let mut node = ConfigNode::new(
            "sub",
            "$ROOT/sub/config.json",
            Path::new("/work"),
            IndexMap::new(),
            &store,
        );
        assert_eq!(node.state(), NodeState::Constructed);
        assert_eq!(node.subscriptions(), vec!["ROOT".to_string()]);

        node.on_update_var("ROOT", "/tmp/proj", &store);
        assert_eq!(node.resolved_path(), PathBuf::from("/tmp/proj/sub/config.json"));
        assert_eq!(node.var_map().get("ROOT").unwrap(), "/tmp/proj");
        assert_eq!(node.unresolved_vars().count(), 0);
    }

    #[test]
    fn test_node_visibility_follows_dependencies() {
        let mut store: VariableStore<Handle> = VariableStore::new();
        let mut depend = IndexMap::new();
        depend.insert("USE_NET".to_string(), JsonValue::from("y"));
        let mut node = ConfigNode::new("net", "./net/config.json", Path::new("/w"), depend, &store);
        assert!(!node.is_visible());

        store.set("USE_NET", "y", &mut Discard);
        node.on_update_var("USE_NET", "y", &store);
        assert!(node.is_visible());

        store.set("USE_NET", "n", &mut Discard);
        node.on_update_var("USE_NET", "n", &store);
        assert!(!node.is_visible());
    }

    #[test]
    fn test_take_contents_resets_state() {
        let store: VariableStore<Handle> = VariableStore::new();
        let mut node =
            ConfigNode::new("n", "./config.json", Path::new("/w"), IndexMap::new(), &store);
        let contents = Contents {
            items: vec![ItemId(0)],
            ..Contents::default()
        };
        node.finish_parse(PathBuf::from("/w/config.json"), contents);
        assert!(node.is_parsed());
        assert_eq!(node.base_dir(), Some(Path::new("/w")));

        let old = node.take_contents();
        assert_eq!(old.items, vec![ItemId(0)]);
        assert!(!node.is_parsed());
        assert!(node.items().is_empty());
    }
}
