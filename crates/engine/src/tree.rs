//! The configuration tree
//!
//! [`ConfigTree`] owns the variable store and an arena holding every item,
//! node, recipe, and repo created while parsing. The store refers to arena
//! entries only through [`Handle`]s, and the arena itself is the
//! [`Subscriber`] that routes notifications to them.
//!
//! Parsing is explicit and lazy: [`ConfigTree::parse`] reads one node's schema
//! and constructs (but does not parse) its children. Values published while
//! a node's items are being configured are therefore visible to children that
//! are parsed afterwards. [`ConfigTree::configure`] implements that walk.

use crate::dialog::Dialog;
use crate::entry::{Handle, ItemId, NodeId, RecipeId, RepoId};
use crate::item::ConfigItem;
use crate::node::{ConfigNode, Contents};
use crate::recipe::{Recipe, Repo};
use crate::schema::{self, SchemaEntry};
use indexmap::IndexMap;
use jconfig_core::{Error, Result, Subscriber, VariableStore};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Flat storage for everything the tree creates
///
/// Discarded entries leave a `None` behind so handles are never reused.
#[derive(Debug, Default)]
struct Arena {
    items: Vec<Option<ConfigItem>>,
    nodes: Vec<Option<ConfigNode>>,
    recipes: Vec<Option<Recipe>>,
    repos: Vec<Option<Repo>>,
}

impl Subscriber<Handle> for Arena {
    fn on_update_var(
        &mut self,
        key: Handle,
        name: &str,
        value: &str,
        store: &VariableStore<Handle>,
    ) {
        match key {
            Handle::Item(id) => {
                if let Some(item) = self.items.get_mut(id.index()).and_then(Option::as_mut) {
                    item.on_update_var(name, value, store);
                }
            }
            Handle::Node(id) => {
                if let Some(node) = self.nodes.get_mut(id.index()).and_then(Option::as_mut) {
                    node.on_update_var(name, value, store);
                }
            }
            Handle::Recipe(id) => {
                if let Some(recipe) = self.recipes.get_mut(id.index()).and_then(Option::as_mut) {
                    recipe.on_update_var(name, value);
                }
            }
            Handle::Repo(id) => {
                if let Some(repo) = self.repos.get_mut(id.index()).and_then(Option::as_mut) {
                    repo.on_update_var(name, value);
                }
            }
        }
    }
}

/// A repo attached to a parsed node, with that node's directory
#[derive(Debug, Clone)]
pub struct RepoSite<'a> {
    /// Handle of the repo
    pub id: RepoId,
    /// The repo descriptor
    pub repo: &'a Repo,
    /// Directory of the schema that declared the repo
    pub base_dir: PathBuf,
}

/// Variable store plus the tree of nodes rooted at one schema file
#[derive(Debug)]
pub struct ConfigTree {
    store: VariableStore<Handle>,
    arena: Arena,
    root: NodeId,
    root_path: String,
    origin: PathBuf,
}

impl ConfigTree {
    /// Create a tree whose root schema is `path`, relative to the current directory
    ///
    /// The root is constructed but not parsed.
    pub fn new(path: &str) -> Result<Self> {
        let origin = std::env::current_dir()?;
        Ok(Self::with_origin(path, &origin))
    }

    /// Create a tree whose root schema is `path`, relative to `origin`
    #[must_use]
    pub fn with_origin(path: &str, origin: &Path) -> Self {
        let mut tree = Self {
            store: VariableStore::new(),
            arena: Arena::default(),
            root: NodeId(0),
            root_path: path.to_string(),
            origin: origin.to_path_buf(),
        };
        tree.root = tree.add_node("root", path, origin, IndexMap::new());
        tree
    }

    /// Handle of the root node
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The variable store
    #[must_use]
    pub fn store(&self) -> &VariableStore<Handle> {
        &self.store
    }

    /// Publish a variable, notifying subscribed items and nodes
    ///
    /// Returns whether the value changed.
    pub fn set_var(&mut self, name: &str, value: &str) -> bool {
        self.store.set(name, value, &mut self.arena)
    }

    /// Node by handle
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&ConfigNode> {
        self.arena.nodes.get(id.index()).and_then(Option::as_ref)
    }

    /// Item by handle
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&ConfigItem> {
        self.arena.items.get(id.index()).and_then(Option::as_ref)
    }

    /// Recipe by handle
    #[must_use]
    pub fn recipe(&self, id: RecipeId) -> Option<&Recipe> {
        self.arena.recipes.get(id.index()).and_then(Option::as_ref)
    }

    /// Repo by handle
    #[must_use]
    pub fn repo(&self, id: RepoId) -> Option<&Repo> {
        self.arena.repos.get(id.index()).and_then(Option::as_ref)
    }

    /// First item named `name` among parsed nodes, in tree order
    #[must_use]
    pub fn find_item(&self, name: &str) -> Option<ItemId> {
        self.walk()
            .into_iter()
            .filter_map(|id| self.node(id))
            .flat_map(ConfigNode::items)
            .copied()
            .find(|&id| self.item(id).is_some_and(|item| item.name() == name))
    }

    /// First child of `parent` named `name`
    #[must_use]
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.node(parent)?
            .children()
            .iter()
            .copied()
            .find(|&id| self.node(id).is_some_and(|node| node.name() == name))
    }

    /// Validate `raw`, store it as the item's user value, and publish it
    ///
    /// # Errors
    ///
    /// `Validation` when the item rejects the value; the item and the store
    /// are left untouched in that case.
    pub fn set_user_value(&mut self, id: ItemId, raw: &str) -> Result<()> {
        let item = self
            .arena
            .items
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or_else(|| stale("item", id))?;
        let value = item.assign(raw)?;
        let name = item.name().to_string();
        tracing::debug!(item = %name, %value, "user value set");
        self.store.set(&name, &value, &mut self.arena);
        Ok(())
    }

    /// Give the item its schema default as user value
    pub fn adopt_default(&mut self, id: ItemId) -> Result<()> {
        let item = self.item(id).ok_or_else(|| stale("item", id))?;
        let Some(default) = item.default_value().map(str::to_string) else {
            return Err(Error::ConfigurationLogic(format!(
                "item {} has no default to adopt",
                item.name()
            )));
        };
        self.set_user_value(id, &default)
    }

    /// Read the node's schema file and populate it
    ///
    /// Path variables are substituted from the node's cache first. Children
    /// are constructed and subscribed but not parsed. Parsing an already
    /// parsed node discards everything the previous parse created.
    ///
    /// # Errors
    ///
    /// `FileNotFound` if the resolved path does not exist, `Json`/`Schema` for
    /// malformed files, `ConfigurationLogic` for invalid item definitions, and
    /// `Validation` when an imported environment value is rejected. On error
    /// nothing from this parse remains in the tree, and imported values are
    /// published to the store only once the whole file has loaded.
    pub fn parse(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id).ok_or_else(|| stale("node", id))?;
        let file = node.resolved_path();
        let var_map = node.var_map().clone();
        let name = node.name().to_string();

        if !file.is_file() {
            return Err(Error::file_not_found(file));
        }
        let entries = schema::load(&file)?;
        let base_dir = file.parent().map(Path::to_path_buf).unwrap_or_default();

        if let Some(node) = self.arena.nodes.get_mut(id.index()).and_then(Option::as_mut)
            && node.is_parsed()
        {
            tracing::debug!(node = %name, "re-parsing, discarding previous contents");
            let previous = node.take_contents();
            self.release(previous);
        }

        let mut contents = Contents::default();
        let mut imported = Vec::new();
        if let Err(e) = self.populate(entries, &base_dir, &var_map, &mut contents, &mut imported) {
            self.release(contents);
            return Err(e);
        }

        tracing::info!(
            node = %name,
            file = %file.display(),
            items = contents.items.len(),
            children = contents.children.len(),
            "parsed"
        );
        if let Some(node) = self.arena.nodes.get_mut(id.index()).and_then(Option::as_mut) {
            node.finish_parse(file, contents);
        }

        // Values are already validated, publishing cannot fail.
        for (item, value) in imported {
            self.set_user_value(item, &value)?;
        }
        Ok(())
    }

    fn populate(
        &mut self,
        entries: Vec<(String, SchemaEntry)>,
        base_dir: &Path,
        var_map: &IndexMap<String, String>,
        contents: &mut Contents,
        imported: &mut Vec<(ItemId, String)>,
    ) -> Result<()> {
        for (name, entry) in entries {
            let (kind, spec) = match entry {
                SchemaEntry::Bool(spec) => ("bool", spec),
                SchemaEntry::Tristate(spec) => ("tristate", spec),
                SchemaEntry::Enum(spec) => ("enum", spec),
                SchemaEntry::Int(spec) => ("int", spec),
                SchemaEntry::Hex(spec) => ("hex", spec),
                SchemaEntry::String(spec) => ("string", spec),
                SchemaEntry::Config(spec) => {
                    let child = self.add_node(&name, &spec.path, base_dir, spec.depend);
                    contents.children.push(child);
                    continue;
                }
                SchemaEntry::Recipe(spec) => {
                    let recipe = Recipe::new(&name, &spec.path, base_dir, var_map);
                    contents.recipes.push(self.add_recipe(recipe));
                    continue;
                }
                SchemaEntry::Repo(spec) => {
                    let repo = Repo::new(&name, spec, base_dir, var_map);
                    contents.repos.push(self.add_repo(repo));
                    continue;
                }
            };

            let mut item = ConfigItem::from_spec(&name, kind, spec)?;
            item.refresh_visibility(&self.store);
            let value = if item.imports_env() {
                import_env(&item)?
            } else {
                None
            };
            let id = self.add_item(item);
            contents.items.push(id);
            if let Some(value) = value {
                imported.push((id, value));
            }
        }
        Ok(())
    }

    fn add_node(
        &mut self,
        name: &str,
        raw_path: &str,
        origin: &Path,
        depend: IndexMap<String, serde_json::Value>,
    ) -> NodeId {
        let node = ConfigNode::new(name, raw_path, origin, depend, &self.store);
        let id = NodeId(self.arena.nodes.len());
        for var in node.subscriptions() {
            self.store.subscribe(&var, Handle::Node(id));
        }
        self.arena.nodes.push(Some(node));
        id
    }

    fn add_item(&mut self, item: ConfigItem) -> ItemId {
        let id = ItemId(self.arena.items.len());
        for var in item.depends().keys() {
            self.store.subscribe(var, Handle::Item(id));
        }
        self.arena.items.push(Some(item));
        id
    }

    fn add_recipe(&mut self, recipe: Recipe) -> RecipeId {
        let id = RecipeId(self.arena.recipes.len());
        for var in recipe.subscriptions() {
            self.store.subscribe(&var, Handle::Recipe(id));
        }
        self.arena.recipes.push(Some(recipe));
        id
    }

    fn add_repo(&mut self, repo: Repo) -> RepoId {
        let id = RepoId(self.arena.repos.len());
        for var in repo.subscriptions() {
            self.store.subscribe(&var, Handle::Repo(id));
        }
        self.arena.repos.push(Some(repo));
        id
    }

    /// Drop entities and their subscriptions, recursing into child nodes
    fn release(&mut self, contents: Contents) {
        for id in contents.items {
            self.store.unsubscribe_all(Handle::Item(id));
            if let Some(slot) = self.arena.items.get_mut(id.index()) {
                *slot = None;
            }
        }
        for id in contents.recipes {
            self.store.unsubscribe_all(Handle::Recipe(id));
            if let Some(slot) = self.arena.recipes.get_mut(id.index()) {
                *slot = None;
            }
        }
        for id in contents.repos {
            self.store.unsubscribe_all(Handle::Repo(id));
            if let Some(slot) = self.arena.repos.get_mut(id.index()) {
                *slot = None;
            }
        }
        for id in contents.children {
            self.store.unsubscribe_all(Handle::Node(id));
            let grandchildren = self
                .arena
                .nodes
                .get_mut(id.index())
                .and_then(Option::take)
                .map(|mut node| node.take_contents());
            if let Some(grandchildren) = grandchildren {
                self.release(grandchildren);
            }
        }
    }

    /// Walk the tree from `id`, asking `dialog` for every visible item
    ///
    /// Invisible nodes are skipped without being parsed. Visibility of an
    /// item is checked when the walk reaches it, so earlier answers in the
    /// same file take effect immediately. Forced items take their default.
    /// An unanswered item keeps its current value (imported or earlier),
    /// else its default.
    /// Children are configured after all items of their parent.
    pub fn configure(&mut self, id: NodeId, dialog: &mut dyn Dialog) -> Result<()> {
        let node = self.node(id).ok_or_else(|| stale("node", id))?;
        if !node.is_visible() {
            tracing::debug!(node = node.name(), "invisible, skipping");
            return Ok(());
        }

        self.parse(id)?;

        let node = self.node(id).ok_or_else(|| stale("node", id))?;
        let items = node.items().to_vec();
        let children = node.children().to_vec();

        for item_id in items {
            let item = self.item(item_id).ok_or_else(|| stale("item", item_id))?;
            if !item.is_visible() {
                continue;
            }
            if item.is_forced() {
                self.adopt_default(item_id)?;
            } else {
                self.ask(item_id, dialog)?;
            }
        }

        for child in children {
            self.configure(child, dialog)?;
        }
        Ok(())
    }

    fn ask(&mut self, id: ItemId, dialog: &mut dyn Dialog) -> Result<()> {
        let mut last_error = None;
        loop {
            let item = self.item(id).ok_or_else(|| stale("item", id))?;
            let answer = dialog
                .ask(item, last_error.as_ref())?
                .or_else(|| item.user_value().or(item.default_value()).map(str::to_string));
            let Some(answer) = answer else {
                tracing::debug!(item = item.name(), "no answer and no default, leaving unset");
                return Ok(());
            };

            match self.set_user_value(id, &answer) {
                Err(Error::Validation(e)) if dialog.retry_on_invalid() => {
                    tracing::warn!("{e}");
                    last_error = Some(e);
                }
                other => return other,
            }
        }
    }

    /// Parsed nodes reachable from the root, depth first in document order
    #[must_use]
    pub fn walk(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        self.walk_from(self.root, &mut order);
        order
    }

    fn walk_from(&self, id: NodeId, order: &mut Vec<NodeId>) {
        let Some(node) = self.node(id) else {
            return;
        };
        if !node.is_parsed() {
            return;
        }
        order.push(id);
        for &child in node.children() {
            self.walk_from(child, order);
        }
    }

    /// Resolved include targets of every parsed node's recipes, in tree order
    ///
    /// # Errors
    ///
    /// `FileNotFound` for a recipe whose target does not exist.
    pub fn recipe_paths(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for node_id in self.walk() {
            let Some(node) = self.node(node_id) else {
                continue;
            };
            for &recipe_id in node.recipes() {
                let Some(recipe) = self.recipe(recipe_id) else {
                    continue;
                };
                let path = recipe.resolved_path(&self.store);
                if !path.is_file() {
                    return Err(Error::file_not_found(path));
                }
                paths.push(path);
            }
        }
        Ok(paths)
    }

    /// Generated `(key, value)` pairs across the tree
    ///
    /// Expressions such as `rand` and `now` are evaluated on every call.
    pub fn gen_entries(&self) -> Result<Vec<(String, String)>> {
        let mut entries = Vec::new();
        for node_id in self.walk() {
            let Some(node) = self.node(node_id) else {
                continue;
            };
            for &item_id in node.items() {
                if let Some(item) = self.item(item_id) {
                    entries.extend(item.resolved_gen_list()?);
                }
            }
        }
        Ok(entries)
    }

    /// Repos of parsed nodes with the directory of the schema declaring them
    #[must_use]
    pub fn repo_sites(&self) -> Vec<RepoSite<'_>> {
        let mut sites = Vec::new();
        for node_id in self.walk() {
            let Some(node) = self.node(node_id) else {
                continue;
            };
            let base_dir = node.base_dir().map(Path::to_path_buf).unwrap_or_default();
            for &id in node.repos() {
                if let Some(repo) = self.repo(id) {
                    sites.push(RepoSite {
                        id,
                        repo,
                        base_dir: base_dir.clone(),
                    });
                }
            }
        }
        sites
    }

    /// Human readable summary of a node's items
    #[must_use]
    pub fn report(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };
        let mut out = String::new();
        let _ = writeln!(out, ">>> Config : {}", node.name());
        for &item_id in node.items() {
            if let Some(item) = self.item(item_id) {
                out.push_str(&item.to_string());
            }
        }
        let _ = writeln!(out, "<<< Config : {}", node.name());
        out
    }

    /// Report of every parsed node in tree order
    #[must_use]
    pub fn report_all(&self) -> String {
        self.walk().into_iter().map(|id| self.report(id)).collect()
    }

    /// Forget every variable and entity and reconstruct the root
    pub fn reset(&mut self) {
        self.store.reset();
        self.arena = Arena::default();
        let (root_path, origin) = (self.root_path.clone(), self.origin.clone());
        self.root = self.add_node("root", &root_path, &origin, IndexMap::new());
    }
}

/// Validated value of the like-named environment variable, if set
fn import_env(item: &ConfigItem) -> Result<Option<String>> {
    let name = item.name();
    match std::env::var(name) {
        Ok(raw) => {
            tracing::debug!(item = name, value = %raw, "importing from environment");
            Ok(Some(item.validate(&raw)?))
        }
        Err(_) => {
            tracing::debug!(item = name, "nothing to import from environment");
            Ok(None)
        }
    }
}

fn stale(kind: &str, id: impl std::fmt::Display) -> Error {
    Error::Message(format!("{kind} handle {id} does not refer to a live {kind}"))
}
