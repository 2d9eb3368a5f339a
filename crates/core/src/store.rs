//! Process-wide variable table with change notification
//!
//! [`VariableStore`] maps variable names to string values. Values carry no
//! type information; typed configuration items interpret them. Observers are
//! registered per variable name as non-owning handles and are notified
//! synchronously, in subscription order, whenever the value actually changes.
//!
//! There is no hidden global: a configuration run owns exactly one store value
//! and lends it to everything that needs it.

use crate::path;
use crate::traits::Subscriber;
use indexmap::IndexMap;
use std::fmt;

/// Resolved configuration variables plus their subscribers
#[derive(Clone)]
pub struct VariableStore<K> {
    vars: IndexMap<String, String>,
    subscribers: IndexMap<String, Vec<K>>,
}

impl<K> Default for VariableStore<K> {
    fn default() -> Self {
        Self {
            vars: IndexMap::new(),
            subscribers: IndexMap::new(),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for VariableStore<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableStore")
            .field("vars", &self.vars)
            .field("subscribers", &self.subscribers)
            .finish()
    }
}

impl<K: Copy + Eq + fmt::Debug> VariableStore<K> {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name` and notify subscribers if it changed
    ///
    /// Returns `true` when the value was new or different. Writing the value a
    /// variable already holds is a no-op and notifies nobody.
    pub fn set<S>(&mut self, name: &str, value: &str, sink: &mut S) -> bool
    where
        S: Subscriber<K> + ?Sized,
    {
        if self.vars.get(name).is_some_and(|current| current == value) {
            return false;
        }
        self.vars.insert(name.to_string(), value.to_string());
        tracing::debug!(name, value, "variable changed");

        let store: &Self = self;
        if let Some(keys) = store.subscribers.get(name) {
            for &key in keys {
                sink.on_update_var(key, name, value, store);
            }
        }
        true
    }

    /// Current value of `name`, if it has been set
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Whether `name` has a value
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// True iff every `(name, expected)` pair equals the stored value
    ///
    /// Comparison is exact and uncoerced: `expected` must compare equal to the
    /// stored string. An unset variable fails its clause, and an empty map is
    /// vacuously satisfied.
    pub fn check_dependency<V>(&self, deps: &IndexMap<String, V>) -> bool
    where
        V: PartialEq<str>,
    {
        deps.iter()
            .all(|(name, expected)| self.get(name).is_some_and(|current| *expected == *current))
    }

    /// Register `key` for changes of `name`
    ///
    /// Subscribing the same handle twice keeps a single entry.
    pub fn subscribe(&mut self, name: &str, key: K) {
        let keys = self.subscribers.entry(name.to_string()).or_default();
        if !keys.contains(&key) {
            tracing::debug!(name, ?key, "subscribed");
            keys.push(key);
        }
    }

    /// Remove `key` from the subscribers of `name`; unknown pairs are ignored
    pub fn unsubscribe(&mut self, name: &str, key: K) {
        if let Some(keys) = self.subscribers.get_mut(name) {
            keys.retain(|k| *k != key);
        }
    }

    /// Remove `key` from every subscription list
    pub fn unsubscribe_all(&mut self, key: K) {
        for keys in self.subscribers.values_mut() {
            keys.retain(|k| *k != key);
        }
    }

    /// Handles currently subscribed to `name`, in notification order
    #[must_use]
    pub fn subscribers(&self, name: &str) -> &[K] {
        self.subscribers.get(name).map_or(&[], Vec::as_slice)
    }

    /// Substitute known variables into the `$NAME` tokens of `path`
    ///
    /// Tokens naming unknown variables are left in place.
    #[must_use]
    pub fn resolve_path(&self, path: &str) -> String {
        path::substitute(path, |name| self.get(name))
    }

    /// Copy every current variable into `map`, overwriting existing keys
    pub fn snapshot_into(&self, map: &mut IndexMap<String, String>) {
        map.extend(self.vars.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Variables in the order they were first set
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of variables
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether no variable has been set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Drop every variable and subscription
    pub fn reset(&mut self) {
        self.vars.clear();
        self.subscribers.clear();
    }
}
