//! Behavioral seams between the variable store and its observers

use crate::store::VariableStore;

/// Receiver of variable change notifications
///
/// The store keeps only copyable handles (`K`) for its subscribers. When a
/// variable changes, it hands each handle back to the `Subscriber` passed to
/// [`VariableStore::set`], which routes the update to whatever owns that
/// handle (usually an arena of items and nodes).
///
/// The store is lent immutably during delivery, so an observer can re-check
/// its dependencies but can never publish a variable from inside a
/// notification. Cascades are therefore exactly one level deep.
pub trait Subscriber<K> {
    /// Called once per subscribed handle, in subscription order
    fn on_update_var(&mut self, key: K, name: &str, value: &str, store: &VariableStore<K>);
}
