//! Handles into the configuration tree arena
//!
//! The tree owns every item, node, recipe, and repo in flat vectors. Everything
//! else, including the variable store's subscriber lists, refers to them
//! through these copyable indices, so no entity holds a strong reference to
//! another and teardown order never matters.

use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Position in the arena
            #[must_use]
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Handle of a [`ConfigItem`](crate::item::ConfigItem)
    ItemId,
    "item"
);
arena_id!(
    /// Handle of a [`ConfigNode`](crate::node::ConfigNode)
    NodeId,
    "node"
);
arena_id!(
    /// Handle of a [`Recipe`](crate::recipe::Recipe)
    RecipeId,
    "recipe"
);
arena_id!(
    /// Handle of a [`Repo`](crate::recipe::Repo)
    RepoId,
    "repo"
);

/// Any subscriber the variable store can notify
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    /// Configuration item
    Item(ItemId),
    /// Configuration node
    Node(NodeId),
    /// Recipe descriptor
    Recipe(RecipeId),
    /// Repo descriptor
    Repo(RepoId),
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item(id) => id.fmt(f),
            Self::Node(id) => id.fmt(f),
            Self::Recipe(id) => id.fmt(f),
            Self::Repo(id) => id.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ItemId(3).to_string(), "item#3");
        assert_eq!(Handle::Node(NodeId(0)).to_string(), "node#0");
        assert_eq!(Handle::Repo(RepoId(2)).to_string(), "repo#2");
    }
}
