//! # jconfig engine
//!
//! Reactive configuration tree for the jconfig tool.
//!
//! - **Schema**: decoding of JSON schema files into typed entries
//! - **Items**: the six item kinds, validation, and cross-type conversions
//! - **Tree**: nodes parsed lazily, with `$VAR` paths bound late through the variable store
//! - **Dialogs**: the seam through which a driver supplies values
//! - **Outputs**: `.config`, generated header, and repo ledger formatting

pub mod dialog;
pub mod entry;
pub mod generate;
pub mod item;
pub mod node;
pub mod output;
pub mod recipe;
pub mod repo;
pub mod saved;
pub mod schema;
pub mod tree;

// Re-export error and store types from core
pub use jconfig_core::{Error, Result, ValidationError, VariableStore};

// Re-export commonly used types
pub use dialog::{Defaults, Dialog, Replay};
pub use entry::{Handle, ItemId, NodeId, RecipeId, RepoId};
pub use item::{ConfigItem, ItemKind, ItemValue, Tristate};
pub use node::{ConfigNode, NodeState};
pub use recipe::{Recipe, Repo};
pub use repo::{RepoLedger, RepoManifest};
pub use tree::{ConfigTree, RepoSite};
