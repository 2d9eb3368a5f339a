//! JSON schema decoding
//!
//! A schema file is a JSON object keyed by entry name. Every value carries a
//! `type` discriminator selecting one of the closed set of [`SchemaEntry`]
//! variants. Document order is preserved.
//!
//! ```json
//! {
//!   "USE_UART": { "type": "bool", "default": "y", "prompt": "Enable UART" },
//!   "drivers":  { "type": "config", "path": "./drivers/config.json",
//!                 "depend": { "USE_UART": "y" } },
//!   "build":    { "type": "recipe", "path": "./uart.mk" }
//! }
//! ```
//!
//! Entries whose `type` is not recognized are skipped with a warning. This
//! keeps older schema files loading; nothing from such an entry reaches the tree.

use indexmap::IndexMap;
use jconfig_core::{Error, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;

/// Type discriminators understood by the engine
pub const KNOWN_TYPES: &[&str] = &[
    "bool", "tristate", "enum", "int", "hex", "string", "config", "recipe", "repo",
];

/// One decoded schema entry
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SchemaEntry {
    /// `y`/`n` item
    Bool(ItemSpec),
    /// `y`/`m`/`n` item
    Tristate(ItemSpec),
    /// Choice among a list of options
    Enum(ItemSpec),
    /// Decimal integer item
    Int(ItemSpec),
    /// `0x`-prefixed hexadecimal item
    Hex(ItemSpec),
    /// Non-empty string item
    String(ItemSpec),
    /// Child configuration file
    Config(NodeSpec),
    /// Makefile include target
    Recipe(RecipeSpec),
    /// External repository descriptor
    Repo(RepoSpec),
}

impl SchemaEntry {
    /// Item fields, for the six item types
    #[must_use]
    pub fn item_spec(&self) -> Option<&ItemSpec> {
        match self {
            Self::Bool(spec)
            | Self::Tristate(spec)
            | Self::Enum(spec)
            | Self::Int(spec)
            | Self::Hex(spec)
            | Self::String(spec) => Some(spec),
            Self::Config(_) | Self::Recipe(_) | Self::Repo(_) => None,
        }
    }
}

/// Fields shared by all item types
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ItemSpec {
    /// Default value (string, number, or boolean)
    #[serde(default)]
    pub default: Option<JsonValue>,

    /// Prompt shown by interactive dialogs
    #[serde(default)]
    pub prompt: Option<String>,

    /// Help text, one entry per line
    #[serde(default, deserialize_with = "help_lines")]
    pub help: Option<Vec<String>>,

    /// Variables that must hold the given values for the item to be visible
    #[serde(default)]
    pub depend: IndexMap<String, JsonValue>,

    /// Seed the value from the like-named environment variable
    #[serde(default, deserialize_with = "flag")]
    pub import: bool,

    /// Adopt the default without prompting
    #[serde(default, deserialize_with = "flag")]
    pub force: bool,

    /// Output macro name to derivation expression
    #[serde(default)]
    pub gen_list: IndexMap<String, String>,

    /// Options of an `enum` item
    #[serde(default, rename = "enum")]
    pub options: Vec<String>,

    /// Inclusive `[min, max]` of an `int` or `hex` item
    #[serde(default)]
    pub range: Vec<JsonValue>,

    /// Keys the engine does not understand
    #[serde(flatten)]
    pub unknown: IndexMap<String, JsonValue>,
}

/// Child configuration entry
#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpec {
    /// Path of the child schema, relative to the parent's directory
    #[serde(default = "default_node_path")]
    pub path: String,

    /// Visibility requirements of the child
    #[serde(default)]
    pub depend: IndexMap<String, JsonValue>,
}

/// Recipe entry
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeSpec {
    /// Makefile to include, relative to the node's directory
    #[serde(default = "default_recipe_path")]
    pub path: String,
}

/// Repo entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepoSpec {
    /// Checkout directory, relative to the node's directory (defaults to the entry name)
    #[serde(default)]
    pub path: Option<String>,

    /// Git URL to clone from when the checkout is missing
    #[serde(default)]
    pub url: Option<String>,

    /// Package manifest inside the checkout
    #[serde(default = "default_pkg")]
    pub pkg: String,

    /// Directory receiving build outputs
    #[serde(default = "default_out")]
    pub out: String,

    /// Build commands overriding the manifest's `buildcmd`
    #[serde(default)]
    pub buildcmd: Vec<String>,
}

fn default_node_path() -> String {
    "./config.json".to_string()
}

fn default_recipe_path() -> String {
    "./Makefile".to_string()
}

fn default_pkg() -> String {
    "package.json".to_string()
}

fn default_out() -> String {
    "./dep/".to_string()
}

/// Accept `true`/`false` as well as the legacy `"y"`/`"n"` spelling
fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Text(s) => matches!(s.as_str(), "y" | "yes" | "true"),
    })
}

/// Accept a list of lines or a single string
fn help_lines<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Help {
        Lines(Vec<String>),
        Single(String),
    }

    Ok(Some(match Help::deserialize(deserializer)? {
        Help::Lines(lines) => lines,
        Help::Single(line) => line.lines().map(str::to_string).collect(),
    }))
}

/// Load and decode the schema file at `path`
///
/// # Errors
///
/// Returns `FileNotFound` if the file is missing, `Json` if it is not a JSON
/// object, and `Schema` if an entry lacks `type` or has malformed fields.
pub fn load(path: &Path) -> Result<Vec<(String, SchemaEntry)>> {
    if !path.is_file() {
        return Err(Error::file_not_found(path));
    }
    let content = fs::read_to_string(path)?;
    parse(&content, path)
}

/// Decode schema text; `origin` is used for error messages only
pub fn parse(content: &str, origin: &Path) -> Result<Vec<(String, SchemaEntry)>> {
    let document: IndexMap<String, JsonValue> = serde_json::from_str(content)?;
    let mut entries = Vec::with_capacity(document.len());

    for (name, value) in document {
        let Some(kind) = value.get("type").and_then(JsonValue::as_str) else {
            return Err(Error::Schema {
                path: origin.to_path_buf(),
                message: format!("entry '{name}' has no \"type\""),
            });
        };

        if !KNOWN_TYPES.contains(&kind) {
            tracing::warn!(
                entry = %name,
                kind,
                file = %origin.display(),
                "Skipping schema entry with unknown type"
            );
            continue;
        }

        let entry = serde_json::from_value::<SchemaEntry>(value).map_err(|e| Error::Schema {
            path: origin.to_path_buf(),
            message: format!("entry '{name}': {e}"),
        })?;
        if let Some(spec) = entry.item_spec() {
            for key in spec.unknown.keys() {
                tracing::warn!(
                    entry = %name,
                    key = %key,
                    file = %origin.display(),
                    "Ignoring unknown item field"
                );
            }
        }
        entries.push((name, entry));
    }

    Ok(entries)
}
