//! Typed configuration items
//!
//! A [`ConfigItem`] is a leaf of the configuration tree: a named value of one
//! of six kinds ([`ItemKind`]). Raw input is validated per kind and stored as
//! the canonical string that is published into the variable store. Items also
//! track their own visibility, which is the conjunction of their dependency
//! clauses evaluated against the store.

use crate::generate::{self, Conversion, GenExpr};
use crate::schema::ItemSpec;
use indexmap::IndexMap;
use jconfig_core::{Error, Result, ValidationError, VariableStore};
use regex::Regex;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::LazyLock;

static HEX_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]+$").expect("hex pattern is valid"));

const DEFAULT_HELP: &str = "No Help Message";

/// Kind of an item, with its kind-specific constraints
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    /// `y` or `n`
    Bool,
    /// `y`, `m`, or `n`
    Tristate,
    /// One of `options`, entered by index
    Enum {
        /// Selectable option texts
        options: Vec<String>,
    },
    /// `0x`-prefixed hexadecimal
    Hex {
        /// Inclusive bounds
        range: Option<(u64, u64)>,
    },
    /// Decimal integer
    Int {
        /// Inclusive bounds
        range: Option<(i64, i64)>,
    },
    /// Non-empty text
    String,
}

impl ItemKind {
    /// Schema name of this kind
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Tristate => "tristate",
            Self::Enum { .. } => "enum",
            Self::Hex { .. } => "hex",
            Self::Int { .. } => "int",
            Self::String => "string",
        }
    }
}

/// Value of a tristate item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tristate {
    /// Built in (`y`)
    Yes,
    /// Built as a module (`m`)
    Module,
    /// Disabled (`n`)
    No,
}

impl Tristate {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "y" => Some(Self::Yes),
            "m" => Some(Self::Module),
            "n" => Some(Self::No),
            _ => None,
        }
    }
}

/// Typed view of an item's current value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValue {
    /// Bool item value
    Bool(bool),
    /// Tristate item value
    Tristate(Tristate),
    /// Selected option of an enum item
    Enum {
        /// Position in the option list
        index: usize,
        /// Option text
        text: String,
    },
    /// Hex item value; `text` is the stored spelling
    Hex {
        /// Numeric value
        value: u64,
        /// Stored text, e.g. `0x1F`
        text: String,
    },
    /// Int item value
    Int(i64),
    /// String item value
    String(String),
}

/// A typed configuration item
#[derive(Debug, Clone)]
pub struct ConfigItem {
    name: String,
    kind: ItemKind,
    default: Option<String>,
    user: Option<String>,
    prompt: String,
    help: Vec<String>,
    depend: IndexMap<String, JsonValue>,
    observed: IndexMap<String, String>,
    visible: bool,
    forced: bool,
    import: bool,
    gen_list: IndexMap<String, GenExpr>,
}

impl ConfigItem {
    /// Build an item of `kind_name` from its schema fields
    ///
    /// Visibility starts as `true` when the dependency map is empty and
    /// `false` otherwise; the tree refreshes it against the store right after
    /// construction.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationLogic` when a forced item has no default, a range
    /// is malformed, or a generation expression is not recognized.
    pub fn from_spec(name: &str, kind_name: &str, spec: ItemSpec) -> Result<Self> {
        let kind = match kind_name {
            "bool" => ItemKind::Bool,
            "tristate" => ItemKind::Tristate,
            "enum" => ItemKind::Enum {
                options: spec.options.clone(),
            },
            "hex" => ItemKind::Hex {
                range: parse_hex_range(name, &spec.range)?,
            },
            "int" => ItemKind::Int {
                range: parse_int_range(name, &spec.range)?,
            },
            "string" => ItemKind::String,
            other => {
                return Err(Error::ConfigurationLogic(format!(
                    "'{other}' is not an item type (item {name})"
                )));
            }
        };

        let default = spec.default.as_ref().and_then(default_text);
        if spec.force && default.as_deref().is_none_or(str::is_empty) {
            return Err(Error::ConfigurationLogic(format!(
                "forced item {name} must have a non-empty default"
            )));
        }

        let mut gen_list = IndexMap::with_capacity(spec.gen_list.len());
        for (key, expr) in spec.gen_list {
            let parsed = expr.parse::<GenExpr>().map_err(|e| {
                Error::ConfigurationLogic(format!("{e} in gen-list of {name} (key {key})"))
            })?;
            gen_list.insert(key, parsed);
        }

        let prompt = spec
            .prompt
            .unwrap_or_else(|| default_prompt(name, &kind));
        let help = spec
            .help
            .unwrap_or_else(|| vec![DEFAULT_HELP.to_string()]);

        Ok(Self {
            name: name.to_string(),
            visible: spec.depend.is_empty(),
            kind,
            default,
            user: None,
            prompt,
            help,
            depend: spec.depend,
            observed: IndexMap::new(),
            forced: spec.force,
            import: spec.import,
            gen_list,
        })
    }

    /// Item name, also the variable it publishes
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind and constraints
    #[must_use]
    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    /// Raw default as written in the schema (an index for enums)
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Value assigned by the user, if any
    #[must_use]
    pub fn user_value(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Prompt text
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Help lines
    #[must_use]
    pub fn help(&self) -> &[String] {
        &self.help
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

    /// Whether the item adopts its default without prompting
    #[must_use]
    pub fn is_forced(&self) -> bool {
        self.forced
    }

    /// Whether the item seeds itself from the environment
    #[must_use]
    pub fn imports_env(&self) -> bool {
        self.import
    }

    /// Generation map
    #[must_use]
    pub fn gen_list(&self) -> &IndexMap<String, GenExpr> {
        &self.gen_list
    }

    /// Options of an enum item; empty for other kinds
    #[must_use]
    pub fn options(&self) -> &[String] {
        match &self.kind {
            ItemKind::Enum { options } => options,
            _ => &[],
        }
    }

    /// Index of `text` among the enum options
    #[must_use]
    pub fn option_index(&self, text: &str) -> Option<usize> {
        self.options().iter().position(|o| o == text)
    }

    /// Check `raw` against this item's rules and return the canonical value
    ///
    /// For enums the canonical value is the option text at the given index;
    /// ints are normalized to plain decimal.
    pub fn validate(&self, raw: &str) -> std::result::Result<String, ValidationError> {
        let invalid = |reason: String| ValidationError::new(&self.name, reason);

        match &self.kind {
            ItemKind::Bool => match raw {
                "y" | "n" => Ok(raw.to_string()),
                _ => Err(invalid("value should be 'y' or 'n'".to_string())),
            },
            ItemKind::Tristate => match Tristate::parse(raw) {
                Some(_) => Ok(raw.to_string()),
                None => Err(invalid("value should be one of (y/m/n)".to_string())),
            },
            ItemKind::Enum { options } => {
                let upper = options.len().saturating_sub(1);
                let index = raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| invalid(format!("value should be an index within 0~{upper}")))?;
                options
                    .get(index)
                    .cloned()
                    .ok_or_else(|| invalid(format!("value should be within 0~{upper}")))
            }
            ItemKind::Hex { range } => {
                if !HEX_PATTERN.is_match(raw) {
                    return Err(invalid(
                        "value should be formatted as '0x[0-9a-fA-F]'".to_string(),
                    ));
                }
                let value = u64::from_str_radix(&raw[2..], 16)
                    .map_err(|_| invalid("value does not fit in 64 bits".to_string()))?;
                if let Some((min, max)) = range
                    && (value < *min || value > *max)
                {
                    return Err(invalid(format!(
                        "value should be within 0x{min:x}~0x{max:x}"
                    )));
                }
                Ok(raw.to_string())
            }
            ItemKind::Int { range } => {
                let value = raw
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| invalid("value should be a decimal integer".to_string()))?;
                if let Some((min, max)) = range
                    && (value < *min || value > *max)
                {
                    return Err(invalid(format!("value should between {min} ~ {max}")));
                }
                Ok(value.to_string())
            }
            ItemKind::String => {
                if raw.is_empty() {
                    Err(invalid("string type should not be empty".to_string()))
                } else {
                    Ok(raw.to_string())
                }
            }
        }
    }

    /// Validate `raw` and make it the user value
    ///
    /// Returns the canonical value to publish. The tree is responsible for
    /// publishing it into the store.
    pub(crate) fn assign(&mut self, raw: &str) -> std::result::Result<String, ValidationError> {
        let value = self.validate(raw)?;
        self.user = Some(value.clone());
        Ok(value)
    }

    /// Canonical current value: the user value, else the validated default
    #[must_use]
    pub fn current_value(&self) -> Option<String> {
        if let Some(user) = &self.user {
            return Some(user.clone());
        }
        self.default
            .as_deref()
            .and_then(|default| self.validate(default).ok())
    }

    /// Typed view of [`current_value`](Self::current_value)
    #[must_use]
    pub fn typed_value(&self) -> Option<ItemValue> {
        let text = self.current_value()?;
        match &self.kind {
            ItemKind::Bool => Some(ItemValue::Bool(text == "y")),
            ItemKind::Tristate => Tristate::parse(&text).map(ItemValue::Tristate),
            ItemKind::Enum { .. } => self
                .option_index(&text)
                .map(|index| ItemValue::Enum { index, text }),
            ItemKind::Hex { .. } => u64::from_str_radix(text.get(2..)?, 16)
                .ok()
                .map(|value| ItemValue::Hex { value, text }),
            ItemKind::Int { .. } => text.parse().ok().map(ItemValue::Int),
            ItemKind::String => Some(ItemValue::String(text)),
        }
    }

    /// Recompute visibility from the store
    pub fn refresh_visibility<K>(&mut self, store: &VariableStore<K>)
    where
        K: Copy + Eq + fmt::Debug,
    {
        self.visible = store.check_dependency(&self.depend);
    }

    /// React to a change of a subscribed variable
    ///
    /// Only dependency variables matter. The observed value is recorded and
    /// visibility recomputed; nothing is published in response.
    pub fn on_update_var<K>(&mut self, name: &str, value: &str, store: &VariableStore<K>)
    where
        K: Copy + Eq + fmt::Debug,
    {
        if self.depend.contains_key(name) {
            self.observed.insert(name.to_string(), value.to_string());
            self.refresh_visibility(store);
            tracing::debug!(item = %self.name, visible = self.visible, "visibility updated");
        }
    }

    /// Last observed values of dependency variables
    #[must_use]
    pub fn observed(&self) -> &IndexMap<String, String> {
        &self.observed
    }

    /// Apply a cross-type conversion to the current value
    ///
    /// # Errors
    ///
    /// Returns `Conversion` when the item has no value, or when a string item
    /// holds text that cannot be read as a number.
    pub fn convert(&self, conversion: Conversion) -> Result<String> {
        let conversion_error = |value: &str| Error::Conversion {
            item: self.name.clone(),
            conversion: conversion.keyword().to_string(),
            value: value.to_string(),
        };
        let value = self.typed_value().ok_or_else(|| conversion_error(""))?;

        let converted = match (&value, conversion) {
            (ItemValue::Bool(b), Conversion::Int) => u8::from(*b).to_string(),
            (ItemValue::Bool(b), Conversion::Hex) => (if *b { "0x01" } else { "0x00" }).to_string(),
            (ItemValue::Bool(b), Conversion::String) => {
                (if *b { "TRUE" } else { "FALSE" }).to_string()
            }
            (ItemValue::Bool(b), Conversion::Bool | Conversion::Tristate) => yes_no(*b),

            (ItemValue::Tristate(t), Conversion::Int) => match t {
                Tristate::Yes => "2",
                Tristate::Module => "0",
                Tristate::No => "1",
            }
            .to_string(),
            (ItemValue::Tristate(t), Conversion::Hex) => match t {
                Tristate::Yes => "0x2",
                Tristate::Module => "0x0",
                Tristate::No => "0x1",
            }
            .to_string(),
            (ItemValue::Tristate(t), Conversion::Bool) => yes_no(*t != Tristate::No),
            (ItemValue::Tristate(t), Conversion::String) => match t {
                Tristate::Yes => "STATIC",
                Tristate::Module => "DYNAMIC",
                Tristate::No => "NONE",
            }
            .to_string(),
            (ItemValue::Tristate(t), Conversion::Tristate) => match t {
                Tristate::Yes => "y",
                Tristate::Module => "m",
                Tristate::No => "n",
            }
            .to_string(),

            (ItemValue::Enum { index, .. }, Conversion::Int) => index.to_string(),
            (ItemValue::Enum { index, .. }, Conversion::Hex) => format!("{index:x}"),
            (ItemValue::Enum { text, .. }, Conversion::String) => format!("\"{text}\""),
            (ItemValue::Enum { .. }, Conversion::Bool | Conversion::Tristate) => yes_no(true),

            (ItemValue::Hex { value, .. }, Conversion::Bool | Conversion::Tristate) => {
                yes_no(*value != 0)
            }
            (ItemValue::Hex { value, .. }, Conversion::Int) => value.to_string(),
            (ItemValue::Hex { text, .. }, Conversion::Hex | Conversion::String) => text.clone(),

            (ItemValue::Int(v), Conversion::Bool | Conversion::Tristate) => yes_no(*v != 0),
            (ItemValue::Int(v), Conversion::Hex) => {
                let sign = if *v < 0 { "-" } else { "" };
                format!("{sign}{:x}", v.unsigned_abs())
            }
            (ItemValue::Int(v), Conversion::Int | Conversion::String) => v.to_string(),

            (ItemValue::String(_), Conversion::Bool | Conversion::Tristate) => {
                yes_no(self.visible)
            }
            (ItemValue::String(text), Conversion::Int) => {
                if self.visible {
                    parse_int_auto(text)
                        .ok_or_else(|| conversion_error(text))?
                        .to_string()
                } else {
                    "0".to_string()
                }
            }
            (ItemValue::String(text), Conversion::Hex) => {
                if self.visible {
                    let digits = text
                        .strip_prefix("0x")
                        .or_else(|| text.strip_prefix("0X"))
                        .unwrap_or(text);
                    let value =
                        u64::from_str_radix(digits, 16).map_err(|_| conversion_error(text))?;
                    format!("{value:x}")
                } else {
                    "0x00".to_string()
                }
            }
            (ItemValue::String(text), Conversion::String) => format!("\"{text}\""),
        };

        Ok(converted)
    }

    /// Evaluate one generation expression against this item
    pub fn evaluate(&self, expr: GenExpr) -> Result<String> {
        match expr {
            GenExpr::SelfValue => self.current_value().ok_or_else(|| Error::Conversion {
                item: self.name.clone(),
                conversion: "self".to_string(),
                value: String::new(),
            }),
            GenExpr::Convert(conversion) => self.convert(conversion),
            GenExpr::Rand(bytes) => Ok(generate::random_bytes_value(bytes).to_string()),
            GenExpr::Now => Ok(generate::unix_now().to_string()),
        }
    }

    /// Resolve the whole generation map
    ///
    /// Items without a current value produce no entries.
    pub fn resolved_gen_list(&self) -> Result<Vec<(String, String)>> {
        if self.gen_list.is_empty() {
            return Ok(Vec::new());
        }
        if self.current_value().is_none() {
            tracing::debug!(item = %self.name, "no value, skipping gen-list");
            return Ok(Vec::new());
        }
        self.gen_list
            .iter()
            .map(|(key, expr)| Ok((key.clone(), self.evaluate(*expr)?)))
            .collect()
    }
}

impl fmt::Display for ConfigItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let deps: Vec<String> = self
            .depend
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        writeln!(f, "name : {} ", self.name)?;
        writeln!(f, "default value : {}", self.default.as_deref().unwrap_or(""))?;
        writeln!(f, "user value : {}", self.user.as_deref().unwrap_or("None"))?;
        writeln!(f, "depends on : {{{}}}", deps.join(", "))?;
        writeln!(f, "is_visible : {}", self.visible)
    }
}

fn yes_no(b: bool) -> String {
    (if b { "y" } else { "n" }).to_string()
}

/// Integer literal with an optional `0x`/`0o`/`0b` prefix
fn parse_int_auto(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let lower = body.to_ascii_lowercase();
    let magnitude = if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()?
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()?
    } else {
        lower.parse::<i64>().ok()?
    };
    Some(if negative { -magnitude } else { magnitude })
}

fn default_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(yes_no(*b)),
        _ => None,
    }
}

fn default_prompt(name: &str, kind: &ItemKind) -> String {
    match kind {
        ItemKind::Bool => format!("Use {name} (y/n)"),
        ItemKind::Tristate => format!("Use {name} (y/m/n)"),
        ItemKind::Enum { options } => format!("Choose Option 0~{}", options.len()),
        ItemKind::Hex { .. } => format!("Input Hex Value for {name}"),
        ItemKind::Int { .. } => format!("Input Integer Value for {name}"),
        ItemKind::String => format!("Enter {name} (string)"),
    }
}

fn range_pair<'a>(
    name: &str,
    range: &'a [JsonValue],
) -> Result<Option<(&'a JsonValue, &'a JsonValue)>> {
    match range {
        [] => Ok(None),
        [min, max] => Ok(Some((min, max))),
        _ => Err(Error::ConfigurationLogic(format!(
            "range of {name} must have exactly two elements"
        ))),
    }
}

fn parse_hex_range(name: &str, range: &[JsonValue]) -> Result<Option<(u64, u64)>> {
    let Some((min, max)) = range_pair(name, range)? else {
        return Ok(None);
    };
    let bound = |v: &JsonValue| -> Result<u64> {
        match v {
            JsonValue::String(s) if HEX_PATTERN.is_match(s) => {
                u64::from_str_radix(&s[2..], 16).map_err(|_| {
                    Error::ConfigurationLogic(format!("range bound {s} of {name} overflows"))
                })
            }
            JsonValue::Number(n) => n.as_u64().ok_or_else(|| {
                Error::ConfigurationLogic(format!("range bound {n} of {name} is not unsigned"))
            }),
            other => Err(Error::ConfigurationLogic(format!(
                "value in range attribute of {name} should be formatted as \
                 '0x[0-9a-fA-F]' (got {other})"
            ))),
        }
    };
    Ok(Some((bound(min)?, bound(max)?)))
}

fn parse_int_range(name: &str, range: &[JsonValue]) -> Result<Option<(i64, i64)>> {
    let Some((min, max)) = range_pair(name, range)? else {
        return Ok(None);
    };
    let bound = |v: &JsonValue| -> Result<i64> {
        let parsed = match v {
            JsonValue::Number(n) => n.as_i64(),
            JsonValue::String(s) => parse_int_auto(s),
            _ => None,
        };
        parsed.ok_or_else(|| {
            Error::ConfigurationLogic(format!("range bound {v} of {name} is not an integer"))
        })
    };
    Ok(Some((bound(min)?, bound(max)?)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    fn item(kind: &str, spec: serde_json::Value) -> ConfigItem {
        let spec: ItemSpec = serde_json::from_value(spec).unwrap();
        ConfigItem::from_spec("X", kind, spec).unwrap()
    }

    fn with_value(kind: &str, spec: serde_json::Value, raw: &str) -> ConfigItem {
        let mut it = item(kind, spec);
        it.assign(raw).unwrap();
        it
    }

    #[test]
    fn test_bool_validation() {
        let it = item("bool", json!({}));
        assert_eq!(it.validate("y").unwrap(), "y");
        assert_eq!(it.validate("n").unwrap(), "n");
        assert!(it.validate("m").is_err());
        assert!(it.validate("yes").is_err());
        assert!(it.validate("").is_err());
    }

    #[test]
    fn test_tristate_validation() {
        let it = item("tristate", json!({}));
        for ok in ["y", "m", "n"] {
            assert_eq!(it.validate(ok).unwrap(), ok);
        }
        assert!(it.validate("Y").is_err());
    }

    #[test]
    fn test_enum_stores_option_text() {
        let mut it = item("enum", json!({ "enum": ["low", "mid", "high"] }));
        assert_eq!(it.assign("1").unwrap(), "mid");
        assert_eq!(it.user_value(), Some("mid"));
        assert!(it.validate("3").is_err());
        assert!(it.validate("-1").is_err());
        assert!(it.validate("mid").is_err());
    }

    #[test]
    fn test_enum_index_round_trip() {
        let options = ["a", "b", "c", "d"];
        let mut it = item("enum", json!({ "enum": options }));
        for i in 0..options.len() {
            it.assign(&i.to_string()).unwrap();
            assert_eq!(it.convert(Conversion::Int).unwrap(), i.to_string());
        }
    }

    #[test]
    fn test_hex_validation_and_inclusive_range() {
        let it = item("hex", json!({ "range": ["0x10", "0x20"] }));
        assert!(it.validate("0x10").is_ok());
        assert!(it.validate("0x20").is_ok());
        assert!(it.validate("0x1A").is_ok());
        assert!(it.validate("0xf").is_err());
        assert!(it.validate("0x21").is_err());
        assert!(it.validate("16").is_err());
        assert!(it.validate("0x").is_err());
        assert!(it.validate("0x1g").is_err());
    }

    #[test]
    fn test_int_validation_and_range() {
        let it = item("int", json!({ "range": [-5, 5] }));
        assert_eq!(it.validate("-5").unwrap(), "-5");
        assert_eq!(it.validate(" 5 ").unwrap(), "5");
        assert_eq!(it.validate("+3").unwrap(), "3");
        assert!(it.validate("6").is_err());
        assert!(it.validate("-6").is_err());
        assert!(it.validate("1.5").is_err());
        assert!(it.validate("0x3").is_err());
    }

    #[test]
    fn test_string_rejects_empty() {
        let it = item("string", json!({}));
        assert!(it.validate("").is_err());
        assert_eq!(it.validate("hello").unwrap(), "hello");
    }

    #[test]
    fn test_forced_without_default_is_logic_error() {
        let spec: ItemSpec = serde_json::from_value(json!({ "force": true })).unwrap();
        let err = ConfigItem::from_spec("F", "bool", spec).unwrap_err();
        assert!(matches!(err, Error::ConfigurationLogic(_)));

        let spec: ItemSpec =
            serde_json::from_value(json!({ "force": "y", "default": "" })).unwrap();
        assert!(ConfigItem::from_spec("F", "bool", spec).is_err());

        let spec: ItemSpec =
            serde_json::from_value(json!({ "force": true, "default": "y" })).unwrap();
        assert!(ConfigItem::from_spec("F", "bool", spec).unwrap().is_forced());
    }

    #[test]
    fn test_malformed_ranges() {
        let spec: ItemSpec = serde_json::from_value(json!({ "range": ["0x1"] })).unwrap();
        assert!(ConfigItem::from_spec("H", "hex", spec).is_err());

        let spec: ItemSpec = serde_json::from_value(json!({ "range": ["1", "0x2"] })).unwrap();
        assert!(ConfigItem::from_spec("H", "hex", spec).is_err());

        let spec: ItemSpec = serde_json::from_value(json!({ "range": ["a", 2] })).unwrap();
        assert!(ConfigItem::from_spec("I", "int", spec).is_err());
    }

    #[test]
    fn test_unknown_gen_expression_is_rejected() {
        let spec: ItemSpec =
            serde_json::from_value(json!({ "gen-list": { "K": "os.system('x')" } })).unwrap();
        assert!(ConfigItem::from_spec("G", "bool", spec).is_err());
    }

    #[test]
    fn test_default_prompts_and_help() {
        assert_eq!(item("bool", json!({})).prompt(), "Use X (y/n)");
        assert_eq!(item("tristate", json!({})).prompt(), "Use X (y/m/n)");
        assert_eq!(
            item("enum", json!({ "enum": ["a", "b"] })).prompt(),
            "Choose Option 0~2"
        );
        assert_eq!(item("hex", json!({})).prompt(), "Input Hex Value for X");
        assert_eq!(item("int", json!({})).prompt(), "Input Integer Value for X");
        assert_eq!(item("string", json!({})).prompt(), "Enter X (string)");
        assert_eq!(item("bool", json!({})).help(), &["No Help Message".to_string()]);
        assert_eq!(item("bool", json!({ "prompt": "Custom" })).prompt(), "Custom");
    }

    #[test]
    fn test_current_value_falls_back_to_default() {
        let it = item("enum", json!({ "enum": ["a", "b"], "default": 1 }));
        assert_eq!(it.default_value(), Some("1"));
        assert_eq!(it.current_value().as_deref(), Some("b"));

        let it = item("int", json!({ "default": 42 }));
        assert_eq!(it.typed_value(), Some(ItemValue::Int(42)));

        assert!(item("string", json!({})).current_value().is_none());
    }

    #[test]
    fn test_bool_conversions() {
        let y = with_value("bool", json!({}), "y");
        assert_eq!(y.convert(Conversion::Int).unwrap(), "1");
        assert_eq!(y.convert(Conversion::Hex).unwrap(), "0x01");
        assert_eq!(y.convert(Conversion::String).unwrap(), "TRUE");
        assert_eq!(y.convert(Conversion::Tristate).unwrap(), "y");

        let n = with_value("bool", json!({}), "n");
        assert_eq!(n.convert(Conversion::Int).unwrap(), "0");
        assert_eq!(n.convert(Conversion::Hex).unwrap(), "0x00");
        assert_eq!(n.convert(Conversion::String).unwrap(), "FALSE");
        assert_eq!(n.convert(Conversion::Tristate).unwrap(), "n");
    }

    #[test]
    fn test_tristate_conversions() {
        let m = with_value("tristate", json!({}), "m");
        assert_eq!(m.convert(Conversion::Int).unwrap(), "0");
        assert_eq!(m.convert(Conversion::Bool).unwrap(), "y");
        assert_eq!(m.convert(Conversion::String).unwrap(), "DYNAMIC");
        assert_eq!(m.convert(Conversion::Hex).unwrap(), "0x0");

        let y = with_value("tristate", json!({}), "y");
        assert_eq!(y.convert(Conversion::Int).unwrap(), "2");
        assert_eq!(y.convert(Conversion::Hex).unwrap(), "0x2");
        assert_eq!(y.convert(Conversion::String).unwrap(), "STATIC");

        let n = with_value("tristate", json!({}), "n");
        assert_eq!(n.convert(Conversion::Int).unwrap(), "1");
        assert_eq!(n.convert(Conversion::Hex).unwrap(), "0x1");
        assert_eq!(n.convert(Conversion::Bool).unwrap(), "n");
        assert_eq!(n.convert(Conversion::String).unwrap(), "NONE");
    }

    #[test]
    fn test_enum_conversions() {
        let options = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l"];
        let it = with_value("enum", json!({ "enum": options }), "11");
        assert_eq!(it.convert(Conversion::Int).unwrap(), "11");
        assert_eq!(it.convert(Conversion::Hex).unwrap(), "b");
        assert_eq!(it.convert(Conversion::String).unwrap(), "\"l\"");
        assert_eq!(it.convert(Conversion::Bool).unwrap(), "y");
        assert_eq!(it.convert(Conversion::Tristate).unwrap(), "y");
    }

    #[test]
    fn test_hex_conversions() {
        let zero = with_value("hex", json!({}), "0x0");
        assert_eq!(zero.convert(Conversion::Bool).unwrap(), "n");
        assert_eq!(zero.convert(Conversion::Tristate).unwrap(), "n");

        let it = with_value("hex", json!({}), "0x1F");
        assert_eq!(it.convert(Conversion::Bool).unwrap(), "y");
        assert_eq!(it.convert(Conversion::Int).unwrap(), "31");
        assert_eq!(it.convert(Conversion::String).unwrap(), "0x1F");
    }

    #[test]
    fn test_int_conversions() {
        let zero = with_value("int", json!({}), "0");
        assert_eq!(zero.convert(Conversion::Bool).unwrap(), "n");

        let it = with_value("int", json!({}), "255");
        assert_eq!(it.convert(Conversion::Tristate).unwrap(), "y");
        assert_eq!(it.convert(Conversion::Hex).unwrap(), "ff");
        assert_eq!(it.convert(Conversion::String).unwrap(), "255");

        let negative = with_value("int", json!({ "range": [-100, 100] }), "-16");
        assert_eq!(negative.convert(Conversion::Hex).unwrap(), "-10");
        assert_eq!(negative.convert(Conversion::Int).unwrap(), "-16");
        assert_eq!(negative.convert(Conversion::Bool).unwrap(), "y");
    }

    #[test]
    fn test_string_conversions_follow_visibility() {
        let mut it = with_value("string", json!({ "depend": { "A": "y" } }), "0x10");
        assert!(!it.is_visible());
        assert_eq!(it.convert(Conversion::Bool).unwrap(), "n");
        assert_eq!(it.convert(Conversion::Int).unwrap(), "0");
        assert_eq!(it.convert(Conversion::Hex).unwrap(), "0x00");

        it.visible = true;
        assert_eq!(it.convert(Conversion::Bool).unwrap(), "y");
        assert_eq!(it.convert(Conversion::Int).unwrap(), "16");
        assert_eq!(it.convert(Conversion::Hex).unwrap(), "10");
        assert_eq!(it.convert(Conversion::String).unwrap(), "\"0x10\"");

        let text = with_value("string", json!({}), "hello");
        assert!(matches!(
            text.convert(Conversion::Int),
            Err(Error::Conversion { .. })
        ));
    }

    #[test]
    fn test_resolved_gen_list() {
        let it = with_value(
            "bool",
            json!({ "gen-list": { "X_ON": "to_int", "X_RAW": "self", "X_TIME": "now()" } }),
            "y",
        );
        let entries = it.resolved_gen_list().unwrap();
        assert_eq!(entries[0], ("X_ON".to_string(), "1".to_string()));
        assert_eq!(entries[1], ("X_RAW".to_string(), "y".to_string()));
        assert!(entries[2].1.parse::<i64>().unwrap() > 0);

        let unset = item("int", json!({ "gen-list": { "K": "to_hex" } }));
        assert!(unset.resolved_gen_list().unwrap().is_empty());
    }

    #[test]
    fn test_parse_int_auto() {
        assert_eq!(parse_int_auto("42"), Some(42));
        assert_eq!(parse_int_auto("-0x10"), Some(-16));
        assert_eq!(parse_int_auto("0b101"), Some(5));
        assert_eq!(parse_int_auto("0o17"), Some(15));
        assert_eq!(parse_int_auto("abc"), None);
    }
}
