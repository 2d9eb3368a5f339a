//! Answer sources for the traversal driver
//!
//! [`ConfigTree::configure`](crate::tree::ConfigTree::configure) decides
//! *which* items need a value; a [`Dialog`] decides *what* the value is. The
//! CLI provides an interactive terminal dialog; this module provides the
//! non-interactive ones.

use crate::item::{ConfigItem, ItemKind};
use indexmap::IndexMap;
use jconfig_core::{Result, ValidationError};

/// Source of raw values for visible, non-forced items
pub trait Dialog {
    /// Raw value for `item`, or `None` to take its default
    ///
    /// `last_error` is set when the previous answer for the same item was
    /// rejected.
    fn ask(&mut self, item: &ConfigItem, last_error: Option<&ValidationError>)
    -> Result<Option<String>>;

    /// Whether a rejected answer should be asked again
    fn retry_on_invalid(&self) -> bool {
        true
    }
}

/// Takes every default without asking
#[derive(Debug, Default, Clone, Copy)]
pub struct Defaults;

impl Dialog for Defaults {
    fn ask(
        &mut self,
        _item: &ConfigItem,
        _last_error: Option<&ValidationError>,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    fn retry_on_invalid(&self) -> bool {
        false
    }
}

/// Answers from a saved configuration, deferring to `fallback` otherwise
///
/// Saved values are canonical item values, so enum option texts are turned
/// back into indices before they are handed to the item.
#[derive(Debug)]
pub struct Replay<D> {
    saved: IndexMap<String, String>,
    fallback: D,
}

impl<D: Dialog> Replay<D> {
    /// Replay `saved` (keyed by item name, without the `CONFIG_` prefix)
    pub fn new(saved: IndexMap<String, String>, fallback: D) -> Self {
        Self { saved, fallback }
    }

    /// The wrapped fallback dialog
    pub fn into_fallback(self) -> D {
        self.fallback
    }

    fn saved_answer(&self, item: &ConfigItem) -> Option<String> {
        let saved = self.saved.get(item.name())?;
        match item.kind() {
            ItemKind::Enum { .. } => match item.option_index(saved) {
                Some(index) => Some(index.to_string()),
                None => {
                    tracing::warn!(
                        item = item.name(),
                        value = %saved,
                        "saved option no longer exists"
                    );
                    None
                }
            },
            _ => Some(saved.clone()),
        }
    }
}

impl<D: Dialog> Dialog for Replay<D> {
    fn ask(
        &mut self,
        item: &ConfigItem,
        last_error: Option<&ValidationError>,
    ) -> Result<Option<String>> {
        if last_error.is_none()
            && let Some(answer) = self.saved_answer(item)
        {
            tracing::debug!(item = item.name(), value = %answer, "replaying saved value");
            return Ok(Some(answer));
        }
        self.fallback.ask(item, last_error)
    }

    fn retry_on_invalid(&self) -> bool {
        self.fallback.retry_on_invalid()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::schema::ItemSpec;
    use serde_json::json;

    fn item(name: &str, kind: &str, spec: serde_json::Value) -> ConfigItem {
        let spec: ItemSpec = serde_json::from_value(spec).unwrap();
        ConfigItem::from_spec(name, kind, spec).unwrap()
    }

    struct Fixed(&'static str);

    impl Dialog for Fixed {
        fn ask(&mut self, _: &ConfigItem, _: Option<&ValidationError>) -> Result<Option<String>> {
            Ok(Some(self.0.to_string()))
        }
    }

    #[test]
    fn test_defaults_never_answers() {
        let it = item("A", "bool", json!({ "default": "y" }));
        assert_eq!(Defaults.ask(&it, None).unwrap(), None);
        assert!(!Defaults.retry_on_invalid());
    }

    #[test]
    fn test_replay_maps_enum_text_to_index() {
        let mut saved = IndexMap::new();
        saved.insert("MODE".to_string(), "safe".to_string());
        saved.insert("SPEED".to_string(), "100".to_string());
        let mut replay = Replay::new(saved, Defaults);

        let mode = item("MODE", "enum", json!({ "enum": ["fast", "safe"] }));
        assert_eq!(replay.ask(&mode, None).unwrap().as_deref(), Some("1"));

        let speed = item("SPEED", "int", json!({}));
        assert_eq!(replay.ask(&speed, None).unwrap().as_deref(), Some("100"));
    }

    #[test]
    fn test_replay_falls_back() {
        let mut replay = Replay::new(IndexMap::new(), Fixed("n"));
        let it = item("B", "bool", json!({}));
        assert_eq!(replay.ask(&it, None).unwrap().as_deref(), Some("n"));
        assert!(replay.retry_on_invalid());
    }

    #[test]
    fn test_replay_defers_after_rejection() {
        let mut saved = IndexMap::new();
        saved.insert("B".to_string(), "maybe".to_string());
        let mut replay = Replay::new(saved, Fixed("y"));
        let it = item("B", "bool", json!({}));

        assert_eq!(replay.ask(&it, None).unwrap().as_deref(), Some("maybe"));
        let err = it.validate("maybe").unwrap_err();
        assert_eq!(replay.ask(&it, Some(&err)).unwrap().as_deref(), Some("y"));
    }

    #[test]
    fn test_replay_unknown_enum_text_falls_back() {
        let mut saved = IndexMap::new();
        saved.insert("MODE".to_string(), "gone".to_string());
        let mut replay = Replay::new(saved, Defaults);
        let mode = item("MODE", "enum", json!({ "enum": ["fast"] }));
        assert_eq!(replay.ask(&mode, None).unwrap(), None);
    }
}
