//! Line-mode prompts for configuration items
//!
//! Each visible item is announced as `CONFIG_<NAME>`, enum options are listed
//! with their indices, and the user types a value. `h` prints the help text;
//! an empty line takes the default when there is one.

use dialoguer::{Input, theme::ColorfulTheme};
use jconfig_engine::{ConfigItem, Dialog, ItemKind, Result, ValidationError};
use owo_colors::OwoColorize;

/// Input that shows the help text instead of answering
const HELP_KEY: &str = "h";

/// Interactive dialog on the controlling terminal
pub struct TerminalDialog {
    theme: ColorfulTheme,
}

impl Default for TerminalDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TerminalDialog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalDialog").finish_non_exhaustive()
    }
}

impl TerminalDialog {
    /// Create a dialog using the default colorful theme
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    fn read_line(&self, prompt: &str) -> Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| jconfig_engine::Error::Message(format!("Failed to read user input: {e}")))
    }
}

/// Prompt line shown for `item`
pub(crate) fn prompt_line(item: &ConfigItem) -> String {
    match item.kind() {
        ItemKind::Enum { options } => format!(
            "{} (0 ~ {})",
            item.prompt(),
            options.len().saturating_sub(1)
        ),
        _ => item.prompt().to_string(),
    }
}

/// What a line of user input means
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Reply {
    /// Show the help text and ask again
    Help,
    /// Take the default
    Default,
    /// Nothing typed and nothing to fall back on
    NoDefault,
    /// A raw value for validation
    Value(String),
}

pub(crate) fn interpret(item: &ConfigItem, input: &str) -> Reply {
    match input.trim() {
        HELP_KEY => Reply::Help,
        "" if item.default_value().is_some_and(|d| !d.is_empty()) => Reply::Default,
        "" => Reply::NoDefault,
        _ => Reply::Value(input.to_string()),
    }
}

impl Dialog for TerminalDialog {
    fn ask(
        &mut self,
        item: &ConfigItem,
        last_error: Option<&ValidationError>,
    ) -> Result<Option<String>> {
        if let Some(e) = last_error {
            eprintln!("{}", e.to_string().red());
        } else {
            println!("\n{}", format!("CONFIG_{}", item.name()).bold());
            for (index, option) in item.options().iter().enumerate() {
                println!("{index} {option}");
            }
        }

        let prompt = prompt_line(item);
        loop {
            let input = self.read_line(&prompt)?;
            match interpret(item, &input) {
                Reply::Help => print_help(item),
                Reply::NoDefault => {
                    println!("{}", "No default value".yellow());
                    print_help(item);
                }
                Reply::Default => return Ok(None),
                Reply::Value(value) => return Ok(Some(value)),
            }
        }
    }
}

fn print_help(item: &ConfigItem) {
    for line in item.help() {
        println!("{}", line.dimmed());
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use jconfig_engine::schema::ItemSpec;
    use serde_json::json;

    fn item(kind: &str, spec: serde_json::Value) -> ConfigItem {
        let spec: ItemSpec = serde_json::from_value(spec).unwrap();
        ConfigItem::from_spec("X", kind, spec).unwrap()
    }

    #[test]
    fn test_prompt_line_for_enum_lists_range() {
        let it = item("enum", json!({ "enum": ["a", "b", "c"] }));
        assert_eq!(prompt_line(&it), "Choose Option 0~3 (0 ~ 2)");
        assert_eq!(prompt_line(&item("bool", json!({}))), "Use X (y/n)");
    }

    #[test]
    fn test_interpret() {
        let with_default = item("bool", json!({ "default": "y" }));
        let without = item("bool", json!({}));

        assert_eq!(interpret(&with_default, "h"), Reply::Help);
        assert_eq!(interpret(&with_default, ""), Reply::Default);
        assert_eq!(interpret(&without, "  "), Reply::NoDefault);
        assert_eq!(interpret(&without, "n"), Reply::Value("n".to_string()));
    }
}
