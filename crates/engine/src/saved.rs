//! Reader for previously written `.config` files

use indexmap::IndexMap;
use jconfig_core::{Error, Result};
use std::fs;
use std::path::Path;

const PREFIX: &str = "CONFIG_";

/// Parse `CONFIG_<name>=<value>` lines into an ordered map keyed by `<name>`
///
/// Comments, `include` lines, the `DEF+=` line, and anything else without the
/// prefix are ignored. A later line for the same name wins.
#[must_use]
pub fn parse(content: &str) -> IndexMap<String, String> {
    let mut saved = IndexMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        let Some(rest) = line.strip_prefix(PREFIX) else {
            continue;
        };
        let Some((name, value)) = rest.split_once('=') else {
            continue;
        };
        saved.insert(name.trim().to_string(), value.to_string());
    }
    saved
}

/// Read and parse a saved configuration file
pub fn load(path: &Path) -> Result<IndexMap<String, String>> {
    if !path.is_file() {
        return Err(Error::file_not_found(path));
    }
    let content = fs::read_to_string(path)?;
    let saved = parse(&content);
    tracing::debug!(path = %path.display(), count = saved.len(), "loaded saved configuration");
    Ok(saved)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_saved_config() {
        let saved = parse(
            "CONFIG_USE_UART=y\n\
             # CONFIG_OLD=n\n\
             CONFIG_BANNER=hello=world\n\
             include /proj/uart.mk\n\
             \n\
             DEF+= UART_ON=1\n\
             CONFIG_BROKEN\n",
        );
        assert_eq!(saved.len(), 2);
        assert_eq!(saved.get("USE_UART").unwrap(), "y");
        assert_eq!(saved.get("BANNER").unwrap(), "hello=world");
    }

    #[test]
    fn test_load_missing() {
        assert!(load(Path::new("/no/such/.config")).is_err());
    }
}
