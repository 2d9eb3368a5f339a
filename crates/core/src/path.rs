//! `$VAR` tokens in schema paths
//!
//! Schema paths may reference configuration variables, e.g.
//! `$ROOT/drivers/$ARCH/config.json`. A token is a `$` followed by one or more
//! ASCII letters, digits, or underscores. Tokens whose variable is unknown are
//! kept verbatim so a later pass can resolve them.
//!
//! # Examples
//!
//! ```
//! use jconfig_core::path::{path_vars, substitute};
//!
//! let raw = "$ROOT/drivers/lib$ARCH/config.json";
//! assert_eq!(path_vars(raw), vec!["ROOT".to_string(), "ARCH".to_string()]);
//!
//! let resolved = substitute(raw, |name| (name == "ARCH").then_some("x86"));
//! assert_eq!(resolved, "$ROOT/drivers/libx86/config.json");
//! ```

use regex::{Captures, Regex};
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

static VAR_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([A-Za-z0-9_]+)").expect("variable token pattern is valid")
});

/// Whether `path` still contains a `$` marker
#[must_use]
pub fn has_tokens(path: &str) -> bool {
    path.contains('$')
}

/// Names of the variables referenced by `path`, in order of first appearance
#[must_use]
pub fn path_vars(path: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in VAR_TOKEN.captures_iter(path) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Replace every `$NAME` token for which `lookup` returns a value
///
/// The replacement text is not scanned again, so a single call never expands
/// a token introduced by a substituted value.
pub fn substitute<'a, F>(path: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    if !has_tokens(path) {
        return path.to_string();
    }
    VAR_TOKEN
        .replace_all(path, |caps: &Captures<'_>| {
            lookup(&caps[1]).map_or_else(|| caps[0].to_string(), str::to_string)
        })
        .into_owned()
}

/// Lexically normalize a path, folding `.` and `..` components
///
/// Does not touch the filesystem and does not follow symlinks.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Join `path` onto `base` unless it is already absolute, then normalize
#[must_use]
pub fn join_normalized(base: &Path, path: &str) -> PathBuf {
    normalize(&base.join(path))
}
