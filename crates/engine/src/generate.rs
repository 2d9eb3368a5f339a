//! Generation-map expressions
//!
//! Items may carry a `gen-list` mapping output macro names to a derivation
//! keyword. Expressions are looked up in a fixed table, never evaluated:
//!
//! | Expression | Result |
//! |---|---|
//! | `self`, `this` | the item's current value |
//! | `to_int`, `to_hex`, `to_bool`, `to_tristate`, `to_string` | cross-type conversion |
//! | `rand(n)` | random unsigned value of `n` bytes (1..=16) |
//! | `now()`, `ctime()` | current unix time in seconds |
//!
//! The conversion keywords may also be written as calls on the value, e.g.
//! `to_int(this)`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Target of a cross-type conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conversion {
    /// Decimal integer
    Int,
    /// Hexadecimal text
    Hex,
    /// `y`/`n`
    Bool,
    /// `y`/`m`/`n`
    Tristate,
    /// Literal text
    String,
}

impl Conversion {
    /// Keyword naming this conversion
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Int => "to_int",
            Self::Hex => "to_hex",
            Self::Bool => "to_bool",
            Self::Tristate => "to_tristate",
            Self::String => "to_string",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "to_int" => Self::Int,
            "to_hex" => Self::Hex,
            "to_bool" => Self::Bool,
            "to_tristate" => Self::Tristate,
            "to_string" => Self::String,
            _ => return None,
        })
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A parsed derivation expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenExpr {
    /// The item's value, unchanged
    SelfValue,
    /// A cross-type conversion of the item's value
    Convert(Conversion),
    /// Random value of the given number of bytes
    Rand(u8),
    /// Current unix timestamp
    Now,
}

/// Expression text that is not in the keyword table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown generation expression '{0}'")]
pub struct ParseGenExprError(pub String);

impl FromStr for GenExpr {
    type Err = ParseGenExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let err = || ParseGenExprError(s.to_string());

        let (head, arg) = match text.split_once('(') {
            Some((head, rest)) => {
                let arg = rest.strip_suffix(')').ok_or_else(err)?;
                (head, Some(arg))
            }
            None => (text.as_str(), None),
        };

        match (head, arg) {
            ("self" | "this", None) => Ok(Self::SelfValue),
            ("now" | "ctime", None | Some("")) => Ok(Self::Now),
            ("rand", Some(n)) => match n.parse::<u8>() {
                Ok(bytes @ 1..=16) => Ok(Self::Rand(bytes)),
                _ => Err(err()),
            },
            (keyword, None | Some("" | "this" | "self")) => {
                Conversion::from_keyword(keyword).map(Self::Convert).ok_or_else(err)
            }
            _ => Err(err()),
        }
    }
}

impl fmt::Display for GenExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfValue => f.write_str("self"),
            Self::Convert(conv) => conv.fmt(f),
            Self::Rand(n) => write!(f, "rand({n})"),
            Self::Now => f.write_str("now()"),
        }
    }
}

/// Random unsigned value with `bytes` significant bytes
pub(crate) fn random_bytes_value(bytes: u8) -> u128 {
    let bits = u32::from(bytes.min(16)) * 8;
    let mask = if bits >= 128 {
        u128::MAX
    } else {
        (1u128 << bits) - 1
    };
    rand::random::<u128>() & mask
}

/// Seconds since the unix epoch
pub(crate) fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!("self".parse::<GenExpr>().unwrap(), GenExpr::SelfValue);
        assert_eq!("this".parse::<GenExpr>().unwrap(), GenExpr::SelfValue);
        assert_eq!(
            "to_int".parse::<GenExpr>().unwrap(),
            GenExpr::Convert(Conversion::Int)
        );
        assert_eq!(
            "to_hex(this)".parse::<GenExpr>().unwrap(),
            GenExpr::Convert(Conversion::Hex)
        );
        assert_eq!(
            " to_string ( self ) ".parse::<GenExpr>().unwrap(),
            GenExpr::Convert(Conversion::String)
        );
        assert_eq!("now()".parse::<GenExpr>().unwrap(), GenExpr::Now);
        assert_eq!("ctime()".parse::<GenExpr>().unwrap(), GenExpr::Now);
        assert_eq!("rand(4)".parse::<GenExpr>().unwrap(), GenExpr::Rand(4));
    }

    #[test]
    fn test_parse_rejects_arbitrary_text() {
        for bad in [
            "__import__('os')",
            "rand(0)",
            "rand(17)",
            "rand()",
            "to_int(other)",
            "to_int(this",
            "",
        ] {
            assert!(bad.parse::<GenExpr>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for expr in [
            GenExpr::SelfValue,
            GenExpr::Convert(Conversion::Tristate),
            GenExpr::Rand(2),
            GenExpr::Now,
        ] {
            assert_eq!(expr.to_string().parse::<GenExpr>().unwrap(), expr);
        }
    }

    #[test]
    fn test_random_value_fits_in_bytes() {
        for _ in 0..32 {
            assert!(random_bytes_value(1) <= 0xff);
            assert!(random_bytes_value(2) <= 0xffff);
        }
    }
}
