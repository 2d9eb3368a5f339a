//! Writers for `.config` and the generated header
//!
//! Generated values are computed once by the caller and handed to both
//! writers, so `rand` and `now` entries agree between the two files.

use crate::tree::ConfigTree;
use jconfig_core::Result;
use std::io::Write;

/// Guard macro of the generated header
pub const HEADER_GUARD: &str = "___AUTO_GEN_H";

/// Write the `.config` file
///
/// One `CONFIG_<name>=<value>` line per variable in the store, then one
/// `include` line per recipe, then the `DEF+=` line carrying `generated`.
pub fn write_config<W: Write>(
    out: &mut W,
    tree: &ConfigTree,
    generated: &[(String, String)],
) -> Result<()> {
    for (name, value) in tree.store().iter() {
        writeln!(out, "CONFIG_{name}={value}")?;
    }
    for path in tree.recipe_paths()? {
        writeln!(out, "include {}", path.display())?;
    }
    write!(out, "\nDEF+=")?;
    for (key, value) in generated {
        write!(out, " {key}={value}")?;
    }
    writeln!(out)?;
    Ok(())
}

/// Write the C header with one `#define` per generated entry
pub fn write_header<W: Write>(out: &mut W, generated: &[(String, String)]) -> Result<()> {
    writeln!(out, "#ifndef {HEADER_GUARD}")?;
    writeln!(out, "#define {HEADER_GUARD}")?;
    for (key, value) in generated {
        writeln!(out, "#define {key} {value}")?;
    }
    writeln!(out, "#endif")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::dialog::Defaults;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_header_format() {
        let generated = vec![
            ("UART_ON".to_string(), "1".to_string()),
            ("UART_BASE".to_string(), "0x4000".to_string()),
        ];
        let mut buf = Vec::new();
        write_header(&mut buf, &generated).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "#ifndef ___AUTO_GEN_H\n\
             #define ___AUTO_GEN_H\n\
             #define UART_ON 1\n\
             #define UART_BASE 0x4000\n\
             #endif\n"
        );
    }

    #[test]
    fn test_config_format() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("config.json"),
            r#"{
                "USE_UART": { "type": "bool", "default": "y", "gen-list": { "UART_ON": "to_int" } },
                "BAUD": { "type": "int", "default": 115200 },
                "uart": { "type": "recipe", "path": "./uart.mk" }
            }"#,
        )
        .unwrap();
        fs::write(temp.path().join("uart.mk"), "").unwrap();

        let mut tree = ConfigTree::with_origin("./config.json", temp.path());
        tree.configure(tree.root(), &mut Defaults).unwrap();
        let generated = tree.gen_entries().unwrap();

        let mut buf = Vec::new();
        write_config(&mut buf, &tree, &generated).unwrap();
        let expected = format!(
            "CONFIG_USE_UART=y\nCONFIG_BAUD=115200\ninclude {}\n\nDEF+= UART_ON=1\n",
            temp.path().join("uart.mk").display()
        );
        assert_eq!(String::from_utf8(buf).unwrap(), expected);
    }

    #[test]
    fn test_empty_gen_list() {
        let mut buf = Vec::new();
        write_header(&mut buf, &[]).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "#ifndef ___AUTO_GEN_H\n#define ___AUTO_GEN_H\n#endif\n"
        );
    }
}
