//! Key tables: the constant data the catalog is built from.
//!
//! `KeyTables::default()` is the built-in layout. A TOML file can replace any
//! subset of fields; missing fields keep their built-in values.

use crate::error::{Error, Result};
use crate::model::{KeyDescriptor, SIZE_1SYM, SIZE_TEXT};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyTables {
    /// One 1u key per character.
    pub letters: String,
    /// Unshifted symbols, paired positionally with `symbols_shifted`.
    pub symbols_unshifted: String,
    pub symbols_shifted: String,
    /// Placed between the unshifted and shifted glyph on symbol labels.
    pub symbol_separator: String,
    /// Number of function keys, numbered from 1.
    pub function_keys: u32,
    pub function_key_width: f32,
    /// Font size for letters, symbols and function keys.
    pub glyph_font_size: f32,
    /// Hand-authored named keys, rendered as given.
    pub misc: Vec<KeyDescriptor>,
}

impl Default for KeyTables {
    fn default() -> Self {
        Self {
            letters: "QWERTYUIOPASDFGHJKLZXCVBNM".to_string(),
            symbols_unshifted: r"`1234567890-=[]\;',./".to_string(),
            symbols_shifted: r#"~!@#$%^&*()_+{}|:"<>?"#.to_string(),
            symbol_separator: "   ".to_string(),
            function_keys: 7,
            function_key_width: 1.25,
            glyph_font_size: SIZE_1SYM,
            misc: default_misc(),
        }
    }
}

impl KeyTables {
    /// Load tables from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read key tables {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
            .map_err(|e| Error::Config(format!("bad key tables {}: {e}", path.display())))
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

fn default_misc() -> Vec<KeyDescriptor> {
    let k = KeyDescriptor::new;
    vec![
        k("dial", "DIAL/DC", SIZE_TEXT, 1.25),
        k("exit", "NSCR/EXIT", SIZE_TEXT, 1.25),
        k("esc", "LOC/ESC", SIZE_TEXT, 1.25),
        k("backspace", "BSPACE", SIZE_1SYM, 1.25),
        k("tab", "TAB", SIZE_TEXT, 2.0),
        k("clear", "CLEAR", SIZE_TEXT, 2.0),
        k("ctrl", "CTRL", SIZE_TEXT, 1.0),
        k("alock", "ALOCK", SIZE_TEXT, 1.0),
        k("return", "RETURN", SIZE_TEXT, 2.0),
        k("lshift", "SHIFT", SIZE_TEXT, 2.0),
        k("rshift", "SHIFT", SIZE_TEXT, 2.0),
        k("del", "DEL", SIZE_TEXT, 2.0),
        k("send", "SEND", SIZE_TEXT, 1.25),
        k("print", "PRINT", SIZE_TEXT, 1.25),
        k("space", "", SIZE_1SYM, 6.25),
        k("arrow_u", "\u{2191}", SIZE_1SYM, 1.0),
        k("arrow_d", "\u{2193}", SIZE_1SYM, 1.0),
        k("arrow_l", "\u{2190}", SIZE_1SYM, 1.0),
        k("arrow_r", "\u{2192}", SIZE_1SYM, 1.0),
    ]
}
