//! Key catalog: the ordered list of keys to render.
//!
//! Built from [`KeyTables`] in four groups, in order: letters, symbols,
//! function keys, then the hand-authored named keys. Order only affects
//! console output; every render job is self-contained.

use crate::config::KeyTables;
use crate::error::{Error, Result};
use crate::model::KeyDescriptor;
use std::collections::HashSet;

/// Immutable, validated set of key descriptors with unique names.
#[derive(Debug, Clone)]
pub struct Catalog {
    keys: Vec<KeyDescriptor>,
}

impl Catalog {
    /// Build the catalog from tables.
    ///
    /// # Errors
    ///
    /// Fails if the symbol tables differ in length, a name is not a plain
    /// file name, or two keys share a name. The built-in tables never fail.
    pub fn build(tables: &KeyTables) -> Result<Self> {
        let mut keys = letters(tables);
        keys.extend(symbols(tables)?);
        keys.extend(function_keys(tables));
        keys.extend(tables.misc.iter().cloned());
        Self::from_keys(keys)
    }

    /// Wrap a list of keys, checking that names are safe and unique.
    pub fn from_keys(keys: Vec<KeyDescriptor>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(keys.len());
        for key in &keys {
            if !is_safe_key_name(&key.name) {
                return Err(Error::UnsafeKeyName(key.name.clone()));
            }
            if !seen.insert(key.name.as_str()) {
                return Err(Error::DuplicateKey(key.name.clone()));
            }
        }
        Ok(Self { keys })
    }

    /// Restrict the catalog to the named keys, keeping catalog order.
    pub fn filter<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let wanted: HashSet<&str> = names.iter().map(|n| n.as_ref()).collect();
        if let Some(missing) = wanted.iter().find(|name| self.get(name).is_none()) {
            return Err(Error::UnknownKey(missing.to_string()));
        }
        let keys = self
            .keys
            .iter()
            .filter(|k| wanted.contains(k.name.as_str()))
            .cloned()
            .collect();
        Ok(Self { keys })
    }

    pub fn get(&self, name: &str) -> Option<&KeyDescriptor> {
        self.keys.iter().find(|k| k.name == name)
    }

    pub fn keys(&self) -> &[KeyDescriptor] {
        &self.keys
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyDescriptor> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a KeyDescriptor;
    type IntoIter = std::slice::Iter<'a, KeyDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

fn letters(tables: &KeyTables) -> Vec<KeyDescriptor> {
    tables
        .letters
        .chars()
        .map(|c| {
            KeyDescriptor::new(
                format!("alph_{c}"),
                c.to_string(),
                tables.glyph_font_size,
                1.0,
            )
        })
        .collect()
}

fn symbols(tables: &KeyTables) -> Result<Vec<KeyDescriptor>> {
    let unshifted = tables.symbols_unshifted.chars().count();
    let shifted = tables.symbols_shifted.chars().count();
    if unshifted != shifted {
        return Err(Error::SymbolTableMismatch { unshifted, shifted });
    }

    Ok(tables
        .symbols_unshifted
        .chars()
        .zip(tables.symbols_shifted.chars())
        .map(|(k, s)| {
            let mut buf = [0u8; 4];
            KeyDescriptor::new(
                format!("sym_{}", percent_encode(k.encode_utf8(&mut buf))),
                format!("{k}{}{s}", tables.symbol_separator),
                tables.glyph_font_size,
                1.0,
            )
        })
        .collect())
}

fn function_keys(tables: &KeyTables) -> Vec<KeyDescriptor> {
    (1..=tables.function_keys)
        .map(|n| {
            KeyDescriptor::new(
                format!("f{n}"),
                format!("F{n}"),
                tables.glyph_font_size,
                tables.function_key_width,
            )
        })
        .collect()
}

/// Characters left as-is in derived names. Everything else is `%XX`-encoded.
pub fn is_name_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '~')
}

/// A name usable as a flat file name inside the output directory: non-empty,
/// not `.` or `..`, and made only of safe characters or percent escapes.
pub fn is_safe_key_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name.chars().all(|c| is_name_safe(c) || c == '%')
}

/// Percent-encode every UTF-8 byte of `s` that falls outside the safe set.
pub fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if is_name_safe(c) {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for b in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{b:02X}"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin() -> Catalog {
        Catalog::build(&KeyTables::default()).unwrap()
    }

    #[test]
    fn builtin_catalog_has_fixed_group_sizes() {
        let catalog = builtin();
        let count = |prefix: &str| {
            catalog
                .iter()
                .filter(|k| k.name.starts_with(prefix))
                .count()
        };
        assert_eq!(count("alph_"), 26);
        assert_eq!(count("sym_"), 21);
        assert_eq!(
            catalog
                .iter()
                .filter(|k| k.name.len() == 2 && k.name.starts_with('f'))
                .count(),
            7
        );
        assert_eq!(catalog.len(), 26 + 21 + 7 + 19);
    }

    #[test]
    fn builtin_names_are_unique() {
        let catalog = builtin();
        let names: HashSet<_> = catalog.iter().map(|k| &k.name).collect();
        assert_eq!(names.len(), catalog.len());
    }

    #[test]
    fn symbol_names_are_filename_safe() {
        for key in builtin().iter().filter(|k| k.name.starts_with("sym_")) {
            assert!(
                key.name.chars().all(|c| is_name_safe(c) || c == '%'),
                "unsafe name {}",
                key.name
            );
            assert!(!key.name.contains('/'));
        }
    }

    #[test]
    fn groups_come_in_order() {
        let catalog = builtin();
        let keys = catalog.keys();
        assert_eq!(keys[0].name, "alph_Q");
        assert_eq!(keys[26].name, "sym_%60");
        assert_eq!(keys[47].name, "f1");
        assert_eq!(keys[54].name, "dial");
        assert_eq!(keys.last().unwrap().name, "arrow_r");
    }

    #[test]
    fn symbol_label_pairs_unshifted_and_shifted() {
        let catalog = builtin();
        let slash = catalog.get("sym_%2F").unwrap();
        assert_eq!(slash.text, "/   ?");
        let quote = catalog.get("sym_%27").unwrap();
        assert_eq!(quote.text, "'   \"");
        let minus = catalog.get("sym_-").unwrap();
        assert_eq!(minus.text, "-   _");
    }

    #[test]
    fn function_keys_are_wider() {
        let catalog = builtin();
        let f7 = catalog.get("f7").unwrap();
        assert_eq!(f7.text, "F7");
        assert_eq!(f7.unit_width, 1.25);
        assert!(catalog.get("f8").is_none());
    }

    #[test]
    fn space_has_empty_label() {
        let space = builtin().get("space").cloned().unwrap();
        assert_eq!(space.text, "");
        assert_eq!(space.unit_width, 6.25);
    }

    #[test]
    fn percent_encode_matches_url_quoting() {
        assert_eq!(percent_encode("a"), "a");
        assert_eq!(percent_encode("\\"), "%5C");
        assert_eq!(percent_encode(" "), "%20");
        assert_eq!(percent_encode("\u{2191}"), "%E2%86%91");
        assert_eq!(percent_encode("~.-_"), "~.-_");
    }

    #[test]
    fn mismatched_symbol_tables_fail() {
        let tables = KeyTables {
            symbols_shifted: "!".to_string(),
            ..KeyTables::default()
        };
        assert!(matches!(
            Catalog::build(&tables),
            Err(Error::SymbolTableMismatch {
                unshifted: 21,
                shifted: 1
            })
        ));
    }

    #[test]
    fn duplicate_names_fail() {
        let tables = KeyTables {
            letters: "QQ".to_string(),
            ..KeyTables::default()
        };
        assert!(matches!(Catalog::build(&tables), Err(Error::DuplicateKey(name)) if name == "alph_Q"));
    }

    #[test]
    fn unsafe_letter_is_rejected() {
        let tables = KeyTables {
            letters: "A/".to_string(),
            ..KeyTables::default()
        };
        assert!(matches!(
            Catalog::build(&tables),
            Err(Error::UnsafeKeyName(name)) if name == "alph_/"
        ));
    }

    #[test]
    fn safe_key_names() {
        assert!(is_safe_key_name("sym_%5C"));
        assert!(is_safe_key_name("sym_."));
        assert!(!is_safe_key_name(""));
        assert!(!is_safe_key_name("."));
        assert!(!is_safe_key_name(".."));
        assert!(!is_safe_key_name("../escape"));
        assert!(!is_safe_key_name("a b"));
        assert!(!is_safe_key_name("\u{2191}"));
    }

    #[test]
    fn filter_keeps_order_and_rejects_unknown() {
        let catalog = builtin();
        let subset = catalog.filter(&["space", "alph_A"]).unwrap();
        let names: Vec<_> = subset.iter().map(|k| k.name.as_str()).collect();
        assert_eq!(names, ["alph_A", "space"]);

        assert!(matches!(
            catalog.filter(&["alph_1"]),
            Err(Error::UnknownKey(name)) if name == "alph_1"
        ));
    }
}
