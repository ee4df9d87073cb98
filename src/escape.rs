//! Label text escaping for renderer string literals.
//!
//! Every character is written as a hex codepoint escape: `\uXXXX` inside the
//! Basic Multilingual Plane, `\UXXXXXX` above it. The result is pure ASCII
//! with no quotes, spaces or control characters, so it embeds safely in a
//! `-D key_text="..."` argument regardless of the label.
//!
//! [`unescape_text`] is the exact inverse of [`escape_text`].

use crate::error::{Error, Result};

/// Escape `text` into hex codepoint form.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 6);
    for c in text.chars() {
        let cp = c as u32;
        if cp <= 0xFFFF {
            out.push_str(&format!("\\u{cp:04X}"));
        } else {
            out.push_str(&format!("\\U{cp:06X}"));
        }
    }
    out
}

/// Decode hex codepoint escapes back into text.
///
/// Characters other than `\` pass through unchanged. A `\` must start a
/// well-formed `\uXXXX` or `\UXXXXXX` escape naming a valid scalar value.
pub fn unescape_text(escaped: &str) -> Result<String> {
    let mut out = String::with_capacity(escaped.len() / 6 + 1);
    let mut rest = escaped;

    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let offset = escaped.len() - rest.len() + pos;
        let tail = &rest[pos + 1..];

        let width = match tail.chars().next() {
            Some('u') => 4,
            Some('U') => 6,
            Some(other) => {
                return Err(Error::Escape {
                    offset,
                    reason: format!("unsupported escape \\{other}"),
                });
            }
            None => {
                return Err(Error::Escape {
                    offset,
                    reason: "trailing backslash".to_string(),
                });
            }
        };

        let digits = tail.get(1..1 + width).ok_or_else(|| Error::Escape {
            offset,
            reason: format!("expected {width} hex digits"),
        })?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::Escape {
                offset,
                reason: format!("invalid hex digits {digits:?}"),
            });
        }
        let cp = u32::from_str_radix(digits, 16).map_err(|e| Error::Escape {
            offset,
            reason: e.to_string(),
        })?;
        let c = char::from_u32(cp).ok_or_else(|| Error::Escape {
            offset,
            reason: format!("U+{cp:04X} is not a scalar value"),
        })?;
        out.push(c);

        rest = &tail[1 + width..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_ascii_as_bmp_codepoints() {
        assert_eq!(escape_text("Q"), "\\u0051");
        assert_eq!(escape_text("F1"), "\\u0046\\u0031");
        assert_eq!(escape_text(""), "");
    }

    #[test]
    fn escaped_form_has_no_shell_or_quote_hazards() {
        let escaped = escape_text("'   \"\n\t`$");
        assert!(escaped.is_ascii());
        assert!(!escaped.contains('"'));
        assert!(!escaped.contains('\''));
        assert!(!escaped.contains(' '));
        assert!(!escaped.chars().any(|c| c.is_ascii_control()));
    }

    #[test]
    fn escapes_supplementary_plane_with_long_form() {
        assert_eq!(escape_text("\u{1F600}"), "\\U01F600");
    }

    #[test]
    fn round_trips_quotes_and_non_ascii() {
        for text in [
            "'   \"",
            "\"",
            "\u{2191}",
            "\u{2190}\u{2192}",
            "DIAL/DC",
            "\\   |",
            "caf\u{e9} \u{1F600} \"quoted\"",
        ] {
            assert_eq!(unescape_text(&escape_text(text)).unwrap(), text);
        }
    }

    #[test]
    fn unescape_passes_plain_text_through() {
        assert_eq!(unescape_text("abc\\u0021").unwrap(), "abc!");
    }

    #[test]
    fn unescape_rejects_malformed_input() {
        assert!(unescape_text("\\").is_err());
        assert!(unescape_text("\\n").is_err());
        assert!(unescape_text("\\u12").is_err());
        assert!(unescape_text("\\u12G4").is_err());
        assert!(unescape_text("\\uD800").is_err());
        assert!(unescape_text("\\U110000").is_err());
    }

    #[test]
    fn unescape_reports_offset_of_bad_escape() {
        match unescape_text("\\u0041\\x") {
            Err(Error::Escape { offset, .. }) => assert_eq!(offset, 6),
            other => panic!("expected escape error, got {other:?}"),
        }
    }
}
