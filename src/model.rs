//! Core data model.
//!
//! A key descriptor is one keycap to render: a filesystem-safe name, the label
//! text, a font size hint and the key width in keyboard units. Descriptors are
//! built once per run by the catalog and never mutated.

use serde::{Deserialize, Serialize};

/// Font size for keys labelled with a single glyph.
pub const SIZE_1SYM: f32 = 6.0;

/// Font size for keys labelled with a word.
pub const SIZE_TEXT: f32 = 3.0;

// ---------------------------------------------------------------------------
// Key Descriptor
// ---------------------------------------------------------------------------

/// One keycap to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyDescriptor {
    /// Unique identifier. Output filenames are derived from it, so it must
    /// be filesystem-safe.
    pub name: String,

    /// Label printed on the keycap. May be empty.
    pub text: String,

    /// Font size passed to the renderer.
    pub font_size: f32,

    /// Width in standard keyboard units (1u, 1.25u, ...).
    pub unit_width: f32,
}

impl KeyDescriptor {
    pub fn new(
        name: impl Into<String>,
        text: impl Into<String>,
        font_size: f32,
        unit_width: f32,
    ) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            font_size,
            unit_width,
        }
    }
}

// ---------------------------------------------------------------------------
// Output Mode
// ---------------------------------------------------------------------------

/// How many files each key produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Separate keycap and label files, for two-colour printing.
    #[default]
    Split,
    /// One file holding keycap and label together.
    Combined,
}

impl OutputMode {
    /// Parts rendered per key in this mode.
    pub fn parts(self) -> &'static [RenderPart] {
        match self {
            OutputMode::Split => &[RenderPart::Keycap, RenderPart::Label],
            OutputMode::Combined => &[RenderPart::Combined],
        }
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OutputMode::Split => "split",
            OutputMode::Combined => "combined",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "split" => Ok(OutputMode::Split),
            "combined" => Ok(OutputMode::Combined),
            other => Err(format!("unknown output mode: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Render Part
// ---------------------------------------------------------------------------

/// Which geometry a single render job emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderPart {
    Combined,
    Keycap,
    Label,
}

impl RenderPart {
    /// Output filename for a key rendered as this part.
    pub fn file_name(self, key_name: &str) -> String {
        match self {
            RenderPart::Combined => format!("{key_name}.stl"),
            RenderPart::Keycap => format!("{key_name}_keycap.stl"),
            RenderPart::Label => format!("{key_name}_label.stl"),
        }
    }

    /// `(render_keycap, render_label)` flags, or `None` for combined output
    /// which leaves both to the template's defaults.
    pub fn flags(self) -> Option<(bool, bool)> {
        match self {
            RenderPart::Combined => None,
            RenderPart::Keycap => Some((true, false)),
            RenderPart::Label => Some((false, true)),
        }
    }
}

impl std::fmt::Display for RenderPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RenderPart::Combined => "combined",
            RenderPart::Keycap => "keycap",
            RenderPart::Label => "label",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_parts_have_complementary_flags() {
        for part in OutputMode::Split.parts() {
            let (keycap, label) = part.flags().unwrap();
            assert_ne!(keycap, label, "{part} flags must be complementary");
        }
    }

    #[test]
    fn file_names_follow_part() {
        assert_eq!(RenderPart::Combined.file_name("alph_Q"), "alph_Q.stl");
        assert_eq!(RenderPart::Keycap.file_name("alph_Q"), "alph_Q_keycap.stl");
        assert_eq!(RenderPart::Label.file_name("alph_Q"), "alph_Q_label.stl");
    }

    #[test]
    fn output_mode_parses_its_display() {
        for mode in [OutputMode::Split, OutputMode::Combined] {
            assert_eq!(mode.to_string().parse::<OutputMode>().unwrap(), mode);
        }
        assert!("both".parse::<OutputMode>().is_err());
    }
}
