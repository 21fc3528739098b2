use std::{fmt, str::FromStr};

use crate::foundation::error::ComposeError;

/// Blend modes understood by the compositor.
///
/// The set is closed: anything else found in metadata resolves to [`BlendMode::Normal`] through
/// [`BlendMode::resolve`], which also hands back the unrecognized string so the caller can
/// report it.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlendMode {
    /// Top channel replaces base channel; alpha does the mixing.
    #[default]
    Normal,
    /// Group-only mode: children blend straight into the parent context.
    PassThrough,
    /// `a*b/255`.
    Multiply,
    /// `255 - (255-a)*(255-b)/255`.
    Screen,
    /// `min(a, b)`.
    Darken,
    /// `max(a, b)`.
    Lighten,
    /// Hard light with base and top swapped.
    Overlay,
    /// Soft light (square-root variant above mid grey).
    SoftLight,
    /// Multiply below mid grey, screen above, keyed on the top channel.
    HardLight,
    /// Brighten base by dividing through the inverted top.
    ColorDodge,
    /// Darken base by dividing its inverse through the top.
    ColorBurn,
}

/// Outcome of lenient blend-mode parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedBlend {
    /// Mode to use.
    pub mode: BlendMode,
    /// Original string when it was not recognized and `mode` fell back to `Normal`.
    pub unrecognized: Option<String>,
}

impl BlendMode {
    /// Every mode, in declaration order.
    pub const ALL: [BlendMode; 11] = [
        Self::Normal,
        Self::PassThrough,
        Self::Multiply,
        Self::Screen,
        Self::Darken,
        Self::Lighten,
        Self::Overlay,
        Self::SoftLight,
        Self::HardLight,
        Self::ColorDodge,
        Self::ColorBurn,
    ];

    /// Canonical upper-snake name, e.g. `"COLOR_DODGE"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::PassThrough => "PASS_THROUGH",
            Self::Multiply => "MULTIPLY",
            Self::Screen => "SCREEN",
            Self::Darken => "DARKEN",
            Self::Lighten => "LIGHTEN",
            Self::Overlay => "OVERLAY",
            Self::SoftLight => "SOFT_LIGHT",
            Self::HardLight => "HARD_LIGHT",
            Self::ColorDodge => "COLOR_DODGE",
            Self::ColorBurn => "COLOR_BURN",
        }
    }

    /// Spelling used in exporter side-car files, e.g. `"BlendMode.NORMAL"`.
    pub fn metadata_name(self) -> String {
        format!("BlendMode.{}", self.as_str())
    }

    /// Mode used when a group's composite is merged into its parent.
    pub fn merge_mode(self) -> BlendMode {
        match self {
            Self::PassThrough => Self::Normal,
            other => other,
        }
    }

    /// Strict parse of the accepted spellings; `None` when unrecognized.
    ///
    /// Accepts `BlendMode.X` prefixes, any case, `_`/`-`/space separators, CamelCase, and the
    /// PSD four-character keys.
    pub fn parse(raw: &str) -> Option<BlendMode> {
        let trimmed = raw.trim();
        let unprefixed = match trimmed.rsplit_once('.') {
            Some((prefix, rest)) if prefix.eq_ignore_ascii_case("blendmode") => rest,
            _ => trimmed,
        };

        let key = unprefixed.to_ascii_lowercase();
        let by_key = match key.as_str() {
            "norm" => Some(Self::Normal),
            "pass" => Some(Self::PassThrough),
            "mul" => Some(Self::Multiply),
            "scrn" => Some(Self::Screen),
            "dark" => Some(Self::Darken),
            "lite" => Some(Self::Lighten),
            "over" => Some(Self::Overlay),
            "slit" => Some(Self::SoftLight),
            "hlit" => Some(Self::HardLight),
            "div" => Some(Self::ColorDodge),
            "idiv" => Some(Self::ColorBurn),
            _ => None,
        };
        if by_key.is_some() {
            return by_key;
        }

        let compact: String = key
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect();
        match compact.as_str() {
            "normal" => Some(Self::Normal),
            "passthrough" => Some(Self::PassThrough),
            "multiply" => Some(Self::Multiply),
            "screen" => Some(Self::Screen),
            "darken" => Some(Self::Darken),
            "lighten" => Some(Self::Lighten),
            "overlay" => Some(Self::Overlay),
            "softlight" => Some(Self::SoftLight),
            "hardlight" => Some(Self::HardLight),
            "colordodge" => Some(Self::ColorDodge),
            "colorburn" => Some(Self::ColorBurn),
            _ => None,
        }
    }

    /// Lenient parse used at tree construction time. Absent means `Normal`.
    pub fn resolve(raw: Option<&str>) -> ResolvedBlend {
        match raw {
            None => ResolvedBlend {
                mode: Self::Normal,
                unrecognized: None,
            },
            Some(s) => match Self::parse(s) {
                Some(mode) => ResolvedBlend {
                    mode,
                    unrecognized: None,
                },
                None => ResolvedBlend {
                    mode: Self::Normal,
                    unrecognized: Some(s.to_string()),
                },
            },
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlendMode {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
            .ok_or_else(|| ComposeError::validation(format!("unknown blend mode '{s}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blend/mode.rs"]
mod tests;
