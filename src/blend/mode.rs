use std::str::FromStr;

use crate::{
    blend::catalogue::{self, AlphaPolicy},
    foundation::error::AccumError,
};

/// Blend mode used when folding a new frame onto the accumulated result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum BlendMode {
    /// The new frame replaces the accumulated color, weighted by its alpha and the opacity.
    #[default]
    Normal,
    Lighten,
    Darken,
    Multiply,
    Average,
    Add,
    Subtract,
    Difference,
    Negation,
    Exclusion,
    Screen,
    Overlay,
    SoftLight,
    HardLight,
    ColorDodge,
    ColorBurn,
    LinearDodge,
    LinearBurn,
    LinearLight,
    VividLight,
    PinLight,
    HardMix,
    Reflect,
    Glow,
    Phoenix,
}

impl std::fmt::Display for BlendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl BlendMode {
    /// Every mode, in menu order.
    pub fn all() -> &'static [BlendMode] {
        use BlendMode::*;
        &[
            Normal,
            Lighten,
            Darken,
            Multiply,
            Average,
            Add,
            Subtract,
            Difference,
            Negation,
            Exclusion,
            Screen,
            Overlay,
            SoftLight,
            HardLight,
            ColorDodge,
            ColorBurn,
            LinearDodge,
            LinearBurn,
            LinearLight,
            VividLight,
            PinLight,
            HardMix,
            Reflect,
            Glow,
            Phoenix,
        ]
    }

    /// Stable lowercase identifier, as used in configuration.
    pub fn id(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Lighten => "lighten",
            Self::Darken => "darken",
            Self::Multiply => "multiply",
            Self::Average => "average",
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Difference => "difference",
            Self::Negation => "negation",
            Self::Exclusion => "exclusion",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::SoftLight => "softlight",
            Self::HardLight => "hardlight",
            Self::ColorDodge => "colordodge",
            Self::ColorBurn => "colorburn",
            Self::LinearDodge => "lineardodge",
            Self::LinearBurn => "linearburn",
            Self::LinearLight => "linearlight",
            Self::VividLight => "vividlight",
            Self::PinLight => "pinlight",
            Self::HardMix => "hardmix",
            Self::Reflect => "reflect",
            Self::Glow => "glow",
            Self::Phoenix => "phoenix",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Lighten => "Lighten",
            Self::Darken => "Darken",
            Self::Multiply => "Multiply",
            Self::Average => "Average",
            Self::Add => "Add",
            Self::Subtract => "Subtract",
            Self::Difference => "Difference",
            Self::Negation => "Negation",
            Self::Exclusion => "Exclusion",
            Self::Screen => "Screen",
            Self::Overlay => "Overlay",
            Self::SoftLight => "Soft Light",
            Self::HardLight => "Hard Light",
            Self::ColorDodge => "Color Dodge",
            Self::ColorBurn => "Color Burn",
            Self::LinearDodge => "Linear Dodge",
            Self::LinearBurn => "Linear Burn",
            Self::LinearLight => "Linear Light",
            Self::VividLight => "Vivid Light",
            Self::PinLight => "Pin Light",
            Self::HardMix => "Hard Mix",
            Self::Reflect => "Reflect",
            Self::Glow => "Glow",
            Self::Phoenix => "Phoenix",
        }
    }

    /// Whether the output alpha is a weighted union of source and destination alpha.
    ///
    /// Only `Normal` mixes alpha. Every other mode acts as an adjustment layer over the
    /// accumulated result, so its alpha is copied from the destination unchanged.
    pub fn mixes_alpha(self) -> bool {
        catalogue::entry(self).alpha == AlphaPolicy::MixSource
    }

    /// Strict lookup by identifier (case-insensitive). `"substract"` is accepted as a legacy
    /// spelling of `subtract`.
    pub fn lookup(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        if name == "substract" {
            return Some(Self::Subtract);
        }
        Self::all().iter().copied().find(|m| m.id() == name)
    }

    /// Permissive lookup: unknown identifiers fall back to [`BlendMode::Normal`].
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("substract") {
            tracing::warn!(
                name,
                "blend mode identifier 'substract' is a misspelling, using 'subtract'"
            );
        }
        match Self::lookup(name) {
            Some(mode) => mode,
            None => {
                tracing::warn!(name, "unknown blend mode, falling back to normal");
                Self::Normal
            }
        }
    }
}

impl FromStr for BlendMode {
    type Err = AccumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| AccumError::validation(format!("unknown blend mode '{s}'")))
    }
}

impl From<String> for BlendMode {
    fn from(s: String) -> Self {
        Self::from_name(&s)
    }
}

impl From<BlendMode> for &'static str {
    fn from(mode: BlendMode) -> Self {
        mode.id()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blend/mode.rs"]
mod tests;
