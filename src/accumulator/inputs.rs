use serde::{Deserialize, Serialize};

use crate::{
    blend::mode::BlendMode,
    foundation::error::{AccumError, AccumResult},
    render::host::SurfaceId,
};

fn default_opacity() -> f32 {
    1.0
}

/// Per-frame configuration of the accumulator.
///
/// JSON form: `{"blend_mode": "screen", "opacity": 0.5, "clear": false}`; every field is
/// optional and `blendMode` is accepted for `blend_mode`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccumulatorInputs {
    /// Incoming frame. Set by the host, never serialized.
    #[serde(skip)]
    pub source: Option<SurfaceId>,
    /// Replace the accumulated result with the source on the next draw.
    #[serde(default)]
    pub clear: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default, alias = "blendMode")]
    pub blend_mode: BlendMode,
}

impl Default for AccumulatorInputs {
    fn default() -> Self {
        Self {
            source: None,
            clear: false,
            opacity: default_opacity(),
            blend_mode: BlendMode::Normal,
        }
    }
}

impl AccumulatorInputs {
    pub fn from_json(json: &str) -> AccumResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> AccumResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn with_source(mut self, source: SurfaceId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_blend_mode(mut self, mode: BlendMode) -> Self {
        self.blend_mode = mode;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_clear(mut self, clear: bool) -> Self {
        self.clear = clear;
        self
    }

    /// Check the inputs and clamp opacity into `[0, 1]`.
    pub fn validated(mut self) -> AccumResult<Self> {
        if !self.opacity.is_finite() {
            return Err(AccumError::validation(format!(
                "opacity must be finite, got {}",
                self.opacity
            )));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            let clamped = self.opacity.clamp(0.0, 1.0);
            tracing::warn!(opacity = self.opacity, clamped, "opacity outside [0, 1], clamping");
            self.opacity = clamped;
        }
        Ok(self)
    }
}

/// Kind and default of one configurable input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputKind {
    Image,
    Boolean { default: bool },
    Number { default: f32, min: f32, max: f32 },
    Enum { default: BlendMode },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputInfo {
    pub name: &'static str,
    pub kind: InputKind,
    /// Changing this input regenerates the program.
    pub regenerates: bool,
}

/// Static description of the stage for hosts that list their effects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectInfo {
    pub title: &'static str,
    pub description: &'static str,
    /// Whether the stage may draw into the surface it reads. Never true here.
    pub in_place: bool,
    pub inputs: &'static [InputInfo],
}

pub const ACCUMULATOR_INFO: EffectInfo = EffectInfo {
    title: "Accumulator",
    description: "Draw on top of previous frame",
    in_place: false,
    inputs: &[
        InputInfo {
            name: "source",
            kind: InputKind::Image,
            regenerates: false,
        },
        InputInfo {
            name: "clear",
            kind: InputKind::Boolean { default: false },
            regenerates: false,
        },
        InputInfo {
            name: "opacity",
            kind: InputKind::Number {
                default: 1.0,
                min: 0.0,
                max: 1.0,
            },
            regenerates: false,
        },
        InputInfo {
            name: "blend_mode",
            kind: InputKind::Enum {
                default: BlendMode::Normal,
            },
            regenerates: true,
        },
    ],
};

#[cfg(test)]
#[path = "../../tests/unit/accumulator/inputs.rs"]
mod tests;
