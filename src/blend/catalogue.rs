//! Read-only blend formula table.
//!
//! Formulas follow the classic Photoshop-style blend math (Romain Dura's GLSL set). Each is
//! defined once per scalar channel; the interpreter in [`crate::blend::expr`] and the WGSL
//! emitter in [`crate::blend::compile`] both read these same trees.

use crate::{
    blend::{
        expr::{Cond, Expr},
        mode::BlendMode,
    },
    foundation::core::Rgb,
};

use Expr::{Base, Blend, Const};

const ZERO: Expr = Const(0.0);
const HALF: Expr = Const(0.5);
const ONE: Expr = Const(1.0);
const TWO: Expr = Const(2.0);

/// `base + blend`
const SUM: Expr = Expr::Add(&Base, &Blend);
/// `2 * blend`
const TWO_BLEND: Expr = Expr::Mul(&TWO, &Blend);
/// `2 * (blend - 0.5)`
const TWO_BLEND_UPPER: Expr = Expr::Mul(&TWO, &Expr::Sub(&Blend, &HALF));
/// `blend < 0.5`
const BLEND_LOW: Cond = Cond::Lt(&Blend, &HALF);

const ADD: Expr = Expr::Min(&SUM, &ONE);
const SUBTRACT: Expr = Expr::Max(&Expr::Sub(&SUM, &ONE), &ZERO);
const LIGHTEN: Expr = Expr::Max(&Blend, &Base);
const DARKEN: Expr = Expr::Min(&Blend, &Base);
const SCREEN: Expr = Expr::Sub(
    &ONE,
    &Expr::Mul(&Expr::Sub(&ONE, &Base), &Expr::Sub(&ONE, &Blend)),
);

/// Named per-channel helper functions shared by the piecewise formulas.
///
/// Every generated program embeds the whole library, whichever mode is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Helper {
    Add,
    Subtract,
    LinearDodge,
    LinearBurn,
    Lighten,
    Darken,
    LinearLight,
    Screen,
    Overlay,
    SoftLight,
    ColorDodge,
    ColorBurn,
    VividLight,
    PinLight,
    HardMix,
    Reflect,
}

impl Helper {
    /// The library in declaration order; callees come before their callers.
    pub fn all() -> &'static [Helper] {
        use Helper::*;
        &[
            Add,
            Subtract,
            LinearDodge,
            LinearBurn,
            Lighten,
            Darken,
            LinearLight,
            Screen,
            Overlay,
            SoftLight,
            ColorDodge,
            ColorBurn,
            VividLight,
            PinLight,
            HardMix,
            Reflect,
        ]
    }

    /// Name of the emitted scalar function.
    pub fn fn_name(self) -> &'static str {
        match self {
            Self::Add => "blend_add_f",
            Self::Subtract => "blend_subtract_f",
            Self::LinearDodge => "blend_linear_dodge_f",
            Self::LinearBurn => "blend_linear_burn_f",
            Self::Lighten => "blend_lighten_f",
            Self::Darken => "blend_darken_f",
            Self::LinearLight => "blend_linear_light_f",
            Self::Screen => "blend_screen_f",
            Self::Overlay => "blend_overlay_f",
            Self::SoftLight => "blend_soft_light_f",
            Self::ColorDodge => "blend_color_dodge_f",
            Self::ColorBurn => "blend_color_burn_f",
            Self::VividLight => "blend_vivid_light_f",
            Self::PinLight => "blend_pin_light_f",
            Self::HardMix => "blend_hard_mix_f",
            Self::Reflect => "blend_reflect_f",
        }
    }

    /// Body of the helper, with its parameters bound to [`Expr::Base`] and [`Expr::Blend`].
    pub fn body(self) -> &'static Expr {
        match self {
            Self::Add => &HELPER_ADD,
            Self::Subtract => &HELPER_SUBTRACT,
            Self::LinearDodge => &HELPER_LINEAR_DODGE,
            Self::LinearBurn => &HELPER_LINEAR_BURN,
            Self::Lighten => &HELPER_LIGHTEN,
            Self::Darken => &HELPER_DARKEN,
            Self::LinearLight => &HELPER_LINEAR_LIGHT,
            Self::Screen => &HELPER_SCREEN,
            Self::Overlay => &HELPER_OVERLAY,
            Self::SoftLight => &HELPER_SOFT_LIGHT,
            Self::ColorDodge => &HELPER_COLOR_DODGE,
            Self::ColorBurn => &HELPER_COLOR_BURN,
            Self::VividLight => &HELPER_VIVID_LIGHT,
            Self::PinLight => &HELPER_PIN_LIGHT,
            Self::HardMix => &HELPER_HARD_MIX,
            Self::Reflect => &HELPER_REFLECT,
        }
    }

    pub fn eval(self, base: f32, blend: f32) -> f32 {
        self.body().eval(base, blend)
    }
}

static HELPER_ADD: Expr = ADD;
static HELPER_SUBTRACT: Expr = SUBTRACT;
static HELPER_LINEAR_DODGE: Expr = Expr::Call(Helper::Add, &Base, &Blend);
static HELPER_LINEAR_BURN: Expr = Expr::Call(Helper::Subtract, &Base, &Blend);
static HELPER_LIGHTEN: Expr = LIGHTEN;
static HELPER_DARKEN: Expr = DARKEN;
static HELPER_LINEAR_LIGHT: Expr = Expr::Select {
    cond: BLEND_LOW,
    then: &Expr::Call(Helper::LinearBurn, &Base, &TWO_BLEND),
    otherwise: &Expr::Call(Helper::LinearDodge, &Base, &TWO_BLEND_UPPER),
};
static HELPER_SCREEN: Expr = SCREEN;
static HELPER_OVERLAY: Expr = Expr::Select {
    cond: Cond::Lt(&Base, &HALF),
    then: &Expr::Mul(&Expr::Mul(&TWO, &Base), &Blend),
    otherwise: &Expr::Sub(
        &ONE,
        &Expr::Mul(
            &Expr::Mul(&TWO, &Expr::Sub(&ONE, &Base)),
            &Expr::Sub(&ONE, &Blend),
        ),
    ),
};
static HELPER_SOFT_LIGHT: Expr = Expr::Select {
    cond: BLEND_LOW,
    then: &Expr::Add(
        &Expr::Mul(&Expr::Mul(&TWO, &Base), &Blend),
        &Expr::Mul(&Expr::Mul(&Base, &Base), &Expr::Sub(&ONE, &TWO_BLEND)),
    ),
    otherwise: &Expr::Add(
        &Expr::Mul(&Expr::Sqrt(&Base), &Expr::Sub(&TWO_BLEND, &ONE)),
        &Expr::Mul(&Expr::Mul(&TWO, &Base), &Expr::Sub(&ONE, &Blend)),
    ),
};
static HELPER_COLOR_DODGE: Expr = Expr::Select {
    cond: Cond::Eq(&Blend, &ONE),
    then: &Blend,
    otherwise: &Expr::Min(&Expr::Div(&Base, &Expr::Sub(&ONE, &Blend)), &ONE),
};
static HELPER_COLOR_BURN: Expr = Expr::Select {
    cond: Cond::Eq(&Blend, &ZERO),
    then: &Blend,
    otherwise: &Expr::Max(
        &Expr::Sub(&ONE, &Expr::Div(&Expr::Sub(&ONE, &Base), &Blend)),
        &ZERO,
    ),
};
static HELPER_VIVID_LIGHT: Expr = Expr::Select {
    cond: BLEND_LOW,
    then: &Expr::Call(Helper::ColorBurn, &Base, &TWO_BLEND),
    otherwise: &Expr::Call(Helper::ColorDodge, &Base, &TWO_BLEND_UPPER),
};
static HELPER_PIN_LIGHT: Expr = Expr::Select {
    cond: BLEND_LOW,
    then: &Expr::Call(Helper::Darken, &Base, &TWO_BLEND),
    otherwise: &Expr::Call(Helper::Lighten, &Base, &TWO_BLEND_UPPER),
};
static HELPER_HARD_MIX: Expr = Expr::Select {
    cond: Cond::Lt(&Expr::Call(Helper::VividLight, &Base, &Blend), &HALF),
    then: &ZERO,
    otherwise: &ONE,
};
static HELPER_REFLECT: Expr = Expr::Select {
    cond: Cond::Eq(&Blend, &ONE),
    then: &Blend,
    otherwise: &Expr::Min(
        &Expr::Div(&Expr::Mul(&Base, &Base), &Expr::Sub(&ONE, &Blend)),
        &ONE,
    ),
};

/// How a mode combines one channel of `base` (accumulated) with `blend` (incoming).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BlendFormula {
    /// A direct expression over `base` and `blend`.
    Direct(&'static Expr),
    /// A library helper, optionally with the operand roles exchanged.
    Helper { helper: Helper, swapped: bool },
}

impl BlendFormula {
    pub fn eval_channel(self, base: f32, blend: f32) -> f32 {
        match self {
            Self::Direct(expr) => expr.eval(base, blend),
            Self::Helper {
                helper,
                swapped: false,
            } => helper.eval(base, blend),
            Self::Helper {
                helper,
                swapped: true,
            } => helper.eval(blend, base),
        }
    }

    pub fn eval(self, base: Rgb, blend: Rgb) -> Rgb {
        [
            self.eval_channel(base[0], blend[0]),
            self.eval_channel(base[1], blend[1]),
            self.eval_channel(base[2], blend[2]),
        ]
    }
}

/// How the output alpha is formed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlphaPolicy {
    /// `a = src.a * opacity; a + dst.a * (1 - a)`.
    MixSource,
    /// Output alpha is the destination alpha, untouched.
    KeepDestination,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CatalogueEntry {
    pub mode: BlendMode,
    pub formula: BlendFormula,
    pub alpha: AlphaPolicy,
}

const fn direct(mode: BlendMode, expr: &'static Expr) -> CatalogueEntry {
    CatalogueEntry {
        mode,
        formula: BlendFormula::Direct(expr),
        alpha: AlphaPolicy::KeepDestination,
    }
}

const fn helper(mode: BlendMode, helper: Helper, swapped: bool) -> CatalogueEntry {
    CatalogueEntry {
        mode,
        formula: BlendFormula::Helper { helper, swapped },
        alpha: AlphaPolicy::KeepDestination,
    }
}

/// One entry per [`BlendMode`], in declaration order.
static CATALOGUE: [CatalogueEntry; 25] = [
    CatalogueEntry {
        mode: BlendMode::Normal,
        formula: BlendFormula::Direct(&Blend),
        alpha: AlphaPolicy::MixSource,
    },
    direct(BlendMode::Lighten, &LIGHTEN),
    direct(BlendMode::Darken, &DARKEN),
    direct(BlendMode::Multiply, &Expr::Mul(&Base, &Blend)),
    direct(BlendMode::Average, &Expr::Div(&SUM, &TWO)),
    direct(BlendMode::Add, &ADD),
    direct(BlendMode::Subtract, &SUBTRACT),
    direct(BlendMode::Difference, &Expr::Abs(&Expr::Sub(&Base, &Blend))),
    direct(
        BlendMode::Negation,
        &Expr::Sub(&ONE, &Expr::Abs(&Expr::Sub(&Expr::Sub(&ONE, &Base), &Blend))),
    ),
    direct(
        BlendMode::Exclusion,
        &Expr::Sub(&SUM, &Expr::Mul(&Expr::Mul(&TWO, &Base), &Blend)),
    ),
    direct(BlendMode::Screen, &SCREEN),
    helper(BlendMode::Overlay, Helper::Overlay, false),
    helper(BlendMode::SoftLight, Helper::SoftLight, false),
    helper(BlendMode::HardLight, Helper::Overlay, true),
    helper(BlendMode::ColorDodge, Helper::ColorDodge, false),
    helper(BlendMode::ColorBurn, Helper::ColorBurn, false),
    direct(BlendMode::LinearDodge, &ADD),
    direct(BlendMode::LinearBurn, &SUBTRACT),
    helper(BlendMode::LinearLight, Helper::LinearLight, false),
    helper(BlendMode::VividLight, Helper::VividLight, false),
    helper(BlendMode::PinLight, Helper::PinLight, false),
    helper(BlendMode::HardMix, Helper::HardMix, false),
    helper(BlendMode::Reflect, Helper::Reflect, false),
    helper(BlendMode::Glow, Helper::Reflect, true),
    direct(
        BlendMode::Phoenix,
        &Expr::Add(&Expr::Sub(&Expr::Min(&Base, &Blend), &Expr::Max(&Base, &Blend)), &ONE),
    ),
];

/// Formula and alpha policy for `mode`.
pub fn entry(mode: BlendMode) -> &'static CatalogueEntry {
    let e = &CATALOGUE[mode as usize];
    debug_assert_eq!(e.mode, mode, "catalogue is out of declaration order");
    e
}

#[cfg(test)]
#[path = "../../tests/unit/blend/catalogue.rs"]
mod tests;
