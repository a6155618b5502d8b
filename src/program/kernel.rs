use crate::{
    blend::{
        catalogue::{self, AlphaPolicy},
        mode::BlendMode,
    },
    foundation::core::Rgba,
};

/// What a generated program computes per pixel, independent of its WGSL text.
///
/// Hosts that cannot run WGSL (the CPU host) execute programs through this description; it is
/// resolved from the same catalogue entry the WGSL was generated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kernel {
    /// Copy the source pixel.
    Passthrough,
    /// Blend the source over the previous accumulated pixel.
    Composite { mode: BlendMode },
}

impl Kernel {
    pub fn needs_previous(self) -> bool {
        matches!(self, Self::Composite { .. })
    }

    pub fn apply(self, src: Rgba, dst: Rgba, opacity: f32) -> Rgba {
        match self {
            Self::Passthrough => src,
            Self::Composite { mode } => composite_pixel(mode, src, dst, opacity),
        }
    }
}

/// Blend `src` (incoming frame) onto `dst` (previous accumulated result).
pub fn composite_pixel(mode: BlendMode, src: Rgba, dst: Rgba, opacity: f32) -> Rgba {
    if src[3] == 0.0 {
        return dst;
    }

    let entry = catalogue::entry(mode);
    let alpha = match entry.alpha {
        AlphaPolicy::MixSource => {
            let a = src[3] * opacity;
            a + dst[3] * (1.0 - a)
        }
        AlphaPolicy::KeepDestination => dst[3],
    };

    let base = [dst[0], dst[1], dst[2]];
    let blended = entry.formula.eval(base, [src[0], src[1], src[2]]);
    let t = opacity * src[3];
    [
        mix(base[0], blended[0], t),
        mix(base[1], blended[1], t),
        mix(base[2], blended[2], t),
        alpha,
    ]
}

/// GLSL/WGSL `mix`: `x * (1 - a) + y * a`.
fn mix(x: f32, y: f32, a: f32) -> f32 {
    x * (1.0 - a) + y * a
}

#[cfg(test)]
#[path = "../../tests/unit/program/kernel.rs"]
mod tests;
