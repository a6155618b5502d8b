//! Program generator: assembles complete WGSL programs for the accumulator.
//!
//! Layout shared with the hosts:
//!
//! - `@group(0) @binding(0)`: `source_tex` texture (incoming frame)
//! - `@group(0) @binding(1)`: `previous_tex` texture (accumulated result of the last frame)
//! - `@group(0) @binding(2)`: `params` uniform (`opacity`, target size)
//!
//! Entry points are [`VERTEX_ENTRY`] and [`FRAGMENT_ENTRY`]; the vertex stage draws one
//! full-screen triangle with no vertex buffers.

use crate::{
    blend::{
        catalogue,
        compile::{Operands, compile_formula, helper_library},
        mode::BlendMode,
    },
    foundation::error::AccumResult,
    program::kernel::Kernel,
    render::host::{ProgramId, RenderHost},
};

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";
/// Size in bytes of the `params` uniform block.
pub const PARAMS_SIZE: u64 = 16;

/// Program text plus the per-pixel semantics it encodes.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgramSource {
    pub label: String,
    pub wgsl: String,
    pub kernel: Kernel,
}

const PRELUDE: &str = r#"struct Params {
  opacity: f32,
  pad0: f32,
  target_size: vec2<f32>,
};

@group(0) @binding(0) var source_tex: texture_2d<f32>;
@group(0) @binding(1) var previous_tex: texture_2d<f32>;
@group(0) @binding(2) var<uniform> params: Params;

@vertex
fn vs_main(@builtin(vertex_index) vi: u32) -> @builtin(position) vec4<f32> {
  var p = array<vec2<f32>, 3>(
    vec2<f32>(-1.0, -1.0),
    vec2<f32>( 3.0, -1.0),
    vec2<f32>(-1.0,  3.0),
  );
  return vec4<f32>(p[vi], 0.0, 1.0);
}

// Nearest texel of `tex` at normalized target coordinate `uv`.
fn load_texel(tex: texture_2d<f32>, uv: vec2<f32>) -> vec4<f32> {
  let dims = textureDimensions(tex);
  let xy = vec2<i32>(floor(uv * vec2<f32>(dims)));
  let clamped = clamp(xy, vec2<i32>(0, 0), vec2<i32>(dims) - vec2<i32>(1, 1));
  return textureLoad(tex, clamped, 0);
}
"#;

/// Generate the blending program for `mode`.
///
/// The whole helper library is embedded; the active formula is fixed here, so a mode change
/// needs a new program.
pub fn composite_source(mode: BlendMode) -> ProgramSource {
    let entry = catalogue::entry(mode);
    let mut wgsl = String::from(PRELUDE);

    wgsl.push('\n');
    wgsl.push_str(&helper_library());

    wgsl.push_str(&format!(
        "\nfn blend_function(base: vec3<f32>, blend: vec3<f32>) -> vec3<f32> {{\n  return {};\n}}\n",
        compile_formula(entry.formula, Operands::DEFAULT)
    ));

    wgsl.push_str(
        r#"
// Apply the blend formula, then mix by opacity * blend.a.
fn blend_opacity(base: vec4<f32>, blend: vec4<f32>, opacity: f32) -> vec3<f32> {
  let blended = blend_function(base.rgb, blend.rgb);
  return mix(base.rgb, blended, opacity * blend.a);
}

@fragment
fn fs_main(@builtin(position) frag: vec4<f32>) -> @location(0) vec4<f32> {
  let uv = frag.xy / params.target_size;
  let top = load_texel(source_tex, uv);
  let bottom = load_texel(previous_tex, uv);
  if (top.a == 0.0) {
    return bottom;
  }
"#,
    );

    if mode.mixes_alpha() {
        wgsl.push_str(
            "  var alpha = top.a * params.opacity;\n  alpha = alpha + bottom.a * (1.0 - alpha);\n",
        );
    } else {
        wgsl.push_str("  let alpha = bottom.a;\n");
    }
    wgsl.push_str("  return vec4<f32>(blend_opacity(bottom, top, params.opacity), alpha);\n}\n");

    ProgramSource {
        label: format!("accumulator_{}", mode.id()),
        wgsl,
        kernel: Kernel::Composite { mode },
    }
}

/// The trivial program used when `clear` is set: copies the source.
pub fn passthrough_source() -> ProgramSource {
    let mut wgsl = String::from(PRELUDE);
    wgsl.push_str(
        r#"
@fragment
fn fs_main(@builtin(position) frag: vec4<f32>) -> @location(0) vec4<f32> {
  return load_texel(source_tex, frag.xy / params.target_size);
}
"#,
    );
    ProgramSource {
        label: "accumulator_passthrough".to_string(),
        wgsl,
        kernel: Kernel::Passthrough,
    }
}

/// A compiled blending program bound to the mode it was generated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositeProgram {
    pub mode: BlendMode,
    pub id: ProgramId,
}

impl CompositeProgram {
    /// Generate and compile the program for `mode`. Nothing is retained on failure.
    #[tracing::instrument(skip(host))]
    pub fn build<H: RenderHost + ?Sized>(host: &mut H, mode: BlendMode) -> AccumResult<Self> {
        let source = composite_source(mode);
        let id = host.compile_program(&source)?;
        tracing::debug!(program = id.0, "composite program generated");
        Ok(Self { mode, id })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/program/generate.rs"]
mod tests;
