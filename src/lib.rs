//! Temporal feedback compositing: each incoming frame is blended onto the accumulated result
//! of every frame before it.
//!
//! The stage keeps two surfaces and swaps their roles every frame, so it never reads and writes
//! the same surface in one draw. Surfaces and programs live in a [`RenderHost`]:
//!
//! - [`CpuHost`] runs programs through a data-driven interpreter on a rayon pool
//! - `GpuHost` (feature `gpu`) compiles the generated WGSL with `wgpu`
//!
//! ```no_run
//! use wavyte_accumulator::{Accumulator, AccumulatorInputs, BlendMode, Canvas, CpuHost, Frame, RenderHost};
//!
//! # fn main() -> wavyte_accumulator::AccumResult<()> {
//! let mut host = CpuHost::new()?;
//! let mut acc = Accumulator::new();
//! acc.initialize(&mut host, 64, 64)?;
//!
//! let frame = Frame::filled(Canvas::new(64, 64)?, [1.0, 0.5, 0.0, 0.25]);
//! let source = host.create_surface_from(&frame)?;
//! let inputs = AccumulatorInputs::default()
//!     .with_source(source)
//!     .with_blend_mode(BlendMode::Screen);
//! acc.set_inputs(&mut host, inputs)?;
//!
//! let out = acc.draw_frame(&mut host)?;
//! let result = host.read_surface(out)?;
//! # let _ = result;
//! acc.destroy(&mut host)?;
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

mod foundation;

/// The accumulator stage.
pub mod accumulator;
/// Blend mode catalogue and formula compiler.
pub mod blend;
/// Program generation.
pub mod program;
/// Render hosts.
pub mod render;

pub use crate::accumulator::inputs::{ACCUMULATOR_INFO, AccumulatorInputs, EffectInfo};
pub use crate::accumulator::stage::Accumulator;
pub use crate::blend::mode::BlendMode;
pub use crate::foundation::core::{Canvas, Frame, Rgb, Rgba};
pub use crate::foundation::error::{AccumError, AccumResult};
pub use crate::program::generate::{ProgramSource, composite_source, passthrough_source};
pub use crate::render::cpu::CpuHost;
#[cfg(feature = "gpu")]
pub use crate::render::gpu::GpuHost;
pub use crate::render::host::{DrawOptions, ProgramId, RenderHost, SurfaceId, Uniforms};
