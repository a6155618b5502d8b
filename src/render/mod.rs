//! Render hosts and the ping-pong surface manager.

/// In-memory host running programs on a rayon pool.
pub mod cpu;
/// `wgpu` host running the generated WGSL.
#[cfg(feature = "gpu")]
pub mod gpu;
/// The host interface the accumulator consumes.
pub mod host;
/// Double-buffer surface manager.
pub mod pingpong;
