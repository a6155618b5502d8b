//! Generated pixel-combination programs.

/// WGSL program assembly.
pub mod generate;
/// Host-independent per-pixel semantics of a program.
pub mod kernel;
