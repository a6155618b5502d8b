//! The accumulator stage.

/// Stage configuration and effect metadata.
pub mod inputs;
/// Lifecycle and per-frame compositing.
pub mod stage;
