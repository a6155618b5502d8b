//! Blend formulas: the mode catalogue, the formula tree and its WGSL compiler.

/// Per-mode formula table and the shared helper library.
pub mod catalogue;
/// Lowering of formula trees to WGSL.
pub mod compile;
/// Scalar formula trees and their interpreter.
pub mod expr;
/// The blend mode identifier.
pub mod mode;
