//! The transfer function applied by node evaluation.
//!
//! The engine uses the steepened logistic from the original NEAT
//! experiments. Input nodes bypass it entirely; every hidden and output
//! node passes its weighted input sum through it.

/// Steepness of the logistic transfer function.
pub const SIGMOID_STEEPNESS: f64 = 4.9;

/// Steepened logistic: `1 / (1 + e^(-4.9x))`.
///
/// Maps any finite sum into `(0, 1)`, with `steep_sigmoid(0.0) == 0.5`
/// for nodes with no enabled incoming connections.
#[inline]
#[must_use]
pub fn steep_sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-SIGMOID_STEEPNESS * x).exp())
}
