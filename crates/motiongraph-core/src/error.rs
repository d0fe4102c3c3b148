//! Error types for graph construction and validation.

use crate::value::ValueKind;

/// Configuration errors detected when a node tree is submitted.
/// Runtime effect failures are reported through the `log` facade instead
/// (they complete the Action that raised them).
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum GraphError {
    /// Speed multipliers must be finite and strictly positive.
    #[error("speed factor must be > 0, got {factor}")]
    InvalidSpeed { factor: f32 },

    /// Durations must be finite and non-negative.
    #[error("duration must be finite and >= 0 seconds, got {seconds}")]
    InvalidDuration { seconds: f32 },

    /// A value animation's end (or start override) kind must match the
    /// target's declared kind.
    #[error("value animation on '{key}' expects {expected:?}, got {actual:?}")]
    KindMismatch {
        key: String,
        expected: ValueKind,
        actual: ValueKind,
    },
}
