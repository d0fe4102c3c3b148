//! Engine-wide configuration.

use serde::{Deserialize, Serialize};

use crate::curve::Curve;

/// Fallbacks applied to value animations that specify neither their own
/// duration/curve nor inherit one from an enclosing defaults scope.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Fallback animation duration in seconds.
    pub default_duration: f32,
    /// Fallback easing curve.
    pub default_curve: Curve,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_duration: 0.3,
            default_curve: Curve::EaseInOut,
        }
    }
}
