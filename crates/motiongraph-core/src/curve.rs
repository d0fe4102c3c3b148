//! Easing curves: pure progress-remapping functions.

use serde::{Deserialize, Serialize};

/// Cubic Bezier basis function.
#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Given control points (x1, y1, x2, y2) and an input t in [0,1],
/// compute the eased y by inverting the x bezier via binary search.
#[inline]
fn bezier_ease_t(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    // Fast path: Bezier(0,0,1,1) is exactly linear -> eased t == t
    if x1 == 0.0 && y1 == 0.0 && x2 == 1.0 && y2 == 1.0 {
        return t;
    }
    // Monotonic X in [0,1] assumed for x1/x2 in [0,1]
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = t;
    for _ in 0..24 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}

/// An easing curve mapping normalized progress in [0,1] to an output in
/// roughly that range (CubicBezier control points may overshoot).
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Curve {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Control points (x1, y1, x2, y2) of a unit cubic bezier.
    CubicBezier(f32, f32, f32, f32),
}

impl Curve {
    pub fn transform(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Curve::Linear => t,
            Curve::EaseIn => bezier_ease_t(t, 0.42, 0.0, 1.0, 1.0),
            Curve::EaseOut => bezier_ease_t(t, 0.0, 0.0, 0.58, 1.0),
            Curve::EaseInOut => bezier_ease_t(t, 0.42, 0.0, 0.58, 1.0),
            Curve::CubicBezier(x1, y1, x2, y2) => bezier_ease_t(t, x1, y1, x2, y2),
        }
    }
}
