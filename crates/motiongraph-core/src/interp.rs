//! Interpolation helpers:
//! - lerp_value (component-wise + quat NLERP, step for discrete kinds)
//! - step_value (step semantics for any kind)
//! - quaternion NLERP with shortest-arc normalization

use crate::value::Value;

/// Begin/end interpolator for a value kind over normalized progress.
///
/// Installed per [`AnimatedValue`](crate::store::AnimatedValue); the engine
/// calls it with the curve-transformed progress, which easing curves may
/// push slightly outside [0, 1].
pub type TweenFn = fn(&Value, &Value, f32) -> Value;

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_vec2(a: [f32; 2], b: [f32; 2], t: f32) -> [f32; 2] {
    [lerp_f32(a[0], b[0], t), lerp_f32(a[1], b[1], t)]
}

#[inline]
pub fn lerp_vec3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
    ]
}

#[inline]
pub fn lerp_vec4(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    [
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
        lerp_f32(a[3], b[3], t),
    ]
}

#[inline]
fn dot4(a: [f32; 4], b: [f32; 4]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

#[inline]
fn normalize4(mut q: [f32; 4]) -> [f32; 4] {
    let len2 = q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3];
    if len2 > 0.0 {
        let inv_len = len2.sqrt().recip();
        q[0] *= inv_len;
        q[1] *= inv_len;
        q[2] *= inv_len;
        q[3] *= inv_len;
    }
    q
}

/// Quaternion NLERP with shortest-arc correction.
/// If dot < 0, negate the second quaternion to ensure the shortest path.
/// Returns a normalized quaternion (x,y,z,w).
#[inline]
pub fn nlerp_quat(a: [f32; 4], mut b: [f32; 4], t: f32) -> [f32; 4] {
    let d = dot4(a, b);
    if d < 0.0 {
        b[0] = -b[0];
        b[1] = -b[1];
        b[2] = -b[2];
        b[3] = -b[3];
    }
    let q = [
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
        lerp_f32(a[3], b[3], t),
    ];
    normalize4(q)
}

/// Step interpolation: hold the begin value until progress reaches 1.
#[inline]
pub fn step_value(a: &Value, b: &Value, t: f32) -> Value {
    if t < 1.0 {
        a.clone()
    } else {
        b.clone()
    }
}

/// Default interpolation across Value kinds: component-wise lerp for numeric
/// kinds, NLERP for quaternions, step for Bool/Text.
pub fn lerp_value(a: &Value, b: &Value, t: f32) -> Value {
    match (a, b) {
        (Value::Float(va), Value::Float(vb)) => Value::Float(lerp_f32(*va, *vb, t)),
        (Value::Vec2(va), Value::Vec2(vb)) => Value::Vec2(lerp_vec2(*va, *vb, t)),
        (Value::Vec3(va), Value::Vec3(vb)) => Value::Vec3(lerp_vec3(*va, *vb, t)),
        (Value::Vec4(va), Value::Vec4(vb)) => Value::Vec4(lerp_vec4(*va, *vb, t)),
        (Value::Quat(qa), Value::Quat(qb)) => Value::Quat(nlerp_quat(*qa, *qb, t)),
        (Value::ColorRgba(ca), Value::ColorRgba(cb)) => Value::ColorRgba(lerp_vec4(*ca, *cb, t)),
        (Value::Bool(_), Value::Bool(_)) | (Value::Text(_), Value::Text(_)) => step_value(a, b, t),
        // Fail-soft on kind mismatch: keep the begin value.
        _ => {
            log::warn!(
                "cannot interpolate {:?} -> {:?}; holding begin value",
                a.kind(),
                b.kind()
            );
            a.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints_and_midpoint() {
        assert_eq!(lerp_f32(2.0, 4.0, 0.0), 2.0);
        assert_eq!(lerp_f32(2.0, 4.0, 0.5), 3.0);
        assert_eq!(lerp_f32(2.0, 4.0, 1.0), 4.0);
    }

    #[test]
    fn quat_nlerp_stays_unit_length() {
        let a = [0.0, 0.0, 0.0, 1.0];
        let b = [0.0, 1.0, 0.0, 0.0];
        let q = nlerp_quat(a, b, 0.5);
        let n = (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt();
        assert!((n - 1.0).abs() < 1e-4);
    }

    #[test]
    fn step_holds_until_done() {
        let a = Value::Bool(false);
        let b = Value::Bool(true);
        assert_eq!(step_value(&a, &b, 0.99), a);
        assert_eq!(step_value(&a, &b, 1.0), b);
    }

    #[test]
    fn mismatched_kinds_hold_begin() {
        let a = Value::Float(1.0);
        let b = Value::Vec2([0.0, 0.0]);
        assert_eq!(lerp_value(&a, &b, 0.5), a);
    }
}
