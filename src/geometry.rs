// src/geometry.rs
use crate::keypoint::Keypoint;
use nalgebra::Vector2;
use std::f64::consts::PI;

/// Folds an absolute angular difference in `[0, 2π]` back into `[0, π]`.
pub fn wrap_angle(diff: f64) -> f64 {
    if diff > PI {
        2.0 * PI - diff
    } else {
        diff
    }
}

/// Absolute difference between two directions, in `[0, π]`.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    wrap_angle((a - b).abs())
}

/// Angle at `p2` between the rays towards `p1` and `p3`, in `[0, π]`.
pub fn angle3(p1: Option<&Keypoint>, p2: Option<&Keypoint>, p3: Option<&Keypoint>) -> Option<f64> {
    let vertex = p2?.position();
    let ray1 = p1?.position() - vertex;
    let ray2 = p3?.position() - vertex;
    Some(angle_difference(heading(&ray1), heading(&ray2)))
}

/// Direction of the segment `p1 -> p2` against the x axis, in `(−π, π]`.
/// Not wrapped: diff the results with [`angle_difference`].
pub fn angle_to_horizontal(p1: Option<&Keypoint>, p2: Option<&Keypoint>) -> Option<f64> {
    let segment = p2?.position() - p1?.position();
    Some(heading(&segment))
}

pub fn distance(p1: Option<&Keypoint>, p2: Option<&Keypoint>) -> Option<f64> {
    Some((p1?.position() - p2?.position()).norm())
}

/// Length of the two-segment chain `a -> b -> c` (upper arm + forearm, etc.).
pub fn limb_length(a: Option<&Keypoint>, b: Option<&Keypoint>, c: Option<&Keypoint>) -> Option<f64> {
    Some(distance(a, b)? + distance(b, c)?)
}

/// `min / max` of two lengths; 0 when the longer one is zero.
pub fn min_max_ratio(a: f64, b: f64) -> f64 {
    let longest = a.max(b);
    if longest > 0.0 {
        a.min(b) / longest
    } else {
        0.0
    }
}

fn heading(v: &Vector2<f64>) -> f64 {
    v.y.atan2(v.x)
}
