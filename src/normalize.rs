// src/normalize.rs
//
// Two ways of putting poses into a shared frame before comparing them:
// center/scale (dimensionless, size invariant) and reference translation
// (pixel space, position invariant only).
use crate::geometry::distance;
use crate::keypoint::{labels, Keypoint, KeypointIndex};
use nalgebra::Vector2;
use tracing::debug;

/// Lower bound on the body scale, guards against near-zero divisors.
pub const MIN_BODY_SCALE: f64 = 50.0;
/// Scale used when no anchor pair is visible.
pub const DEFAULT_BODY_SCALE: f64 = 100.0;
/// A fallback reference point must be more confident than this.
pub const REFERENCE_MIN_CONFIDENCE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyFrame {
    pub center: Vector2<f64>,
    pub scale: f64,
}

impl BodyFrame {
    /// Picks the frame from nose and hip center, then the shoulders, then
    /// the origin with a unit-ish default scale.
    pub fn of(index: &KeypointIndex) -> Self {
        if let (Some(nose), Some(hip)) = (index.get(labels::NOSE), index.center_hip()) {
            let scale = distance(Some(nose), Some(&hip)).unwrap_or(0.0);
            return Self {
                center: (nose.position() + hip.position()) / 2.0,
                scale: scale.max(MIN_BODY_SCALE),
            };
        }

        if let (Some(left), Some(right)) = (
            index.get(labels::LEFT_SHOULDER),
            index.get(labels::RIGHT_SHOULDER),
        ) {
            return Self {
                center: (left.position() + right.position()) / 2.0,
                scale: (left.x - right.x).abs().max(MIN_BODY_SCALE),
            };
        }

        Self {
            center: Vector2::zeros(),
            scale: DEFAULT_BODY_SCALE,
        }
    }

    pub fn apply(&self, keypoint: &Keypoint) -> Keypoint {
        keypoint.moved_to((keypoint.position() - self.center) / self.scale)
    }
}

/// Maps every point into the body frame. The derived hip center is added
/// under its synthetic label when either hip is visible.
pub fn normalize_to_body(index: &KeypointIndex) -> KeypointIndex {
    let frame = BodyFrame::of(index);
    let mut normalized: KeypointIndex = index.iter().map(|kp| frame.apply(kp)).collect();

    if let Some(hip) = index.center_hip() {
        let mut hip = frame.apply(&hip);
        hip.label = labels::CENTER_HIP.to_string();
        normalized.insert(hip);
    }

    normalized
}

/// Nose, else the shoulder midpoint, else the most confident point above
/// [`REFERENCE_MIN_CONFIDENCE`].
pub fn reference_point(index: &KeypointIndex) -> Option<Vector2<f64>> {
    index
        .get(labels::NOSE)
        .map(Keypoint::position)
        .or_else(|| shoulder_midpoint(index))
        .or_else(|| {
            index
                .best_point(REFERENCE_MIN_CONFIDENCE)
                .map(Keypoint::position)
        })
}

/// Shifts the pose so its reference point sits at the origin. Without a
/// reference point the pose is returned untouched.
pub fn translate_to_reference(index: &KeypointIndex) -> KeypointIndex {
    match reference_point(index) {
        Some(origin) => index
            .iter()
            .map(|kp| kp.moved_to(kp.position() - origin))
            .collect(),
        None => {
            debug!("no reference point found, comparing untranslated pose");
            index.clone()
        }
    }
}

fn shoulder_midpoint(index: &KeypointIndex) -> Option<Vector2<f64>> {
    let left = index.get(labels::LEFT_SHOULDER)?;
    let right = index.get(labels::RIGHT_SHOULDER)?;
    Some((left.position() + right.position()) / 2.0)
}
