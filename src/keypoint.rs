// src/keypoint.rs
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keypoints below this confidence are ignored by every strategy.
pub const MIN_CONFIDENCE: f64 = 0.04;

pub mod labels {
    pub const NOSE: &str = "nose";
    pub const LEFT_EYE: &str = "left_eye";
    pub const RIGHT_EYE: &str = "right_eye";
    pub const LEFT_EAR: &str = "left_ear";
    pub const RIGHT_EAR: &str = "right_ear";
    pub const LEFT_SHOULDER: &str = "left_shoulder";
    pub const RIGHT_SHOULDER: &str = "right_shoulder";
    pub const LEFT_ELBOW: &str = "left_elbow";
    pub const RIGHT_ELBOW: &str = "right_elbow";
    pub const LEFT_WRIST: &str = "left_wrist";
    pub const RIGHT_WRIST: &str = "right_wrist";
    pub const LEFT_HIP: &str = "left_hip";
    pub const RIGHT_HIP: &str = "right_hip";
    pub const LEFT_KNEE: &str = "left_knee";
    pub const RIGHT_KNEE: &str = "right_knee";
    pub const LEFT_ANKLE: &str = "left_ankle";
    pub const RIGHT_ANKLE: &str = "right_ankle";

    // Synthetic anchors
    pub const CENTER_HIP: &str = "center_hip";
    pub const SHOULDER_CENTER: &str = "shoulder_center";

    /// COCO ordering, as emitted by the detection service.
    pub const COCO: [&str; 17] = [
        NOSE,
        LEFT_EYE,
        RIGHT_EYE,
        LEFT_EAR,
        RIGHT_EAR,
        LEFT_SHOULDER,
        RIGHT_SHOULDER,
        LEFT_ELBOW,
        RIGHT_ELBOW,
        LEFT_WRIST,
        RIGHT_WRIST,
        LEFT_HIP,
        RIGHT_HIP,
        LEFT_KNEE,
        RIGHT_KNEE,
        LEFT_ANKLE,
        RIGHT_ANKLE,
    ];
}

fn full_confidence() -> f64 {
    1.0
}

/// A labelled 2D body landmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    #[serde(default = "full_confidence")]
    pub confidence: f64,
    #[serde(rename = "class", alias = "name", default)]
    pub label: String,
}

impl Keypoint {
    pub fn new(label: impl Into<String>, x: f64, y: f64, confidence: f64) -> Self {
        Self {
            x,
            y,
            confidence,
            label: label.into(),
        }
    }

    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Same label and confidence, moved to `position`.
    pub fn moved_to(&self, position: Vector2<f64>) -> Self {
        Self {
            x: position.x,
            y: position.y,
            confidence: self.confidence,
            label: self.label.clone(),
        }
    }
}

/// A hand detection returned alongside the body keypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandPrediction {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "class", default)]
    pub label: String,
    #[serde(default = "full_confidence")]
    pub confidence: f64,
}

impl HandPrediction {
    pub fn new(label: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            label: label.into(),
            confidence: 1.0,
        }
    }
}

/// Pixel dimensions of the frame a pose was detected in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: f64,
    pub height: f64,
}

impl Default for FrameSize {
    fn default() -> Self {
        // Capture resolution of the game camera
        Self {
            width: 640.0,
            height: 480.0,
        }
    }
}

/// One detected pose instance as handed to the scoring engine.
///
/// `hands` is `None` when the detection call carried no hand data at all,
/// and `Some(vec![])` when hands were looked for and none were found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pose {
    pub keypoints: Vec<Keypoint>,
    pub hands: Option<Vec<HandPrediction>>,
    pub frame: Option<FrameSize>,
}

impl Pose {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self {
            keypoints,
            hands: None,
            frame: None,
        }
    }

    pub fn with_hands(mut self, hands: Vec<HandPrediction>) -> Self {
        self.hands = Some(hands);
        self
    }

    pub fn with_frame(mut self, frame: FrameSize) -> Self {
        self.frame = Some(frame);
        self
    }

    pub fn frame_size(&self) -> FrameSize {
        self.frame.unwrap_or_default()
    }
}

impl From<Vec<Keypoint>> for Pose {
    fn from(keypoints: Vec<Keypoint>) -> Self {
        Self::new(keypoints)
    }
}

/// Label -> keypoint lookup built from a raw keypoint list.
///
/// Ordered by label so that every iteration (and therefore every float
/// accumulation) happens in the same order on every call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeypointIndex {
    points: BTreeMap<String, Keypoint>,
}

impl KeypointIndex {
    /// Drops keypoints below `min_confidence`; a repeated label overwrites
    /// the earlier entry.
    pub fn from_keypoints(keypoints: &[Keypoint], min_confidence: f64) -> Self {
        let mut points = BTreeMap::new();
        for keypoint in keypoints {
            // NaN confidences are dropped too
            if !(keypoint.confidence >= min_confidence) {
                continue;
            }
            points.insert(keypoint.label.clone(), keypoint.clone());
        }
        Self { points }
    }

    pub fn get(&self, label: &str) -> Option<&Keypoint> {
        self.points.get(label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.points.contains_key(label)
    }

    pub fn insert(&mut self, keypoint: Keypoint) {
        self.points.insert(keypoint.label.clone(), keypoint);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keypoint> {
        self.points.values()
    }

    /// Midpoint of two labelled points carrying the lower confidence.
    /// With only one side present that side is returned unchanged.
    pub fn center_of(&self, a: &str, b: &str, label: &str) -> Option<Keypoint> {
        match (self.get(a), self.get(b)) {
            (Some(a), Some(b)) => Some(Keypoint {
                x: (a.x + b.x) / 2.0,
                y: (a.y + b.y) / 2.0,
                confidence: a.confidence.min(b.confidence),
                label: label.to_string(),
            }),
            (Some(only), None) | (None, Some(only)) => Some(only.clone()),
            (None, None) => None,
        }
    }

    pub fn center_hip(&self) -> Option<Keypoint> {
        self.center_of(labels::LEFT_HIP, labels::RIGHT_HIP, labels::CENTER_HIP)
    }

    pub fn shoulder_center(&self) -> Option<Keypoint> {
        self.center_of(
            labels::LEFT_SHOULDER,
            labels::RIGHT_SHOULDER,
            labels::SHOULDER_CENTER,
        )
    }

    /// Copy of the index without the given labels.
    pub fn without<S: AsRef<str>>(&self, excluded: &[S]) -> Self {
        let mut points = self.points.clone();
        for label in excluded {
            points.remove(label.as_ref());
        }
        Self { points }
    }

    pub fn mean_confidence(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        let total: f64 = self.points.values().map(|kp| kp.confidence).sum();
        Some(total / self.points.len() as f64)
    }

    /// Most confident point strictly above `min_confidence`; ties go to the
    /// first label in order.
    pub fn best_point(&self, min_confidence: f64) -> Option<&Keypoint> {
        self.points
            .values()
            .filter(|kp| kp.confidence > min_confidence)
            .fold(None, |best: Option<&Keypoint>, kp| match best {
                Some(current) if current.confidence >= kp.confidence => Some(current),
                _ => Some(kp),
            })
    }
}

impl FromIterator<Keypoint> for KeypointIndex {
    fn from_iter<I: IntoIterator<Item = Keypoint>>(iter: I) -> Self {
        let mut index = Self::default();
        for keypoint in iter {
            index.insert(keypoint);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Keypoint> {
        vec![
            Keypoint::new(labels::NOSE, 100.0, 50.0, 0.9),
            Keypoint::new(labels::LEFT_HIP, 120.0, 200.0, 0.6),
            Keypoint::new(labels::RIGHT_HIP, 80.0, 210.0, 0.4),
            Keypoint::new(labels::LEFT_ANKLE, 110.0, 400.0, 0.01),
        ]
    }

    #[test]
    fn index_drops_low_confidence_points() {
        let index = KeypointIndex::from_keypoints(&sample(), MIN_CONFIDENCE);
        assert_eq!(index.len(), 3);
        assert!(index.contains(labels::NOSE));
        assert!(!index.contains(labels::LEFT_ANKLE));
    }

    #[test]
    fn index_of_empty_input_is_empty() {
        let index = KeypointIndex::from_keypoints(&[], MIN_CONFIDENCE);
        assert!(index.is_empty());
        assert_eq!(index.mean_confidence(), None);
    }

    #[test]
    fn duplicate_labels_keep_the_last_entry() {
        let keypoints = vec![
            Keypoint::new(labels::NOSE, 1.0, 1.0, 0.9),
            Keypoint::new(labels::NOSE, 2.0, 3.0, 0.5),
        ];
        let index = KeypointIndex::from_keypoints(&keypoints, MIN_CONFIDENCE);
        let nose = index.get(labels::NOSE).unwrap();
        assert_eq!((nose.x, nose.y), (2.0, 3.0));
    }

    #[test]
    fn center_hip_averages_and_takes_min_confidence() {
        let index = KeypointIndex::from_keypoints(&sample(), MIN_CONFIDENCE);
        let hip = index.center_hip().unwrap();
        assert_eq!((hip.x, hip.y), (100.0, 205.0));
        assert_eq!(hip.confidence, 0.4);
        assert_eq!(hip.label, labels::CENTER_HIP);
    }

    #[test]
    fn center_of_single_side_returns_that_side() {
        let index = KeypointIndex::from_keypoints(&sample()[..2], MIN_CONFIDENCE);
        let hip = index.center_hip().unwrap();
        assert_eq!(hip.label, labels::LEFT_HIP);
        assert_eq!((hip.x, hip.y), (120.0, 200.0));

        let empty = KeypointIndex::default();
        assert!(empty.center_hip().is_none());
    }

    #[test]
    fn without_removes_listed_labels() {
        let index = KeypointIndex::from_keypoints(&sample(), MIN_CONFIDENCE);
        let trimmed = index.without(&[labels::NOSE, "not_a_label"]);
        assert_eq!(trimmed.len(), 2);
        assert!(!trimmed.contains(labels::NOSE));
    }

    #[test]
    fn best_point_respects_floor() {
        let index = KeypointIndex::from_keypoints(&sample(), MIN_CONFIDENCE);
        assert_eq!(index.best_point(0.3).unwrap().label, labels::NOSE);
        assert!(index.best_point(0.95).is_none());
    }

    #[test]
    fn keypoint_deserializes_detection_fields() {
        let kp: Keypoint =
            serde_json::from_str(r#"{"x": 3, "y": 4, "class": "nose"}"#).unwrap();
        assert_eq!(kp.label, labels::NOSE);
        assert_eq!(kp.confidence, 1.0);

        let kp: Keypoint =
            serde_json::from_str(r#"{"x": 3, "y": 4, "confidence": 0.5, "name": "left_eye"}"#)
                .unwrap();
        assert_eq!(kp.label, labels::LEFT_EYE);
        assert_eq!(kp.confidence, 0.5);
    }
}
