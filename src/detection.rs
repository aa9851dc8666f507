// src/detection.rs
//
// Decoding of detection-service responses into poses. The service has
// shipped several response layouts over time; all of them are accepted.
use crate::error::Result;
use crate::keypoint::{FrameSize, HandPrediction, Keypoint, Pose};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Prediction blocks that may carry the body keypoints, newest layout first.
const KEYPOINT_BLOCKS: [&str; 2] = ["/keypoint_predictions", "/model_predictions"];

const HAND_PREDICTIONS: &str = "/hand_predictions/predictions";

/// Decodes either a bare keypoint array or a full detection response.
pub fn parse_pose(json: &str) -> Result<Pose> {
    let value: Value = serde_json::from_str(json)?;
    pose_from_value(&value)
}

pub fn pose_from_value(value: &Value) -> Result<Pose> {
    if value.is_array() {
        return Ok(Pose::new(decode(value)?));
    }

    // Workflow responses wrap everything in `outputs[0]`
    let block = value.pointer("/outputs/0").unwrap_or(value);

    let mut frame = None;
    let mut keypoints = None;
    for name in KEYPOINT_BLOCKS {
        let Some(predictions) = block.pointer(name) else {
            continue;
        };
        if let Some(points) = predictions.pointer("/predictions/0/keypoints") {
            keypoints = Some(decode::<Vec<Keypoint>>(points)?);
            frame = frame_size(predictions);
            break;
        }
    }

    let keypoints = match keypoints {
        Some(points) => points,
        None => match block.get("keypoints").or_else(|| value.get("keypoints")) {
            Some(points) => decode(points)?,
            None => {
                warn!("no keypoints found in detection response");
                Vec::new()
            }
        },
    };

    let hands = match block.pointer(HAND_PREDICTIONS) {
        Some(hands) => Some(decode::<Vec<HandPrediction>>(hands)?),
        None => None,
    };

    debug!(
        keypoints = keypoints.len(),
        hands = hands.as_ref().map(Vec::len),
        "decoded detection response"
    );

    Ok(Pose {
        keypoints,
        hands,
        frame,
    })
}

/// Reads a pose file from disk.
pub fn load_pose(path: impl AsRef<Path>) -> Result<Pose> {
    let contents = std::fs::read_to_string(path)?;
    parse_pose(&contents)
}

/// Reads a pre-computed target file: image file name to detection response.
pub fn load_target_poses(path: impl AsRef<Path>) -> Result<BTreeMap<String, Pose>> {
    let contents = std::fs::read_to_string(path)?;
    parse_target_poses(&contents)
}

pub fn parse_target_poses(json: &str) -> Result<BTreeMap<String, Pose>> {
    let responses: BTreeMap<String, Value> = serde_json::from_str(json)?;
    responses
        .into_iter()
        .map(|(image, response)| Ok((image, pose_from_value(&response)?)))
        .collect()
}

fn frame_size(predictions: &Value) -> Option<FrameSize> {
    let image = predictions.get("image")?;
    Some(FrameSize {
        width: image.get("width")?.as_f64()?,
        height: image.get("height")?.as_f64()?,
    })
}

fn decode<T: DeserializeOwned>(value: &Value) -> Result<T> {
    Ok(T::deserialize(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKFLOW_RESPONSE: &str = r#"{
        "outputs": [{
            "keypoint_predictions": {
                "image": {"width": 1280, "height": 720},
                "predictions": [{
                    "keypoints": [
                        {"x": 294, "y": 69, "confidence": 0.997, "class": "nose", "class_id": 0},
                        {"x": 432, "y": 226, "confidence": 0.994, "class": "left_shoulder", "class_id": 5}
                    ]
                }]
            },
            "hand_predictions": {
                "predictions": [{"x": 520, "y": 500, "class": "open", "confidence": 0.8}]
            }
        }]
    }"#;

    #[test]
    fn decodes_workflow_response() {
        let pose = parse_pose(WORKFLOW_RESPONSE).unwrap();
        assert_eq!(pose.keypoints.len(), 2);
        assert_eq!(pose.keypoints[0].label, "nose");
        assert_eq!(pose.keypoints[1].confidence, 0.994);
        assert_eq!(
            pose.frame,
            Some(FrameSize {
                width: 1280.0,
                height: 720.0
            })
        );
        let hands = pose.hands.unwrap();
        assert_eq!(hands.len(), 1);
        assert_eq!(hands[0].label, "open");
    }

    #[test]
    fn falls_back_to_model_predictions() {
        let json = r#"{"outputs": [{"model_predictions": {"predictions": [{"keypoints": [
            {"x": 1, "y": 2, "class": "nose"}
        ]}]}}]}"#;
        let pose = parse_pose(json).unwrap();
        assert_eq!(pose.keypoints.len(), 1);
        // Missing confidence means fully confident
        assert_eq!(pose.keypoints[0].confidence, 1.0);
        assert!(pose.hands.is_none());
        assert!(pose.frame.is_none());
    }

    #[test]
    fn accepts_flat_layouts() {
        let top_level = parse_pose(r#"{"keypoints": [{"x": 1, "y": 2, "name": "nose"}]}"#).unwrap();
        assert_eq!(top_level.keypoints[0].label, "nose");

        let bare = parse_pose(r#"[{"x": 1, "y": 2, "confidence": 0.5, "class": "nose"}]"#).unwrap();
        assert_eq!(bare.keypoints.len(), 1);
        assert!(bare.hands.is_none());
    }

    #[test]
    fn empty_hand_block_is_distinct_from_missing() {
        let json = r#"{"outputs": [{"keypoints": [], "hand_predictions": {"predictions": []}}]}"#;
        let pose = parse_pose(json).unwrap();
        assert_eq!(pose.hands, Some(Vec::new()));
    }

    #[test]
    fn response_without_keypoints_is_empty_pose() {
        let pose = parse_pose(r#"{"outputs": [{}]}"#).unwrap();
        assert!(pose.keypoints.is_empty());
    }

    #[test]
    fn malformed_payloads_are_errors() {
        assert!(parse_pose("not json").is_err());
        assert!(parse_pose(r#"{"keypoints": [{"x": "left"}]}"#).is_err());
    }

    #[test]
    fn target_file_maps_images_to_poses() {
        let json = format!(r#"{{"pose1.jpg": {WORKFLOW_RESPONSE}, "pose2.jpg": {{"keypoints": []}}}}"#);
        let targets = parse_target_poses(&json).unwrap();
        assert_eq!(targets.keys().collect::<Vec<_>>(), vec!["pose1.jpg", "pose2.jpg"]);
        assert_eq!(targets["pose1.jpg"].keypoints.len(), 2);
        assert!(targets["pose2.jpg"].keypoints.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join(format!("missing_{}.json", uuid::Uuid::new_v4()));
        assert!(matches!(load_pose(&path), Err(crate::error::ScoringError::Io(_))));
    }
}
