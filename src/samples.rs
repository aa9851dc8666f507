// src/samples.rs
//
// Fixed detector outputs used by the demo run and by tests.
use crate::keypoint::Keypoint;
use once_cell::sync::Lazy;

fn kp(label: &str, x: f64, y: f64, confidence: f64) -> Keypoint {
    Keypoint::new(label, x, y, confidence)
}

/// Upper-body reference pose, arms lowered and spread.
pub static TARGET: Lazy<Vec<Keypoint>> = Lazy::new(|| {
    vec![
        kp("nose", 294.0, 69.0, 0.997),
        kp("left_shoulder", 432.0, 226.0, 0.994),
        kp("right_shoulder", 142.0, 233.0, 0.998),
        kp("left_elbow", 482.0, 363.0, 0.269),
        kp("right_elbow", 79.0, 380.0, 0.992),
        kp("left_wrist", 532.0, 498.0, 0.181),
        kp("right_wrist", 15.0, 527.0, 0.974),
    ]
});

/// `TARGET` shifted by a pixel or two.
pub static GOOD_PLAYER: Lazy<Vec<Keypoint>> = Lazy::new(|| {
    vec![
        kp("nose", 295.0, 71.0, 0.996),
        kp("left_shoulder", 431.0, 228.0, 0.993),
        kp("right_shoulder", 143.0, 235.0, 0.997),
        kp("left_elbow", 481.0, 365.0, 0.268),
        kp("right_elbow", 80.0, 382.0, 0.991),
        kp("left_wrist", 531.0, 500.0, 0.180),
        kp("right_wrist", 16.0, 529.0, 0.973),
    ]
});

/// Small, stiff figure in the top-left corner of the frame.
pub static BAD_PLAYER: Lazy<Vec<Keypoint>> = Lazy::new(|| {
    vec![
        kp("nose", 100.0, 50.0, 0.9),
        kp("left_shoulder", 150.0, 100.0, 0.8),
        kp("right_shoulder", 50.0, 100.0, 0.8),
        kp("left_elbow", 200.0, 150.0, 0.7),
        kp("right_elbow", 0.0, 150.0, 0.7),
        kp("left_wrist", 250.0, 200.0, 0.6),
        kp("right_wrist", 0.0, 200.0, 0.6),
    ]
});

/// Full 17-point detection with both arms raised over the head.
pub static ARMS_UP: Lazy<Vec<Keypoint>> = Lazy::new(|| {
    vec![
        kp("nose", 339.0, 204.0, 0.997),
        kp("left_eye", 358.0, 190.0, 0.994),
        kp("right_eye", 313.0, 194.0, 0.975),
        kp("left_ear", 389.0, 212.0, 0.934),
        kp("right_ear", 288.0, 224.0, 0.434),
        kp("left_shoulder", 467.0, 312.0, 0.973),
        kp("right_shoulder", 250.0, 312.0, 0.935),
        kp("left_elbow", 561.0, 227.0, 0.939),
        kp("right_elbow", 172.0, 204.0, 0.77),
        kp("left_wrist", 383.0, 135.0, 0.988),
        kp("right_wrist", 290.0, 128.0, 0.954),
        kp("left_hip", 453.0, 480.0, 0.373),
        kp("right_hip", 318.0, 480.0, 0.271),
        kp("left_knee", 420.0, 449.0, 0.005),
        kp("right_knee", 262.0, 445.0, 0.003),
        kp("left_ankle", 446.0, 480.0, 0.0),
        kp("right_ankle", 377.0, 473.0, 0.0),
    ]
});

/// One named player/target pairing.
#[derive(Debug, Clone)]
pub struct SampleCase {
    pub name: &'static str,
    pub player_label: &'static str,
    pub target_label: &'static str,
    pub player: Vec<Keypoint>,
    pub target: Vec<Keypoint>,
}

pub fn sample_cases() -> Vec<SampleCase> {
    vec![
        SampleCase {
            name: "Good Match",
            player_label: "good_player",
            target_label: "target",
            player: GOOD_PLAYER.clone(),
            target: TARGET.clone(),
        },
        SampleCase {
            name: "Bad Match",
            player_label: "bad_player",
            target_label: "target",
            player: BAD_PLAYER.clone(),
            target: TARGET.clone(),
        },
        SampleCase {
            name: "Perfect Match",
            player_label: "target",
            target_label: "target",
            player: TARGET.clone(),
            target: TARGET.clone(),
        },
        SampleCase {
            name: "Arms Raised",
            player_label: "arms_up",
            target_label: "target",
            player: ARMS_UP.clone(),
            target: TARGET.clone(),
        },
    ]
}
