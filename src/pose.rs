//! Pose snapshots delivered by the pose estimator
//!
//! The core only needs the two wrists. Everything else the estimator
//! reports is kept for the overlay: a flat keypoint list and the
//! skeleton's bones as pairs of joint positions.

use serde::{Deserialize, Serialize};

/// A 2D screen position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// One named joint as reported by a PoseNet-style estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub part: String,
    pub position: Point,
    #[serde(default)]
    pub score: f64,
}

impl Keypoint {
    pub fn is_wrist(&self) -> bool {
        self.part == LEFT_WRIST || self.part == RIGHT_WRIST
    }
}

const LEFT_WRIST: &str = "leftWrist";
const RIGHT_WRIST: &str = "rightWrist";
const LEFT_EYE: &str = "leftEye";
const RIGHT_EYE: &str = "rightEye";

/// Errors raised while adapting an estimator's output
#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    #[error("pose is missing the {0} keypoint")]
    MissingKeypoint(&'static str),
}

/// The most recent pose, reduced to what the session needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseSnapshot {
    pub left_wrist: Point,
    pub right_wrist: Point,
    #[serde(default)]
    pub keypoints: Vec<Keypoint>,
    #[serde(default)]
    pub skeleton: Vec<(Point, Point)>,
}

impl PoseSnapshot {
    /// Snapshot with only the wrists known
    pub fn from_wrists(left_wrist: Point, right_wrist: Point) -> Self {
        Self {
            left_wrist,
            right_wrist,
            keypoints: Vec::new(),
            skeleton: Vec::new(),
        }
    }

    /// Adapt a raw keypoint list, requiring both wrists to be present
    pub fn from_keypoints(keypoints: Vec<Keypoint>) -> Result<Self, PoseError> {
        let left_wrist = find(&keypoints, LEFT_WRIST).ok_or(PoseError::MissingKeypoint(LEFT_WRIST))?;
        let right_wrist =
            find(&keypoints, RIGHT_WRIST).ok_or(PoseError::MissingKeypoint(RIGHT_WRIST))?;

        Ok(Self {
            left_wrist,
            right_wrist,
            keypoints,
            skeleton: Vec::new(),
        })
    }

    /// Attach the estimator's bones, each given as its two end joints
    pub fn with_skeleton(mut self, bones: impl IntoIterator<Item = [Keypoint; 2]>) -> Self {
        self.skeleton = bones
            .into_iter()
            .map(|[a, b]| (a.position, b.position))
            .collect();
        self
    }

    /// Overlay dot diameter: half the distance between the eyes, so the
    /// dots shrink as the performer steps away from the camera
    pub fn keypoint_diameter(&self) -> Option<f64> {
        let left = find(&self.keypoints, LEFT_EYE)?;
        let right = find(&self.keypoints, RIGHT_EYE)?;
        Some(left.distance(&right) / 2.0)
    }
}

fn find(keypoints: &[Keypoint], part: &str) -> Option<Point> {
    keypoints.iter().find(|k| k.part == part).map(|k| k.position)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypoint(part: &str, x: f64, y: f64) -> Keypoint {
        Keypoint {
            part: part.to_string(),
            position: Point::new(x, y),
            score: 0.9,
        }
    }

    #[test]
    fn test_from_keypoints() {
        let pose = PoseSnapshot::from_keypoints(vec![
            keypoint("nose", 1.0, 1.0),
            keypoint("leftWrist", 10.0, 20.0),
            keypoint("rightWrist", 30.0, 40.0),
        ])
        .unwrap();

        assert_eq!(pose.left_wrist, Point::new(10.0, 20.0));
        assert_eq!(pose.right_wrist, Point::new(30.0, 40.0));
        assert_eq!(pose.keypoints.len(), 3);
    }

    #[test]
    fn test_missing_wrist() {
        let err = PoseSnapshot::from_keypoints(vec![keypoint("leftWrist", 0.0, 0.0)]).unwrap_err();
        assert!(matches!(err, PoseError::MissingKeypoint("rightWrist")));
    }

    #[test]
    fn test_keypoint_diameter() {
        let mut pose = PoseSnapshot::from_wrists(Point::default(), Point::default());
        assert_eq!(pose.keypoint_diameter(), None);

        pose.keypoints = vec![keypoint("leftEye", 0.0, 0.0), keypoint("rightEye", 30.0, 40.0)];
        assert_eq!(pose.keypoint_diameter(), Some(25.0));
    }

    #[test]
    fn test_snapshot_deserialization() {
        let json = r#"{"left_wrist":{"x":1.0,"y":2.0},"right_wrist":{"x":3.0,"y":4.0}}"#;
        let pose: PoseSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(pose.right_wrist, Point::new(3.0, 4.0));
        assert!(pose.keypoints.is_empty());
        assert!(pose.skeleton.is_empty());
    }

    #[test]
    fn test_with_skeleton_keeps_joint_positions() {
        let pose = PoseSnapshot::from_wrists(Point::default(), Point::default()).with_skeleton([[
            keypoint("leftShoulder", 1.0, 2.0),
            keypoint("leftElbow", 3.0, 4.0),
        ]]);
        assert_eq!(pose.skeleton, vec![(Point::new(1.0, 2.0), Point::new(3.0, 4.0))]);
    }
}
