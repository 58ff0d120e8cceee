//! Input event definitions and the wire format they arrive in

use serde::Deserialize;

use crate::pose::{Keypoint, Point, PoseSnapshot};

use super::listener::InputError;

/// Events delivered to the session
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer clicked (pressed and released in place)
    Click(Point),
    /// Pointer button went down
    Press(Point),
    /// Pointer moved, with or without a button held
    Move(Point),
    /// Pointer button came up
    Release(Point),
    /// A new pose replaces the previous snapshot
    Pose(PoseSnapshot),
    /// Canvas size changed
    Resize { width: f64, height: f64 },
    /// Host asks for a frame outside the regular cadence
    Frame,
}

/// One line as written by the host
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireEvent {
    Click { x: f64, y: f64 },
    Press { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Release { x: f64, y: f64 },
    /// PoseNet-style keypoint list, optionally with the skeleton's bones
    Pose {
        keypoints: Vec<Keypoint>,
        #[serde(default)]
        skeleton: Vec<[Keypoint; 2]>,
    },
    /// Pre-reduced pose with only the wrists
    Wrists { left_wrist: Point, right_wrist: Point },
    Resize { width: f64, height: f64 },
    Frame,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<InputEvent>, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let wire: WireEvent = serde_json::from_str(line).map_err(|source| InputError::Malformed {
        line: line.to_string(),
        source,
    })?;

    let event = match wire {
        WireEvent::Click { x, y } => InputEvent::Click(Point::new(x, y)),
        WireEvent::Press { x, y } => InputEvent::Press(Point::new(x, y)),
        WireEvent::Move { x, y } => InputEvent::Move(Point::new(x, y)),
        WireEvent::Release { x, y } => InputEvent::Release(Point::new(x, y)),
        WireEvent::Pose {
            keypoints,
            skeleton,
        } => InputEvent::Pose(PoseSnapshot::from_keypoints(keypoints)?.with_skeleton(skeleton)),
        WireEvent::Wrists {
            left_wrist,
            right_wrist,
        } => InputEvent::Pose(PoseSnapshot::from_wrists(left_wrist, right_wrist)),
        WireEvent::Resize { width, height } => InputEvent::Resize { width, height },
        WireEvent::Frame => InputEvent::Frame,
    };

    Ok(Some(event))
}
