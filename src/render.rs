//! Scene descriptions handed to the render surface
//!
//! The core decides what must appear; how it is drawn is up to the host.

use serde::Serialize;
use tracing::trace;

use crate::layout::{Canvas, Region, VIDEO_OFFSET};
use crate::markers::{Hand, MarkerStore, MARKER_SIZE};
use crate::pose::{Point, PoseSnapshot};
use crate::state::Mode;

const TITLE: &str = "Melaine";

const INSTRUCTIONS: [&str; 2] = [
    "Click R(X) button to store position of right hand on X axis",
    "Click L(Y) button to store position of left hand on Y axis",
];

/// One thing to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawItem {
    StartSquare { region: Region, title: String },
    Video { origin: Point },
    Keypoint { center: Point, diameter: Option<f64>, filled: bool },
    Bone { from: Point, to: Point },
    Button { region: Region, label: String },
    Instructions { region: Region, lines: Vec<String> },
    Marker { hand: Hand, origin: Point, size: f64, label: String, label_anchor: Point },
}

/// Everything to draw for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub mode: Mode,
    pub items: Vec<DrawItem>,
}

impl Scene {
    pub fn idle(canvas: &Canvas) -> Self {
        Self {
            mode: Mode::Idle,
            items: vec![DrawItem::StartSquare {
                region: canvas.start_square(),
                title: TITLE.to_string(),
            }],
        }
    }

    pub fn capture(canvas: &Canvas, pose: Option<&PoseSnapshot>) -> Self {
        let mut items = vec![DrawItem::Video { origin: VIDEO_OFFSET }];

        if let Some(pose) = pose {
            let diameter = pose.keypoint_diameter();
            items.extend(pose.keypoints.iter().map(|k| DrawItem::Keypoint {
                center: on_video(k.position),
                diameter,
                filled: k.is_wrist(),
            }));
            items.extend(pose.skeleton.iter().map(|&(a, b)| DrawItem::Bone {
                from: on_video(a),
                to: on_video(b),
            }));
        }

        items.push(button(canvas.right_button(), "R(X)"));
        items.push(button(canvas.left_button(), "L(Y)"));
        let b = canvas.button_size();
        let next = canvas.next_button();
        items.push(button(Region::new(next.x, next.y, b, b), "Next"));
        items.push(DrawItem::Instructions {
            region: canvas.instruction_bar(),
            lines: INSTRUCTIONS.iter().map(|s| s.to_string()).collect(),
        });

        Self {
            mode: Mode::Capture,
            items,
        }
    }

    /// Every recorded marker with its label, right hand first
    pub fn markers(mode: Mode, canvas: &Canvas, right: &MarkerStore, left: &MarkerStore) -> Self {
        let items = [(Hand::Right, right), (Hand::Left, left)]
            .into_iter()
            .flat_map(move |(hand, store)| {
                store.iter().map(move |m| DrawItem::Marker {
                    hand,
                    origin: m.position(),
                    size: MARKER_SIZE,
                    label: m.label.clone(),
                    label_anchor: m.label_anchor(canvas.height),
                })
            })
            .collect();

        Self { mode, items }
    }

    pub fn marker_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, DrawItem::Marker { .. }))
            .count()
    }
}

/// Receives one scene per frame
pub trait RenderSurface {
    fn present(&mut self, scene: &Scene);
}

/// Keeps every presented scene
impl RenderSurface for Vec<Scene> {
    fn present(&mut self, scene: &Scene) {
        self.push(scene.clone());
    }
}

/// Surface for headless runs: scenes go to the trace log
#[derive(Debug, Default)]
pub struct TraceSurface {
    last_mode: Option<Mode>,
}

impl RenderSurface for TraceSurface {
    fn present(&mut self, scene: &Scene) {
        if self.last_mode != Some(scene.mode) {
            trace!(
                mode = %scene.mode,
                items = scene.items.len(),
                markers = scene.marker_count(),
                "first frame in mode"
            );
            self.last_mode = Some(scene.mode);
        }
        trace!(scene = ?serde_json::to_string(scene).ok(), "frame");
    }
}

/// Camera coordinates to canvas coordinates
fn on_video(p: Point) -> Point {
    Point::new(p.x + VIDEO_OFFSET.x, p.y + VIDEO_OFFSET.y)
}

fn button(region: Region, label: &str) -> DrawItem {
    DrawItem::Button {
        region,
        label: label.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::Marker;
    use crate::pose::Keypoint;

    const CANVAS: Canvas = Canvas::new(1500.0, 900.0);

    #[test]
    fn test_capture_without_pose_has_no_keypoints() {
        let scene = Scene::capture(&CANVAS, None);
        assert!(!scene
            .items
            .iter()
            .any(|item| matches!(item, DrawItem::Keypoint { .. })));
        assert_eq!(
            scene
                .items
                .iter()
                .filter(|item| matches!(item, DrawItem::Button { .. }))
                .count(),
            3
        );
    }

    #[test]
    fn test_capture_overlay_offsets_keypoints() {
        let mut pose = PoseSnapshot::from_wrists(Point::default(), Point::default());
        pose.keypoints = vec![
            Keypoint {
                part: "leftWrist".to_string(),
                position: Point::new(10.0, 10.0),
                score: 1.0,
            },
            Keypoint {
                part: "nose".to_string(),
                position: Point::new(20.0, 20.0),
                score: 1.0,
            },
        ];

        let scene = Scene::capture(&CANVAS, Some(&pose));
        let keypoints: Vec<_> = scene
            .items
            .iter()
            .filter_map(|item| match item {
                DrawItem::Keypoint { center, filled, .. } => Some((*center, *filled)),
                _ => None,
            })
            .collect();
        assert_eq!(
            keypoints,
            vec![(Point::new(130.0, 60.0), true), (Point::new(140.0, 70.0), false)]
        );
    }

    #[test]
    fn test_capture_overlay_draws_bones() {
        let mut pose = PoseSnapshot::from_wrists(Point::default(), Point::default());
        pose.skeleton = vec![(Point::new(0.0, 0.0), Point::new(10.0, 20.0))];

        let scene = Scene::capture(&CANVAS, Some(&pose));
        let bones: Vec<_> = scene
            .items
            .iter()
            .filter(|item| matches!(item, DrawItem::Bone { .. }))
            .collect();
        assert_eq!(
            bones,
            vec![&DrawItem::Bone {
                from: Point::new(120.0, 50.0),
                to: Point::new(130.0, 70.0),
            }]
        );
    }

    #[test]
    fn test_marker_labels_follow_edge_policy() {
        let mut right = MarkerStore::new();
        right.push(Marker::new(Point::new(200.0, 300.0), 148.21));
        let mut left = MarkerStore::new();
        left.push(Marker::new(Point::new(50.0, 880.0), 500.0));

        let scene = Scene::markers(Mode::Review, &CANVAS, &right, &left);
        assert_eq!(scene.marker_count(), 2);
        assert_eq!(
            scene.items[0],
            DrawItem::Marker {
                hand: Hand::Right,
                origin: Point::new(200.0, 300.0),
                size: 30.0,
                label: "148.210".to_string(),
                label_anchor: Point::new(200.0, 332.0),
            }
        );
        match &scene.items[1] {
            DrawItem::Marker { label_anchor, .. } => {
                assert_eq!(*label_anchor, Point::new(50.0, 878.0))
            }
            other => panic!("unexpected item {other:?}"),
        }
    }
}
