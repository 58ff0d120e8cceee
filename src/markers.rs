//! Recorded wrist positions and their tuned pitches
//!
//! Each hand owns an append-only store. Markers are created during
//! capture and never change afterwards.

use serde::{Deserialize, Serialize};

use crate::pose::Point;

/// Side length of a marker's clickable square
pub const MARKER_SIZE: f64 = 30.0;

/// Distance kept between a label and the bottom edge
pub const LABEL_MARGIN: f64 = 10.0;

/// Which hand a marker, store or oscillator belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hand {
    Left,
    Right,
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Hand::Left => write!(f, "left"),
            Hand::Right => write!(f, "right"),
        }
    }
}

/// A recorded position with the pitch it was tuned to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub x: f64,
    pub y: f64,
    pub tuned_frequency: f64,
    pub label: String,
}

impl Marker {
    pub fn new(position: Point, tuned_frequency: f64) -> Self {
        Self {
            x: position.x,
            y: position.y,
            tuned_frequency,
            label: format!("{:.3}", tuned_frequency),
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Whether `point` lies strictly inside the top-left anchored square
    pub fn contains(&self, point: Point) -> bool {
        point.x > self.x
            && point.x < self.x + MARKER_SIZE
            && point.y > self.y
            && point.y < self.y + MARKER_SIZE
    }

    /// Where the label goes for a canvas of the given height
    pub fn label_placement(&self, canvas_height: f64) -> LabelPlacement {
        if self.y + MARKER_SIZE + LABEL_MARGIN > canvas_height - LABEL_MARGIN {
            LabelPlacement::Above
        } else {
            LabelPlacement::Below
        }
    }

    /// Baseline anchor of the label text
    pub fn label_anchor(&self, canvas_height: f64) -> Point {
        match self.label_placement(canvas_height) {
            LabelPlacement::Above => Point::new(self.x, self.y - 2.0),
            LabelPlacement::Below => Point::new(self.x, self.y + MARKER_SIZE + 2.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPlacement {
    Above,
    Below,
}

/// Ordered markers for one hand, append-only
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkerStore {
    markers: Vec<Marker>,
}

impl MarkerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a marker, returning its index
    pub fn push(&mut self, marker: Marker) -> usize {
        self.markers.push(marker);
        self.markers.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    /// The last marker in index order containing `point`.
    ///
    /// Overlapping markers resolve to the most recently recorded one.
    pub fn hit(&self, point: Point) -> Option<(usize, &Marker)> {
        self.markers
            .iter()
            .enumerate()
            .filter(|(_, m)| m.contains(point))
            .last()
    }

    /// Every marker containing `point`, in index order
    pub fn hits(&self, point: Point) -> impl Iterator<Item = &Marker> {
        self.markers.iter().filter(move |m| m.contains(point))
    }
}
