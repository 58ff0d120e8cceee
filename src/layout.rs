//! Screen regions for each mode
//!
//! Everything is derived from the canvas size. Buttons sit in a column
//! along the right edge, each a square `width / 15` on a side.

use serde::{Deserialize, Serialize};

use crate::pose::Point;

/// Vertical gap between the R(X) and L(Y) buttons
const BUTTON_GAP: f64 = 20.0;

/// Side length of the Idle start square
const START_SQUARE: f64 = 100.0;

/// Offset of the webcam feed on the canvas
pub const VIDEO_OFFSET: Point = Point::new(120.0, 50.0);

/// Canvas dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Side length of a capture button
    pub fn button_size(&self) -> f64 {
        self.width / 15.0
    }

    /// Button recording a right-hand marker
    pub fn right_button(&self) -> Region {
        let b = self.button_size();
        Region::new(self.width - b, 0.0, b, b)
    }

    /// Button recording a left-hand marker
    pub fn left_button(&self) -> Region {
        let b = self.button_size();
        Region::new(self.width - b, b + BUTTON_GAP, b, b)
    }

    /// Button ending capture.
    ///
    /// Clickable area runs to the bottom of the canvas, twice the drawn height.
    pub fn next_button(&self) -> Region {
        let b = self.button_size();
        Region::new(self.width - b, self.height - 2.0 * b, b, 2.0 * b)
    }

    /// Instruction bar along the bottom, left of the button column
    pub fn instruction_bar(&self) -> Region {
        let b = self.button_size();
        Region::new(0.0, self.height - b, self.width - b, b)
    }

    /// Centred square shown while idle
    pub fn start_square(&self) -> Region {
        Region::new(
            self.width / 2.0 - START_SQUARE / 2.0,
            self.height / 2.0 - START_SQUARE / 2.0,
            START_SQUARE,
            START_SQUARE,
        )
    }
}

/// An axis-aligned rectangle, top-left anchored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Strict containment; points on the border are outside
    pub fn contains(&self, p: Point) -> bool {
        p.x > self.x && p.x < self.x + self.width && p.y > self.y && p.y < self.y + self.height
    }
}
