//! Drag-slide handler
//!
//! While the pointer is held over a marker, a dedicated sawtooth follows
//! the pointer's vertical position. Releasing the pointer silences both.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audio::{OscillatorBank, OscillatorId};
use crate::layout::Canvas;
use crate::mapping::{self, LEFT, RIGHT_LIVE};
use crate::markers::{Hand, MarkerStore};
use crate::pose::Point;

const SLIDE_LEVEL: f64 = 0.5;
const SLIDE_RAMP_SECS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn hand(&self) -> Hand {
        match self {
            Axis::X => Hand::Right,
            Axis::Y => Hand::Left,
        }
    }
}

/// One sliding oscillator, recomputed on every pointer move
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlidingState {
    pub axis: Axis,
    pub active: bool,
    pub frequency: Option<f64>,
}

impl SlidingState {
    fn new(axis: Axis) -> Self {
        Self {
            axis,
            active: false,
            frequency: None,
        }
    }

    /// Pitch for a held pointer. Both hands follow the vertical position;
    /// the right hand's range is spread over the canvas width.
    pub fn frequency_at(axis: Axis, point: Point, canvas: &Canvas) -> f64 {
        match axis {
            Axis::X => mapping::to_frequency(point.y, canvas.width, RIGHT_LIVE),
            Axis::Y => mapping::to_frequency(point.y, canvas.height, LEFT),
        }
    }

    fn drive(
        &mut self,
        point: Point,
        canvas: &Canvas,
        store: &MarkerStore,
        bank: &mut impl OscillatorBank,
    ) -> bool {
        if store.hits(point).next().is_none() {
            return false;
        }

        let osc = OscillatorId::sliding(self.axis.hand());
        let started = !self.active;
        if started {
            bank.start(osc);
            bank.set_amplitude(osc, SLIDE_LEVEL, SLIDE_RAMP_SECS);
            self.active = true;
        }

        let hz = Self::frequency_at(self.axis, point, canvas);
        bank.set_frequency(osc, hz);
        self.frequency = Some(hz);
        started
    }
}

/// Both sliding oscillators: X follows right-hand markers, Y left-hand ones
#[derive(Debug, Clone)]
pub struct SlideHandler {
    x: SlidingState,
    y: SlidingState,
}

impl Default for SlideHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl SlideHandler {
    /// Create a handler with both oscillators silent
    pub fn new() -> Self {
        Self {
            x: SlidingState::new(Axis::X),
            y: SlidingState::new(Axis::Y),
        }
    }

    #[cfg(test)]
    pub fn state(&self, axis: Axis) -> &SlidingState {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    /// Pointer held at `point`. Returns the hands whose sliding
    /// oscillator started on this call.
    pub fn on_drag(
        &mut self,
        point: Point,
        canvas: &Canvas,
        right: &MarkerStore,
        left: &MarkerStore,
        bank: &mut impl OscillatorBank,
    ) -> Vec<Hand> {
        let mut started = Vec::new();
        if self.x.drive(point, canvas, right, bank) {
            started.push(Hand::Right);
        }
        if self.y.drive(point, canvas, left, bank) {
            started.push(Hand::Left);
        }
        started
    }

    /// Pointer released: stop both oscillators whether or not they played
    pub fn on_release(&mut self, bank: &mut impl OscillatorBank) {
        debug!(x_active = self.x.active, y_active = self.y.active, "stopping slides");
        bank.stop(OscillatorId::SlidingX);
        bank.stop(OscillatorId::SlidingY);
        self.x = SlidingState::new(Axis::X);
        self.y = SlidingState::new(Axis::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioCommand;
    use crate::markers::Marker;
    use approx::assert_relative_eq;

    const CANVAS: Canvas = Canvas::new(1500.0, 900.0);

    fn stores() -> (MarkerStore, MarkerStore) {
        let mut right = MarkerStore::new();
        right.push(Marker::new(Point::new(100.0, 100.0), 150.0));
        let mut left = MarkerStore::new();
        left.push(Marker::new(Point::new(400.0, 400.0), 300.0));
        (right, left)
    }

    #[test]
    fn test_release_without_drag_stops_both() {
        let mut slides = SlideHandler::new();
        let mut bank: Vec<AudioCommand> = Vec::new();
        slides.on_release(&mut bank);
        assert_eq!(
            bank,
            vec![
                AudioCommand::Stop { osc: OscillatorId::SlidingX },
                AudioCommand::Stop { osc: OscillatorId::SlidingY },
            ]
        );
    }

    #[test]
    fn test_drag_over_right_marker() {
        let (right, left) = stores();
        let mut slides = SlideHandler::new();
        let mut bank: Vec<AudioCommand> = Vec::new();

        let started = slides.on_drag(Point::new(110.0, 120.0), &CANVAS, &right, &left, &mut bank);
        assert_eq!(started, vec![Hand::Right]);
        assert!(slides.state(Axis::X).active);
        assert!(!slides.state(Axis::Y).active);

        let hz = slides.state(Axis::X).frequency.unwrap();
        assert_relative_eq!(hz, mapping::map_range(120.0, 0.0, 1500.0, 130.81, 261.63));

        // Still held: retuned, not restarted
        bank.clear();
        let started = slides.on_drag(Point::new(110.0, 125.0), &CANVAS, &right, &left, &mut bank);
        assert!(started.is_empty());
        assert_eq!(bank.len(), 1);
        assert!(matches!(bank[0], AudioCommand::SetFrequency { osc: OscillatorId::SlidingX, .. }));
    }

    #[test]
    fn test_drag_over_left_marker_uses_height() {
        let (right, left) = stores();
        let mut slides = SlideHandler::new();
        let mut bank: Vec<AudioCommand> = Vec::new();

        slides.on_drag(Point::new(410.0, 420.0), &CANVAS, &right, &left, &mut bank);
        let hz = slides.state(Axis::Y).frequency.unwrap();
        assert_relative_eq!(hz, mapping::map_range(420.0, 0.0, 900.0, 261.63, 523.25));
    }

    #[test]
    fn test_drag_off_markers_does_nothing() {
        let (right, left) = stores();
        let mut slides = SlideHandler::new();
        let mut bank: Vec<AudioCommand> = Vec::new();
        slides.on_drag(Point::new(1000.0, 10.0), &CANVAS, &right, &left, &mut bank);
        assert!(bank.is_empty());
    }

    #[test]
    fn test_release_resets_state() {
        let (right, left) = stores();
        let mut slides = SlideHandler::new();
        let mut bank: Vec<AudioCommand> = Vec::new();
        slides.on_drag(Point::new(110.0, 120.0), &CANVAS, &right, &left, &mut bank);
        slides.on_release(&mut bank);
        assert!(!slides.state(Axis::X).active);
        assert!(slides.state(Axis::X).frequency.is_none());
    }
}
