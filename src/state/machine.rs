//! Core mode state machine
//!
//! Transitions are one-directional: Idle -> Capture -> Review -> Perform.
//! Review advances by itself once it has been rendered.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::events::SessionEvent;
use crate::layout::Canvas;
use crate::markers::Hand;
use crate::pose::Point;

/// The four modes of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Title screen
    #[default]
    Idle,
    /// Live tracking, recording markers
    Capture,
    /// Drawing recorded markers once
    Review,
    /// Playing recorded markers
    Perform,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Idle => write!(f, "Idle"),
            Mode::Capture => write!(f, "Capture"),
            Mode::Review => write!(f, "Review"),
            Mode::Perform => write!(f, "Perform"),
        }
    }
}

/// What a click means, given the mode it landed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickRoute {
    /// Idle was left; Capture was entered
    EnteredCapture,
    /// Capture was left via the Next button; Review was entered
    EnteredReview,
    /// A capture button asked for a marker for this hand
    Record(Hand),
    /// Perform mode; the click belongs to the toggle protocol
    Perform,
    /// Nothing to do
    Ignored,
}

/// Tracks the current mode and announces transitions
pub struct ModeMachine {
    mode: Mode,
    entered_at: Instant,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl ModeMachine {
    pub fn new(event_tx: broadcast::Sender<SessionEvent>) -> Self {
        Self {
            mode: Mode::Idle,
            entered_at: Instant::now(),
            event_tx,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Route a click, performing any transition it causes
    pub fn on_click(&mut self, point: Point, canvas: &Canvas) -> ClickRoute {
        match self.mode {
            Mode::Idle => {
                self.transition_to(Mode::Capture);
                ClickRoute::EnteredCapture
            }
            Mode::Capture => self.route_capture_click(point, canvas),
            // Review never sees a click; it advances on the next render
            Mode::Review => ClickRoute::Ignored,
            Mode::Perform => ClickRoute::Perform,
        }
    }

    fn route_capture_click(&mut self, point: Point, canvas: &Canvas) -> ClickRoute {
        if canvas.next_button().contains(point) {
            self.transition_to(Mode::Review);
            ClickRoute::EnteredReview
        } else if canvas.right_button().contains(point) {
            ClickRoute::Record(Hand::Right)
        } else if canvas.left_button().contains(point) {
            ClickRoute::Record(Hand::Left)
        } else {
            debug!(x = point.x, y = point.y, "capture click outside buttons");
            ClickRoute::Ignored
        }
    }

    /// Called after a frame has been rendered. Returns true if Review
    /// handed over to Perform.
    pub fn after_render(&mut self) -> bool {
        if self.mode == Mode::Review {
            self.transition_to(Mode::Perform);
            true
        } else {
            false
        }
    }

    fn transition_to(&mut self, new_mode: Mode) {
        let old_mode = self.mode;
        let duration_ms = self.entered_at.elapsed().as_millis() as u64;

        info!(
            from = %old_mode,
            to = %new_mode,
            duration_ms = duration_ms,
            "mode transition"
        );

        self.mode = new_mode;
        self.entered_at = Instant::now();

        let event = SessionEvent::ModeChanged {
            from: old_mode,
            to: new_mode,
            duration_ms,
        };
        debug!(?event, "emitting mode event");
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Canvas = Canvas::new(1500.0, 900.0);

    fn create_machine() -> (ModeMachine, broadcast::Receiver<SessionEvent>) {
        let (tx, rx) = broadcast::channel(16);
        (ModeMachine::new(tx), rx)
    }

    fn next_button() -> Point {
        Point::new(1450.0, 850.0)
    }

    #[test]
    fn test_initial_mode() {
        let (machine, _) = create_machine();
        assert_eq!(machine.mode(), Mode::Idle);
    }

    #[test]
    fn test_any_click_leaves_idle() {
        let (mut machine, mut rx) = create_machine();
        let route = machine.on_click(Point::new(3.0, 4.0), &CANVAS);
        assert_eq!(route, ClickRoute::EnteredCapture);
        assert_eq!(machine.mode(), Mode::Capture);

        match rx.try_recv().unwrap() {
            SessionEvent::ModeChanged { from, to, .. } => {
                assert_eq!((from, to), (Mode::Idle, Mode::Capture));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_capture_buttons() {
        let (mut machine, _) = create_machine();
        machine.on_click(Point::default(), &CANVAS);

        assert_eq!(
            machine.on_click(Point::new(1450.0, 50.0), &CANVAS),
            ClickRoute::Record(Hand::Right)
        );
        assert_eq!(
            machine.on_click(Point::new(1450.0, 170.0), &CANVAS),
            ClickRoute::Record(Hand::Left)
        );
        assert_eq!(
            machine.on_click(Point::new(500.0, 500.0), &CANVAS),
            ClickRoute::Ignored
        );
        assert_eq!(machine.mode(), Mode::Capture);
    }

    #[test]
    fn test_full_progression() {
        let (mut machine, _) = create_machine();
        machine.on_click(Point::default(), &CANVAS);

        assert_eq!(machine.on_click(next_button(), &CANVAS), ClickRoute::EnteredReview);
        assert_eq!(machine.mode(), Mode::Review);

        assert!(machine.after_render());
        assert_eq!(machine.mode(), Mode::Perform);
    }

    #[test]
    fn test_perform_is_terminal() {
        let (mut machine, _) = create_machine();
        machine.on_click(Point::default(), &CANVAS);
        machine.on_click(next_button(), &CANVAS);
        machine.after_render();

        for point in [next_button(), Point::new(1450.0, 50.0), Point::default()] {
            assert_eq!(machine.on_click(point, &CANVAS), ClickRoute::Perform);
            assert!(!machine.after_render());
            assert_eq!(machine.mode(), Mode::Perform);
        }
    }

    #[test]
    fn test_render_outside_review_does_nothing() {
        let (mut machine, _) = create_machine();
        assert!(!machine.after_render());
        assert_eq!(machine.mode(), Mode::Idle);
    }
}
