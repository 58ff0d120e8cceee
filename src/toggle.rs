//! Click-toggle protocol for a hand's wrist oscillator
//!
//! Clicking a marker plays its pitch. Clicking the same marker again
//! straight after stops it; clicking a different one retunes.
//!
//! "Same marker" is decided by coordinates, so two markers recorded at
//! exactly the same position cannot be told apart.

use tracing::debug;

use crate::audio::{OscillatorBank, OscillatorId};
use crate::markers::{Hand, MarkerStore};
use crate::pose::Point;

/// Amplitude a wrist oscillator ramps to when a marker starts it
const WRIST_LEVEL: f64 = 1.0;
const WRIST_RAMP_SECS: f64 = 1.0;

/// The marker hit by an earlier click
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickedMarker {
    pub index: usize,
    pub position: Point,
}

/// Outcome of one click for one hand
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToggleAction {
    /// Start or retune the oscillator to the marker's pitch
    Start { index: usize, frequency: f64 },
    /// Stop the oscillator; the marker was clicked twice in a row
    Stop { index: usize },
    /// The click hit none of this hand's markers
    Miss,
}

/// Per-hand click memory and oscillator flag
#[derive(Debug, Clone)]
pub struct HandState {
    hand: Hand,
    running: bool,
    previous: Option<ClickedMarker>,
}

impl HandState {
    pub fn new(hand: Hand) -> Self {
        Self {
            hand,
            running: false,
            previous: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    #[cfg(test)]
    pub fn previous(&self) -> Option<ClickedMarker> {
        self.previous
    }

    /// Decide what a click at `point` should do, without applying it
    pub fn decide(&self, point: Point, store: &MarkerStore) -> ToggleAction {
        let Some((index, marker)) = store.hit(point) else {
            return ToggleAction::Miss;
        };

        let same_marker = self
            .previous
            .is_some_and(|prev| prev.position == marker.position());

        if same_marker && self.running {
            ToggleAction::Stop { index }
        } else {
            ToggleAction::Start {
                index,
                frequency: marker.tuned_frequency,
            }
        }
    }

    /// Handle a click: decide, drive the oscillator, remember the hit
    pub fn on_click(
        &mut self,
        point: Point,
        store: &MarkerStore,
        bank: &mut impl OscillatorBank,
    ) -> ToggleAction {
        let action = self.decide(point, store);
        let osc = OscillatorId::wrist(self.hand);

        debug!(
            hand = %self.hand,
            previous = ?self.previous.map(|p| p.index),
            running = self.running,
            ?action,
            "marker click"
        );

        let index = match action {
            ToggleAction::Miss => return action,
            ToggleAction::Start { index, frequency } => {
                bank.set_amplitude(osc, WRIST_LEVEL, WRIST_RAMP_SECS);
                bank.start(osc);
                bank.set_frequency(osc, frequency);
                self.running = true;
                index
            }
            ToggleAction::Stop { index } => {
                bank.stop(osc);
                self.running = false;
                index
            }
        };

        if let Some(marker) = store.get(index) {
            self.previous = Some(ClickedMarker {
                index,
                position: marker.position(),
            });
        }

        action
    }
}
