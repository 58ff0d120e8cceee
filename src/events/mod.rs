//! Events module for session observers
//!
//! Structured events for mode transitions, recorded markers and
//! oscillator changes, broadcast to anyone watching the session.

use serde::{Deserialize, Serialize};

use crate::markers::Hand;
use crate::state::Mode;

/// Events emitted by the session as it changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The mode changed
    ModeChanged {
        from: Mode,
        to: Mode,
        /// Time spent in the previous mode, in milliseconds
        duration_ms: u64,
    },

    /// A marker was appended to a hand's store
    MarkerRecorded {
        hand: Hand,
        index: usize,
        x: f64,
        y: f64,
        frequency: f64,
    },

    /// A wrist oscillator started or retuned from a marker click
    WristStarted { hand: Hand, frequency: f64 },

    /// A wrist oscillator stopped from a repeated marker click
    WristStopped { hand: Hand },

    /// A sliding oscillator started under a held pointer
    SlideStarted { hand: Hand },

    /// Pointer released; both sliding oscillators stopped
    SlidesStopped,
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::ModeChanged { from, to, duration_ms } => {
                write!(f, "MODE_CHANGED {} -> {} ({}ms)", from, to, duration_ms)
            }
            SessionEvent::MarkerRecorded { hand, index, frequency, .. } => {
                write!(f, "MARKER_RECORDED {}[{}] {:.3}Hz", hand, index, frequency)
            }
            SessionEvent::WristStarted { hand, frequency } => {
                write!(f, "WRIST_STARTED {} {:.3}Hz", hand, frequency)
            }
            SessionEvent::WristStopped { hand } => write!(f, "WRIST_STOPPED {}", hand),
            SessionEvent::SlideStarted { hand } => write!(f, "SLIDE_STARTED {}", hand),
            SessionEvent::SlidesStopped => write!(f, "SLIDES_STOPPED"),
        }
    }
}
