//! Oscillator identities and the commands sent to them

use serde::{Deserialize, Serialize};

use crate::markers::Hand;

/// The four oscillators the installation drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OscillatorId {
    LeftWrist,
    RightWrist,
    SlidingX,
    SlidingY,
}

impl OscillatorId {
    pub const ALL: [OscillatorId; 4] = [
        OscillatorId::LeftWrist,
        OscillatorId::RightWrist,
        OscillatorId::SlidingX,
        OscillatorId::SlidingY,
    ];

    /// Wrist oscillator toggled by clicks on a hand's markers
    pub fn wrist(hand: Hand) -> Self {
        match hand {
            Hand::Left => OscillatorId::LeftWrist,
            Hand::Right => OscillatorId::RightWrist,
        }
    }

    /// Sliding oscillator driven by dragging over a hand's markers
    pub fn sliding(hand: Hand) -> Self {
        match hand {
            Hand::Left => OscillatorId::SlidingY,
            Hand::Right => OscillatorId::SlidingX,
        }
    }

    pub fn waveform(&self) -> Waveform {
        match self {
            OscillatorId::LeftWrist => Waveform::Square,
            OscillatorId::RightWrist => Waveform::Triangle,
            OscillatorId::SlidingX | OscillatorId::SlidingY => Waveform::Sawtooth,
        }
    }
}

impl std::fmt::Display for OscillatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OscillatorId::LeftWrist => write!(f, "left-wrist"),
            OscillatorId::RightWrist => write!(f, "right-wrist"),
            OscillatorId::SlidingX => write!(f, "sliding-x"),
            OscillatorId::SlidingY => write!(f, "sliding-y"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    Square,
    Triangle,
    Sawtooth,
}

/// A single command for the synthesis layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AudioCommand {
    Start { osc: OscillatorId },
    Stop { osc: OscillatorId },
    SetFrequency { osc: OscillatorId, hz: f64 },
    /// Ramp amplitude to `level` over `ramp_secs`
    SetAmplitude {
        osc: OscillatorId,
        level: f64,
        ramp_secs: f64,
    },
}

impl AudioCommand {
    pub fn osc(&self) -> OscillatorId {
        match self {
            AudioCommand::Start { osc }
            | AudioCommand::Stop { osc }
            | AudioCommand::SetFrequency { osc, .. }
            | AudioCommand::SetAmplitude { osc, .. } => *osc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = AudioCommand::SetFrequency {
            osc: OscillatorId::RightWrist,
            hz: 148.5,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("set_frequency"));
        assert!(json.contains("right_wrist"));
        assert!(json.contains("148.5"));
    }

    #[test]
    fn test_hand_oscillators() {
        assert_eq!(OscillatorId::wrist(Hand::Left), OscillatorId::LeftWrist);
        assert_eq!(OscillatorId::sliding(Hand::Right), OscillatorId::SlidingX);
        assert_eq!(OscillatorId::SlidingY.waveform(), Waveform::Sawtooth);
    }
}
