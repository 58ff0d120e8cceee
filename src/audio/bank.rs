//! The seam between the control core and the synthesis layer

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::command::{AudioCommand, OscillatorId};

/// Anything that can execute oscillator commands
pub trait OscillatorBank {
    fn send(&mut self, command: AudioCommand);

    fn start(&mut self, osc: OscillatorId) {
        self.send(AudioCommand::Start { osc });
    }

    fn stop(&mut self, osc: OscillatorId) {
        self.send(AudioCommand::Stop { osc });
    }

    fn set_frequency(&mut self, osc: OscillatorId, hz: f64) {
        self.send(AudioCommand::SetFrequency { osc, hz });
    }

    fn set_amplitude(&mut self, osc: OscillatorId, level: f64, ramp_secs: f64) {
        self.send(AudioCommand::SetAmplitude {
            osc,
            level,
            ramp_secs,
        });
    }
}

/// Records commands in order; used to inspect what the core asked for
impl OscillatorBank for Vec<AudioCommand> {
    fn send(&mut self, command: AudioCommand) {
        self.push(command);
    }
}

/// Forwards commands to an audio task over an unbounded channel
pub struct ChannelBank {
    tx: mpsc::UnboundedSender<AudioCommand>,
}

impl ChannelBank {
    /// Create a bank feeding `tx`
    pub fn new(tx: mpsc::UnboundedSender<AudioCommand>) -> Self {
        Self { tx }
    }
}

impl OscillatorBank for ChannelBank {
    fn send(&mut self, command: AudioCommand) {
        debug!(osc = %command.osc(), ?command, "audio command");
        if self.tx.send(command).is_err() {
            warn!("audio channel closed, command dropped");
        }
    }
}
