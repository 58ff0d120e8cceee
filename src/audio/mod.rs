//! Audio module: commands for the external synthesis layer
//!
//! The core never produces samples. It issues start/stop/frequency/amplitude
//! commands against four independent oscillators and leaves synthesis to
//! whatever process consumes them.

mod bank;
mod command;
mod sink;

pub use bank::{ChannelBank, OscillatorBank};
pub use command::{AudioCommand, OscillatorId};
pub use sink::write_commands;
