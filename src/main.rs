//! wrist-synth: control core for a pose-driven sound installation
//!
//! A performer records wrist positions as pitched markers, then plays
//! them back by clicking and dragging. This process provides:
//! - Line-delimited JSON input for pointer events and pose snapshots
//! - An explicit mode machine (Idle, Capture, Review, Perform)
//! - Oscillator commands as JSON lines on stdout
//! - IPC server for displays and control panels
//!
//! Out of scope:
//! - Webcam capture and pose estimation (the host pushes poses in)
//! - Drawing (scenes are described, not rasterised)
//! - Signal generation (the synthesizer consumes the commands)

mod audio;
mod config;
mod events;
mod input;
mod ipc;
mod layout;
mod lifecycle;
mod mapping;
mod markers;
mod pose;
mod render;
mod session;
mod slide;
mod state;
mod toggle;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::audio::{AudioCommand, ChannelBank, OscillatorId};
use crate::config::Config;
use crate::events::SessionEvent;
use crate::input::InputListener;
use crate::ipc::Server;
use crate::lifecycle::ShutdownSignal;
use crate::render::TraceSurface;
use crate::session::Session;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries audio commands, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "wrist-synth starting");

    let config = Config::load()?;
    info!(
        width = config.canvas.width,
        height = config.canvas.height,
        ?config.socket_path,
        "configuration loaded"
    );

    for osc in OscillatorId::ALL {
        info!(%osc, waveform = ?osc.waveform(), "oscillator");
    }

    let shutdown = ShutdownSignal::new();

    // Input listener -> session
    let (input_tx, input_rx) = mpsc::channel(64);
    // Session -> IPC subscribers
    let (event_tx, _event_rx) = broadcast::channel::<SessionEvent>(64);
    // Session -> synthesizer
    let (audio_tx, audio_rx) = mpsc::unbounded_channel::<AudioCommand>();

    let mut session = Session::new(config.canvas, ChannelBank::new(audio_tx), event_tx.clone());
    let mut surface = TraceSurface::default();

    // The listener owns the only input sender: once stdin closes, the
    // session loop ends and so does the process
    let mut input_listener = InputListener::new(input_tx);
    input_listener
        .start()
        .context("failed to start input listener")?;
    info!("input listener started");

    let server = Server::new(&config.socket_path, session.watch(), event_tx.clone())?;

    info!("session initialized, entering main loop");

    tokio::select! {
        _ = session.run(input_rx, &mut surface, config.frame_interval) => {
            info!("input closed, session finished");
        }

        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        result = audio::write_commands(audio_rx, tokio::io::stdout()) => {
            if let Err(e) = result {
                error!(?e, "audio output error");
            }
        }

        _ = shutdown.wait() => {
            info!("shutdown signal received");
        }
    }

    info!(mode = %session.mode(), "shutting down...");

    if input_listener.is_running() {
        input_listener.stop();
    }
    server.shutdown().await;

    info!("wrist-synth stopped");

    Ok(())
}
