//! Stdin input listener
//!
//! Reads host events line by line on a dedicated thread, since stdin
//! reads block.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::pose::PoseError;

use super::event::{parse_line, InputEvent};

/// Forwards host input lines to the session loop
pub struct InputListener {
    /// Handed to the reader thread on start, so the channel closes when
    /// the thread finishes
    event_tx: Option<mpsc::Sender<InputEvent>>,
    running: Arc<AtomicBool>,
}

impl InputListener {
    /// Create a listener that will feed `event_tx`
    pub fn new(event_tx: mpsc::Sender<InputEvent>) -> Self {
        Self {
            event_tx: Some(event_tx),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start reading stdin on a dedicated thread.
    ///
    /// The thread runs until stdin closes, the receiver goes away or
    /// `stop()` is called. The session sees the input channel close once
    /// it exits.
    pub fn start(&mut self) -> Result<(), InputError> {
        self.start_with(|| std::io::stdin().lock())
    }

    /// Start reading lines from whatever `open` returns on the reader thread
    fn start_with<R, F>(&mut self, open: F) -> Result<(), InputError>
    where
        R: BufRead,
        F: FnOnce() -> R + Send + 'static,
    {
        let Some(event_tx) = self.event_tx.take() else {
            return Err(InputError::AlreadyRunning);
        };
        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);

        let spawned = thread::Builder::new()
            .name("input-listener".to_string())
            .spawn(move || {
                info!("input listener thread started");
                forward_lines(open(), &event_tx, &running);
                running.store(false, Ordering::SeqCst);
                info!("input listener thread stopped");
            });

        if let Err(e) = spawned {
            self.running.store(false, Ordering::SeqCst);
            return Err(InputError::ThreadSpawn(e.to_string()));
        }

        Ok(())
    }

    /// Ask the listener to stop after the line it is waiting on
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Errors that can occur while reading input
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("input listener is already running")]
    AlreadyRunning,

    #[error("failed to spawn listener thread: {0}")]
    ThreadSpawn(String),

    #[error("malformed input line {line:?}")]
    Malformed {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Pose(#[from] PoseError),
}

/// Parse and forward every line from `reader`. Bad lines are logged and
/// skipped.
fn forward_lines(reader: impl BufRead, event_tx: &mpsc::Sender<InputEvent>, running: &AtomicBool) {
    for line in reader.lines() {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(?e, "failed to read input");
                break;
            }
        };

        match parse_line(&line) {
            Ok(Some(event)) => {
                debug!(?event, "input event");
                if event_tx.blocking_send(event).is_err() {
                    warn!("failed to send input event - channel closed?");
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "skipping input line"),
        }
    }
}
