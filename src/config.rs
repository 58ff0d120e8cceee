//! Configuration loading and management

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::layout::Canvas;

const DEFAULT_WIDTH: f64 = 1500.0;
const DEFAULT_HEIGHT: f64 = 900.0;
const DEFAULT_FRAME_MS: u64 = 16;

/// Installation configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Initial canvas size; the host may resize later
    pub canvas: Canvas,

    /// How often a frame is rendered when the host sends none
    pub frame_interval: Duration,

    /// Path to the Unix domain socket for IPC, under the data directory
    /// unless overridden
    pub socket_path: PathBuf,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let width = parse_or(&lookup, "WRIST_SYNTH_CANVAS_WIDTH", DEFAULT_WIDTH)?;
        let height = parse_or(&lookup, "WRIST_SYNTH_CANVAS_HEIGHT", DEFAULT_HEIGHT)?;
        anyhow::ensure!(
            width > 0.0 && height > 0.0,
            "canvas must have a positive size, got {width}x{height}"
        );

        let frame_ms = parse_or(&lookup, "WRIST_SYNTH_FRAME_MS", DEFAULT_FRAME_MS)?;
        anyhow::ensure!(frame_ms > 0, "WRIST_SYNTH_FRAME_MS must be positive");

        let data_dir = lookup("HOME")
            .map(|home| {
                PathBuf::from(home)
                    .join(".local")
                    .join("share")
                    .join("wrist-synth")
            })
            .unwrap_or_else(|| std::env::temp_dir().join("wrist-synth"));

        let socket_path = lookup("WRIST_SYNTH_SOCKET")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("session.sock"));

        Ok(Self {
            canvas: Canvas::new(width, height),
            frame_interval: Duration::from_millis(frame_ms),
            socket_path,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
