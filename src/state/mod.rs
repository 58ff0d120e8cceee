//! State machine module for mode management
//!
//! Provides an explicit state machine with four modes:
//! - Idle: Title screen, waiting for the first click
//! - Capture: Live wrist tracking, markers recorded via buttons
//! - Review: One pass drawing every recorded marker
//! - Perform: Terminal; clicks and drags play the markers

mod machine;

pub use machine::{ClickRoute, Mode, ModeMachine};
