//! Input module for pointer and pose events
//!
//! The host feeds line-delimited JSON on stdin. A dedicated thread parses
//! each line and forwards it to the session loop.

mod event;
mod listener;

pub use event::InputEvent;
pub use listener::InputListener;
