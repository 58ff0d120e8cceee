//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use serde::{Deserialize, Serialize};

use crate::events::SessionEvent;
use crate::markers::Marker;
use crate::state::Mode;

/// Requests from a client to the session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Current mode and counters
    GetStatus,

    /// Both marker stores in full
    GetMarkers,

    /// Ping to check connectivity
    Ping,

    /// Receive session events as they happen
    Subscribe,
}

/// Responses from the session to a client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Status(SessionStatus),

    Markers { right: Vec<Marker>, left: Vec<Marker> },

    Pong,

    Subscribed,

    Error { code: String, message: String },
}

/// Pushed to subscribed clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    Event { event: SessionEvent },
}

/// Session status snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub version: String,
    pub mode: Mode,
    pub right_markers: usize,
    pub left_markers: usize,
    /// Whether each wrist oscillator is playing a marker
    pub right_playing: bool,
    pub left_playing: bool,
    pub uptime_secs: u64,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            mode: Mode::default(),
            right_markers: 0,
            left_markers: 0,
            right_playing: false,
            left_playing: false,
            uptime_secs: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::Hand;

    #[test]
    fn test_request_deserialization() {
        let req: Request = serde_json::from_str(r#"{"type":"get_markers"}"#).unwrap();
        assert!(matches!(req, Request::GetMarkers));
    }

    #[test]
    fn test_response_serialization() {
        let resp = Response::Status(SessionStatus::default());
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"type\":\"status\""));
        assert!(json.contains("\"mode\":\"idle\""));
    }

    #[test]
    fn test_notification_nests_event() {
        let note = Notification::Event {
            event: SessionEvent::WristStopped { hand: Hand::Right },
        };
        let json = serde_json::to_string(&note).unwrap();
        assert_eq!(
            json,
            r#"{"type":"event","event":{"type":"wrist_stopped","hand":"right"}}"#
        );
    }
}
