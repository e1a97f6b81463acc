//! Wire protocol for board events.
//!
//! Everything crosses the socket as one bincode-encoded enum per binary
//! WebSocket frame:
//!
//! ```text
//! client ── ClientEvent ──▶ server       server ── ServerEvent ──▶ client
//!   JoinRoom                               InitBoard (joiner only)
//!   Draw / CommitStroke                    Draw / CommitStroke (relayed)
//!   ClearRoom                              BoardCleared
//!   CursorMove / CursorLeave               CursorUpdate / CursorRemove
//!   SendMessage                            UserList / NewMessage
//! ```
//!
//! Inbound events are self-contained: each names its room, so the server
//! keeps no per-socket protocol state beyond the connection id. Frames
//! that fail to decode are logged and dropped, never answered.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::Stroke;

/// Events a client sends to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientEvent {
    /// Enter a room under a display name, leaving any previous room.
    JoinRoom {
        room_id: String,
        display_name: String,
    },

    /// One live freehand segment.
    Draw {
        room_id: String,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        color: String,
        size: f32,
    },

    /// A pre-batched multi-point stroke, appended as one log entry.
    CommitStroke { room_id: String, stroke: Stroke },

    /// Wipe the room's stroke log.
    ClearRoom { room_id: String },

    /// Live cursor position (high frequency, never persisted).
    CursorMove {
        room_id: String,
        x: f32,
        y: f32,
        color: String,
        display_name: String,
    },

    /// Cursor left the drawing surface.
    CursorLeave { room_id: String },

    /// Chat line for everyone in the room.
    SendMessage {
        room_id: String,
        display_name: String,
        text: String,
    },
}

impl ClientEvent {
    /// The room this event addresses (every variant names one).
    pub fn room_id(&self) -> &str {
        match self {
            ClientEvent::JoinRoom { room_id, .. } => room_id,
            ClientEvent::Draw { room_id, .. } => room_id,
            ClientEvent::CommitStroke { room_id, .. } => room_id,
            ClientEvent::ClearRoom { room_id } => room_id,
            ClientEvent::CursorMove { room_id, .. } => room_id,
            ClientEvent::CursorLeave { room_id } => room_id,
            ClientEvent::SendMessage { room_id, .. } => room_id,
        }
    }

    /// Serialize to binary wire format.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| ProtocolError::SerializationError(e.to_string()))
    }

    /// Deserialize from binary wire format.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let (event, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map_err(|e| ProtocolError::DeserializationError(e.to_string()))?;
        Ok(event)
    }
}

/// Events the server sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerEvent {
    /// Full stroke log at the instant of join, sent once to the joiner.
    InitBoard { strokes: Vec<Stroke> },

    /// A segment drawn by another participant.
    Draw { stroke: Stroke },

    /// A batched stroke committed by another participant.
    CommitStroke { stroke: Stroke },

    /// The room's log was wiped (sent to the requester too).
    BoardCleared,

    /// Another participant's cursor moved.
    CursorUpdate {
        connection_id: Uuid,
        x: f32,
        y: f32,
        color: String,
        display_name: String,
    },

    /// Another participant's cursor left the surface.
    CursorRemove { connection_id: Uuid },

    /// Sorted display names of everyone currently in the room.
    UserList { display_names: Vec<String> },

    /// Chat line (senders receive their own).
    NewMessage {
        display_name: String,
        text: String,
        connection_id: Uuid,
    },
}

impl ServerEvent {
    /// Serialize to binary wire format.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| ProtocolError::SerializationError(e.to_string()))
    }

    /// Deserialize from binary wire format.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let (event, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map_err(|e| ProtocolError::DeserializationError(e.to_string()))?;
        Ok(event)
    }
}

/// Protocol errors.
#[derive(Debug, Clone)]
pub enum ProtocolError {
    SerializationError(String),
    DeserializationError(String),
    ConnectionClosed,
    Timeout,
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SerializationError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializationError(e) => write!(f, "Deserialization error: {e}"),
            Self::ConnectionClosed => write!(f, "Connection closed"),
            Self::Timeout => write!(f, "Connection timeout"),
        }
    }
}

impl std::error::Error for ProtocolError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Point;

    // ── ClientEvent tests ────────────────────────────────────────

    #[test]
    fn test_join_room_roundtrip() {
        let event = ClientEvent::JoinRoom {
            room_id: "lobby".into(),
            display_name: "Alice".into(),
        };
        let encoded = event.encode().unwrap();
        let decoded = ClientEvent::decode(&encoded).unwrap();
        assert_eq!(decoded, event);
        assert_eq!(decoded.room_id(), "lobby");
    }

    #[test]
    fn test_draw_roundtrip() {
        let event = ClientEvent::Draw {
            room_id: "lobby".into(),
            x0: 0.1,
            y0: 0.2,
            x1: 0.3,
            y1: 0.4,
            color: "#ff0000".into(),
            size: 3.0,
        };
        let encoded = event.encode().unwrap();
        assert_eq!(ClientEvent::decode(&encoded).unwrap(), event);
    }

    #[test]
    fn test_commit_stroke_roundtrip() {
        let stroke = Stroke {
            points: vec![
                Point::new(0.1, 0.1),
                Point::new(0.2, 0.3),
                Point::new(0.4, 0.2),
            ],
            color: "#00ff00".into(),
            width: 2.5,
        };
        let event = ClientEvent::CommitStroke {
            room_id: "design".into(),
            stroke: stroke.clone(),
        };
        let encoded = event.encode().unwrap();
        match ClientEvent::decode(&encoded).unwrap() {
            ClientEvent::CommitStroke { room_id, stroke: s } => {
                assert_eq!(room_id, "design");
                assert_eq!(s, stroke);
            }
            other => panic!("Expected CommitStroke, got {other:?}"),
        }
    }

    #[test]
    fn test_cursor_and_chat_roundtrips() {
        let events = vec![
            ClientEvent::ClearRoom {
                room_id: "lobby".into(),
            },
            ClientEvent::CursorMove {
                room_id: "lobby".into(),
                x: 0.5,
                y: 0.6,
                color: "#123456".into(),
                display_name: "Bob".into(),
            },
            ClientEvent::CursorLeave {
                room_id: "lobby".into(),
            },
            ClientEvent::SendMessage {
                room_id: "lobby".into(),
                display_name: "Bob".into(),
                text: "hello".into(),
            },
        ];
        for event in events {
            let encoded = event.encode().unwrap();
            assert_eq!(ClientEvent::decode(&encoded).unwrap(), event);
            assert_eq!(event.room_id(), "lobby");
        }
    }

    // ── ServerEvent tests ────────────────────────────────────────

    #[test]
    fn test_init_board_roundtrip() {
        let event = ServerEvent::InitBoard {
            strokes: vec![
                Stroke::segment(0.0, 0.0, 0.1, 0.1, "#000", 1.0),
                Stroke::segment(0.1, 0.1, 0.2, 0.2, "#fff", 2.0),
            ],
        };
        let encoded = event.encode().unwrap();
        assert_eq!(ServerEvent::decode(&encoded).unwrap(), event);
    }

    #[test]
    fn test_board_cleared_roundtrip() {
        let encoded = ServerEvent::BoardCleared.encode().unwrap();
        assert_eq!(
            ServerEvent::decode(&encoded).unwrap(),
            ServerEvent::BoardCleared
        );
    }

    #[test]
    fn test_cursor_update_roundtrip() {
        let id = Uuid::new_v4();
        let event = ServerEvent::CursorUpdate {
            connection_id: id,
            x: 0.4,
            y: 0.9,
            color: "#abcdef".into(),
            display_name: "Zoe".into(),
        };
        let encoded = event.encode().unwrap();
        match ServerEvent::decode(&encoded).unwrap() {
            ServerEvent::CursorUpdate { connection_id, .. } => {
                assert_eq!(connection_id, id);
            }
            other => panic!("Expected CursorUpdate, got {other:?}"),
        }
    }

    #[test]
    fn test_user_list_and_message_roundtrips() {
        let id = Uuid::new_v4();
        let events = vec![
            ServerEvent::UserList {
                display_names: vec!["Alice".into(), "Bob".into()],
            },
            ServerEvent::NewMessage {
                display_name: "Alice".into(),
                text: "hi all".into(),
                connection_id: id,
            },
            ServerEvent::CursorRemove { connection_id: id },
        ];
        for event in events {
            let encoded = event.encode().unwrap();
            assert_eq!(ServerEvent::decode(&encoded).unwrap(), event);
        }
    }

    #[test]
    fn test_draw_size_efficient() {
        let event = ClientEvent::Draw {
            room_id: "lobby".into(),
            x0: 0.1,
            y0: 0.2,
            x1: 0.3,
            y1: 0.4,
            color: "#ff0000".into(),
            size: 3.0,
        };
        let encoded = event.encode().unwrap();
        // 1 tag + 6 room + 16 floats + 8 color + 4 size, plus length prefixes
        assert!(
            encoded.len() < 64,
            "Draw event too large: {} bytes",
            encoded.len()
        );
    }

    #[test]
    fn test_decode_invalid_bytes() {
        let garbage = vec![0xFF, 0xFE, 0xFD];
        assert!(ClientEvent::decode(&garbage).is_err());
        assert!(ServerEvent::decode(&garbage).is_err());
    }

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::ConnectionClosed;
        assert!(err.to_string().contains("closed"));

        let err = ProtocolError::DeserializationError("bad frame".into());
        assert!(err.to_string().contains("bad frame"));
    }
}
