//! WebSocket client for joining board rooms.
//!
//! Provides:
//! - Connection lifecycle (connect, implicit join, close or drop to leave)
//! - Typed senders for every client event
//! - A decoded [`ServerEvent`] stream for the application
//!
//! Bots, tools and the integration tests drive a room through this the
//! same way a browser canvas does.

use std::sync::Arc;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::tungstenite::Message;

use crate::board::Stroke;
use crate::protocol::{ClientEvent, ProtocolError, ServerEvent};

/// Client connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// The board client.
///
/// One client is bound to one room for its lifetime. Closing or dropping
/// it closes the socket, which the server treats as leaving the room.
pub struct BoardClient {
    /// Server URL, e.g. `ws://127.0.0.1:9100`
    server_url: String,
    /// Room this client draws in
    room_id: String,
    /// Name shown to other participants
    display_name: String,
    /// Connection state
    state: Arc<RwLock<ConnectionState>>,
    /// Channel to the WebSocket writer task
    outgoing_tx: Option<mpsc::Sender<Vec<u8>>>,
    /// Event receiver for the application
    event_rx: Option<mpsc::Receiver<ServerEvent>>,
    /// Event sender (held by the reader task)
    event_tx: mpsc::Sender<ServerEvent>,
}

impl BoardClient {
    /// Create a new client bound to a room.
    pub fn new(
        server_url: impl Into<String>,
        room_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(256);
        Self {
            server_url: server_url.into(),
            room_id: room_id.into(),
            display_name: display_name.into(),
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            outgoing_tx: None,
            event_rx: Some(event_rx),
            event_tx,
        }
    }

    /// Take the event receiver (can only be called once).
    pub fn take_event_rx(&mut self) -> Option<mpsc::Receiver<ServerEvent>> {
        self.event_rx.take()
    }

    /// Connect to the server and join the room.
    ///
    /// Spawns background tasks for reading and writing the socket. The
    /// first event the application sees is the room's `InitBoard`.
    pub async fn connect(&mut self) -> Result<(), ProtocolError> {
        *self.state.write().await = ConnectionState::Connecting;

        match tokio_tungstenite::connect_async(&self.server_url).await {
            Ok((ws_stream, _)) => {
                let (mut ws_writer, mut ws_reader) = ws_stream.split();

                // Writer task: forward the outgoing channel to the socket
                let (out_tx, mut out_rx) = mpsc::channel::<Vec<u8>>(256);
                self.outgoing_tx = Some(out_tx);
                tokio::spawn(async move {
                    while let Some(data) = out_rx.recv().await {
                        if ws_writer.send(Message::Binary(data.into())).await.is_err() {
                            break;
                        }
                    }
                    // Client dropped: close the socket so the server
                    // removes us from the room promptly
                    let _ = ws_writer.send(Message::Close(None)).await;
                });

                // Reader task: decode frames into the event stream
                let event_tx = self.event_tx.clone();
                let state = self.state.clone();
                tokio::spawn(async move {
                    while let Some(msg) = ws_reader.next().await {
                        match msg {
                            Ok(Message::Binary(data)) => {
                                let bytes: Vec<u8> = data.into();
                                match ServerEvent::decode(&bytes) {
                                    Ok(event) => {
                                        if event_tx.send(event).await.is_err() {
                                            // Application dropped its receiver
                                            break;
                                        }
                                    }
                                    Err(e) => {
                                        log::warn!("Undecodable frame from server: {e}");
                                    }
                                }
                            }
                            Ok(Message::Close(_)) | Err(_) => break,
                            _ => {}
                        }
                    }
                    *state.write().await = ConnectionState::Disconnected;
                });

                *self.state.write().await = ConnectionState::Connected;

                // Announce ourselves; the server answers with InitBoard
                self.send(ClientEvent::JoinRoom {
                    room_id: self.room_id.clone(),
                    display_name: self.display_name.clone(),
                })
                .await
            }
            Err(e) => {
                *self.state.write().await = ConnectionState::Disconnected;
                log::warn!("Failed to connect to {}: {e}", self.server_url);
                Err(ProtocolError::ConnectionClosed)
            }
        }
    }

    /// Draw one freehand segment.
    pub async fn draw(
        &self,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        color: impl Into<String>,
        size: f32,
    ) -> Result<(), ProtocolError> {
        self.send(ClientEvent::Draw {
            room_id: self.room_id.clone(),
            x0,
            y0,
            x1,
            y1,
            color: color.into(),
            size,
        })
        .await
    }

    /// Commit a whole polyline as one stroke.
    pub async fn commit_stroke(&self, stroke: Stroke) -> Result<(), ProtocolError> {
        self.send(ClientEvent::CommitStroke {
            room_id: self.room_id.clone(),
            stroke,
        })
        .await
    }

    /// Wipe the room for everyone.
    pub async fn clear_room(&self) -> Result<(), ProtocolError> {
        self.send(ClientEvent::ClearRoom {
            room_id: self.room_id.clone(),
        })
        .await
    }

    /// Report our cursor position.
    pub async fn cursor_move(
        &self,
        x: f32,
        y: f32,
        color: impl Into<String>,
    ) -> Result<(), ProtocolError> {
        self.send(ClientEvent::CursorMove {
            room_id: self.room_id.clone(),
            x,
            y,
            color: color.into(),
            display_name: self.display_name.clone(),
        })
        .await
    }

    /// Hide our cursor from the room.
    pub async fn cursor_leave(&self) -> Result<(), ProtocolError> {
        self.send(ClientEvent::CursorLeave {
            room_id: self.room_id.clone(),
        })
        .await
    }

    /// Send a chat message to the room.
    pub async fn send_chat(&self, text: impl Into<String>) -> Result<(), ProtocolError> {
        self.send(ClientEvent::SendMessage {
            room_id: self.room_id.clone(),
            display_name: self.display_name.clone(),
            text: text.into(),
        })
        .await
    }

    async fn send(&self, event: ClientEvent) -> Result<(), ProtocolError> {
        let encoded = event.encode()?;
        match self.outgoing_tx {
            Some(ref tx) => tx
                .send(encoded)
                .await
                .map_err(|_| ProtocolError::ConnectionClosed),
            None => Err(ProtocolError::ConnectionClosed),
        }
    }

    /// Close the connection and leave the room.
    ///
    /// Frames already queued are still delivered before the socket
    /// closes. Safe to call on a client that never connected.
    pub async fn close(&mut self) {
        // Dropping the only sender ends the writer task, which sends
        // the WebSocket close frame after draining
        self.outgoing_tx = None;
        *self.state.write().await = ConnectionState::Disconnected;
    }

    /// Get the current connection state.
    pub async fn connection_state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Get the room this client is bound to.
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Get our display name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Get the server URL.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = BoardClient::new("ws://localhost:9100", "lobby", "TestUser");
        assert_eq!(client.server_url(), "ws://localhost:9100");
        assert_eq!(client.room_id(), "lobby");
        assert_eq!(client.display_name(), "TestUser");
    }

    #[tokio::test]
    async fn test_client_initial_state() {
        let client = BoardClient::new("ws://localhost:9100", "lobby", "TestUser");
        assert_eq!(
            client.connection_state().await,
            ConnectionState::Disconnected
        );
    }

    #[tokio::test]
    async fn test_take_event_rx() {
        let mut client = BoardClient::new("ws://localhost:9100", "lobby", "TestUser");
        assert!(client.take_event_rx().is_some());
        assert!(client.take_event_rx().is_none());
    }

    #[tokio::test]
    async fn test_send_before_connect_fails() {
        let client = BoardClient::new("ws://localhost:9100", "lobby", "TestUser");
        let result = client.draw(0.0, 0.0, 0.1, 0.1, "#000000", 2.0).await;
        assert!(matches!(result, Err(ProtocolError::ConnectionClosed)));

        let result = client.send_chat("anyone there?").await;
        assert!(matches!(result, Err(ProtocolError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_close_without_connect_is_a_no_op() {
        let mut client = BoardClient::new("ws://localhost:9100", "lobby", "TestUser");
        client.close().await;
        assert_eq!(
            client.connection_state().await,
            ConnectionState::Disconnected
        );
        assert!(matches!(
            client.send_chat("late").await,
            Err(ProtocolError::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        // Nothing listens on this port
        let mut client = BoardClient::new("ws://127.0.0.1:1", "lobby", "TestUser");
        assert!(client.connect().await.is_err());
        assert_eq!(
            client.connection_state().await,
            ConnectionState::Disconnected
        );
    }

    #[test]
    fn test_connection_state_values() {
        assert_ne!(ConnectionState::Disconnected, ConnectionState::Connected);
        assert_ne!(ConnectionState::Connecting, ConnectionState::Connected);
    }
}
