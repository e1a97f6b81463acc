//! WebSocket board server: accept loop plus per-connection pumps.
//!
//! Architecture:
//! ```text
//! Browser A ──┐                         commands
//!             ├── TcpListener ── connection task ──────▶ session actor
//! Browser B ──┘                        ▲                      │
//!                                      │ outbound frames      │ flush
//!                                      └──(bounded mpsc)──    ▼
//!                                                        BoardStore (RocksDB)
//! ```
//!
//! Each connection task pumps two directions: inbound binary frames
//! decode to `ClientEvent` and feed the session actor, outbound frames
//! arrive pre-encoded on a bounded channel and go straight out the
//! socket. The task itself holds no room state; everything authoritative
//! lives in the session actor.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

use crate::persistence::Persistence;
use crate::protocol::ClientEvent;
use crate::session::{spawn_session, SessionConfig, SessionHandle};
use crate::shutdown::ShutdownCoordinator;
use crate::store::{BoardStore, StoreConfig, StoreError};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: String,
    /// RocksDB directory for board persistence
    pub store_path: PathBuf,
    /// Seconds between dirty-room flush sweeps
    pub flush_interval_secs: u64,
    /// Outbound frame buffer per connection
    pub outbound_buffer: usize,
    /// Session command channel capacity
    pub command_buffer: usize,
    /// Fsync every store write
    pub sync_writes: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9100".to_string(),
            store_path: PathBuf::from("fresco_data"),
            flush_interval_secs: 30,
            outbound_buffer: 256,
            command_buffer: 1024,
            sync_writes: false,
        }
    }
}

impl ServerConfig {
    /// Configuration from environment variables, falling back to
    /// defaults:
    ///
    /// - `FRESCO_ADDR`: listen address
    /// - `FRESCO_DATA`: RocksDB directory
    /// - `FRESCO_FLUSH_SECS`: seconds between flush sweeps
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("FRESCO_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(path) = std::env::var("FRESCO_DATA") {
            config.store_path = PathBuf::from(path);
        }
        if let Ok(secs) = std::env::var("FRESCO_FLUSH_SECS") {
            match secs.parse::<u64>() {
                // The sweep timer requires a non-zero period
                Ok(parsed) if parsed > 0 => config.flush_interval_secs = parsed,
                _ => log::warn!("Ignoring invalid FRESCO_FLUSH_SECS: {secs}"),
            }
        }
        config
    }
}

/// Connection-level statistics.
#[derive(Debug, Clone, Default)]
pub struct ServerStats {
    pub total_connections: u64,
    pub active_connections: u64,
    pub decode_failures: u64,
}

/// The board server.
pub struct BoardServer {
    config: ServerConfig,
    store: Arc<BoardStore>,
    stats: Arc<RwLock<ServerStats>>,
}

impl BoardServer {
    /// Open the store and prepare the server.
    ///
    /// Fails only if the database cannot be opened; nothing listens
    /// until [`run`](Self::run).
    pub fn new(config: ServerConfig) -> Result<Self, StoreError> {
        let store_config = StoreConfig {
            path: config.store_path.clone(),
            sync_writes: config.sync_writes,
            ..StoreConfig::default()
        };
        let store = Arc::new(BoardStore::open(store_config)?);

        Ok(Self {
            config,
            store,
            stats: Arc::new(RwLock::new(ServerStats::default())),
        })
    }

    /// Bind, spawn the session actor, and serve until shutdown.
    ///
    /// Returns after the actor's final flush has completed, so a caller
    /// that awaits this can exit knowing dirty boards reached disk.
    pub async fn run(
        &self,
        shutdown: ShutdownCoordinator,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let boards = self.store.board_count().unwrap_or(0);
        log::info!(
            "Store '{}' holds {boards} persisted boards",
            self.config.store_path.display()
        );

        let persistence = Persistence::new(self.store.clone());
        let session_config = SessionConfig {
            flush_interval: Duration::from_secs(self.config.flush_interval_secs),
            command_buffer: self.config.command_buffer,
        };
        let (session, session_task) =
            spawn_session(persistence, session_config, shutdown.clone());

        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        log::info!("Board server listening on {}", self.config.bind_addr);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => {
                            log::debug!("New TCP connection from {addr}");
                            let session = session.clone();
                            let stats = self.stats.clone();
                            let outbound_buffer = self.config.outbound_buffer;
                            tokio::spawn(async move {
                                if let Err(e) = Self::handle_connection(
                                    stream, addr, session, stats, outbound_buffer,
                                )
                                .await
                                {
                                    log::error!("Connection error from {addr}: {e}");
                                }
                            });
                        }
                        Err(e) => {
                            log::error!("Accept failed: {e}");
                            shutdown.trigger("listener failure");
                            break;
                        }
                    }
                }
                _ = shutdown.wait() => break,
            }
        }

        log::info!("Accept loop stopped, waiting for the final flush");
        let _ = session_task.await;
        Ok(())
    }

    /// Pump a single WebSocket connection until it closes.
    async fn handle_connection(
        stream: TcpStream,
        addr: SocketAddr,
        session: SessionHandle,
        stats: Arc<RwLock<ServerStats>>,
        outbound_buffer: usize,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ws_stream = tokio_tungstenite::accept_async(stream).await?;
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        let connection_id = Uuid::new_v4();
        log::info!("Connection {connection_id} established from {addr}");

        // Register before reading: relayed frames can start immediately
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<Arc<Vec<u8>>>(outbound_buffer);
        if !session.register(connection_id, outbound_tx).await {
            // Actor already stopped; the server is shutting down
            return Ok(());
        }

        {
            let mut s = stats.write().await;
            s.total_connections += 1;
            s.active_connections += 1;
        }

        // No `?` in this loop: the disconnect below must always run
        loop {
            tokio::select! {
                msg = ws_receiver.next() => {
                    match msg {
                        Some(Ok(Message::Binary(data))) => {
                            let bytes: Vec<u8> = data.into();
                            match ClientEvent::decode(&bytes) {
                                Ok(event) => {
                                    if !session.event(connection_id, event).await {
                                        break;
                                    }
                                }
                                Err(e) => {
                                    // Bad frames are dropped, the connection stays
                                    log::warn!("Undecodable frame from {addr}: {e}");
                                    let mut s = stats.write().await;
                                    s.decode_failures += 1;
                                }
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if ws_sender.send(Message::Pong(data)).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            log::debug!("Connection {connection_id} closed by peer");
                            break;
                        }
                        Some(Err(e)) => {
                            log::warn!("WebSocket error from {addr}: {e}");
                            break;
                        }
                        _ => {} // text and pong frames are ignored
                    }
                }

                frame = outbound_rx.recv() => {
                    match frame {
                        Some(data) => {
                            if ws_sender
                                .send(Message::Binary(data.to_vec().into()))
                                .await
                                .is_err()
                            {
                                break;
                            }
                        }
                        // Session actor stopped and dropped our channel
                        None => break,
                    }
                }
            }
        }

        session.disconnect(connection_id).await;
        {
            let mut s = stats.write().await;
            s.active_connections -= 1;
        }
        log::info!("Connection {connection_id} from {addr} closed");

        Ok(())
    }

    /// Get connection statistics.
    pub async fn stats(&self) -> ServerStats {
        self.stats.read().await.clone()
    }

    /// Get the configured bind address.
    pub fn bind_addr(&self) -> &str {
        &self.config.bind_addr
    }

    /// Get the underlying board store.
    pub fn store(&self) -> &Arc<BoardStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:9100");
        assert_eq!(config.store_path, PathBuf::from("fresco_data"));
        assert_eq!(config.flush_interval_secs, 30);
        assert_eq!(config.outbound_buffer, 256);
        assert_eq!(config.command_buffer, 1024);
        assert!(!config.sync_writes);
    }

    #[test]
    fn test_server_config_from_env() {
        std::env::set_var("FRESCO_ADDR", "0.0.0.0:7777");
        std::env::set_var("FRESCO_DATA", "/tmp/fresco_env_test");
        std::env::set_var("FRESCO_FLUSH_SECS", "5");

        let config = ServerConfig::from_env();
        assert_eq!(config.bind_addr, "0.0.0.0:7777");
        assert_eq!(config.store_path, PathBuf::from("/tmp/fresco_env_test"));
        assert_eq!(config.flush_interval_secs, 5);

        // Unparsable and zero intervals fall back to the default
        std::env::set_var("FRESCO_FLUSH_SECS", "not-a-number");
        let config = ServerConfig::from_env();
        assert_eq!(config.flush_interval_secs, 30);

        std::env::set_var("FRESCO_FLUSH_SECS", "0");
        let config = ServerConfig::from_env();
        assert_eq!(config.flush_interval_secs, 30);

        std::env::remove_var("FRESCO_ADDR");
        std::env::remove_var("FRESCO_DATA");
        std::env::remove_var("FRESCO_FLUSH_SECS");
    }

    #[tokio::test]
    async fn test_server_opens_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            store_path: dir.path().join("db"),
            ..ServerConfig::default()
        };
        let server = BoardServer::new(config).unwrap();
        assert_eq!(server.bind_addr(), "127.0.0.1:9100");
        assert_eq!(server.store().board_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_server_stats_initial() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            store_path: dir.path().join("db"),
            ..ServerConfig::default()
        };
        let server = BoardServer::new(config).unwrap();
        let stats = server.stats().await;
        assert_eq!(stats.total_connections, 0);
        assert_eq!(stats.active_connections, 0);
        assert_eq!(stats.decode_failures, 0);
    }
}
