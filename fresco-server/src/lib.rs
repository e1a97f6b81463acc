//! # fresco-server — Shared whiteboard rooms over WebSockets
//!
//! A relay-and-persist server for multi-user drawing boards. Clients
//! join named rooms, strokes fan out to everyone else in the room, and
//! each room's stroke log survives restarts in RocksDB.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     WebSocket      ┌──────────────┐
//! │ BoardClient │ ◄────────────────► │ BoardServer  │
//! │ (per user)  │   bincode frames   │ (accept loop)│
//! └─────────────┘                    └──────┬───────┘
//!                                           │ commands
//!                                    ┌──────┴───────┐
//!                                    │ session actor│
//!                                    │ (all rooms)  │
//!                                    └──────┬───────┘
//!                                           │ load / flush
//!                                    ┌──────┴───────┐
//!                                    │ BoardStore   │
//!                                    │ (RocksDB+LZ4)│
//!                                    └──────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`protocol`] — Binary wire protocol (bincode-encoded events)
//! - [`board`] — Strokes, rooms and board documents
//! - [`session`] — Single-task room manager and fan-out
//! - [`persistence`] — Dirty tracking and async store access
//! - [`store`] — RocksDB-backed board snapshots
//! - [`server`] — WebSocket accept loop and connection pumps
//! - [`client`] — WebSocket client for bots, tools and tests
//! - [`shutdown`] — Process-wide stop latch
//!
//! ## Performance Targets
//!
//! | Metric | Target |
//! |--------|--------|
//! | Draw event encode | <1µs |
//! | Server-side relay per member | <10µs |
//! | Board save (1K strokes, LZ4) | <10ms |
//! | Memory per idle room | <100KB |

pub mod board;
pub mod protocol;
pub mod session;
pub mod persistence;
pub mod store;
pub mod server;
pub mod client;
pub mod shutdown;

// Re-exports for convenience
pub use board::{BoardDocument, CursorState, Point, Room, Stroke, ERASER_COLOR};
pub use client::{BoardClient, ConnectionState};
pub use persistence::{DirtySet, Persistence};
pub use protocol::{ClientEvent, ProtocolError, ServerEvent};
pub use server::{BoardServer, ServerConfig, ServerStats};
pub use session::{
    spawn_session, RoomSnapshot, SessionCommand, SessionConfig, SessionHandle, SessionStats,
};
pub use shutdown::ShutdownCoordinator;
pub use store::{BoardMetadata, BoardStore, StoreConfig, StoreError};
