//! Load and flush policy between resident rooms and the board store.
//!
//! Reads degrade: a missing or failing load hydrates an empty room so
//! joining never blocks on a broken store. Writes retry: a failed flush
//! leaves the room in the dirty set for the next cycle.
//!
//! RocksDB calls are synchronous, so every store touch goes through
//! `spawn_blocking` and the session actor only awaits completions.

use std::collections::HashSet;
use std::sync::Arc;

use crate::board::{BoardDocument, Stroke};
use crate::store::{BoardMetadata, BoardStore, StoreError};

/// Async facade over the blocking board store.
#[derive(Clone)]
pub struct Persistence {
    store: Arc<BoardStore>,
}

impl Persistence {
    pub fn new(store: Arc<BoardStore>) -> Self {
        Self { store }
    }

    /// Load a room's strokes, creating an empty stored document for a
    /// room the store has never seen. Room existence becomes durable
    /// before the first stroke does.
    ///
    /// Storage failures degrade to an empty board; the error is logged
    /// and never surfaced to the joining client.
    pub async fn load(&self, room_id: &str) -> Vec<Stroke> {
        let store = self.store.clone();
        let id = room_id.to_string();

        let result = tokio::task::spawn_blocking(move || match store.load_board(&id) {
            Ok(doc) => Ok(doc.strokes),
            Err(StoreError::NotFound(_)) => {
                store.save_board(&id, &BoardDocument::empty())?;
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        })
        .await;

        match result {
            Ok(Ok(strokes)) => strokes,
            Ok(Err(e)) => {
                log::warn!("Load failed for room '{room_id}', starting empty: {e}");
                Vec::new()
            }
            Err(e) => {
                log::warn!("Load task for room '{room_id}' did not complete: {e}");
                Vec::new()
            }
        }
    }

    /// Write a captured board document for one room.
    pub async fn write(
        &self,
        room_id: &str,
        doc: BoardDocument,
    ) -> Result<BoardMetadata, StoreError> {
        let store = self.store.clone();
        let id = room_id.to_string();

        tokio::task::spawn_blocking(move || store.save_board(&id, &doc))
            .await
            .map_err(|e| StoreError::DatabaseError(format!("Write task failed: {e}")))?
    }
}

/// Room ids with unflushed mutations.
///
/// Marked on join-triggered loads, stroke appends, and clears. Cleared
/// only after a successful flush whose captured revision is still the
/// room's current one, so a write racing later edits cannot drop them.
#[derive(Debug, Default)]
pub struct DirtySet {
    rooms: HashSet<String>,
}

impl DirtySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a room as having unflushed changes.
    pub fn mark(&mut self, room_id: &str) -> bool {
        self.rooms.insert(room_id.to_string())
    }

    /// Clear a room after a confirmed-current flush.
    pub fn remove(&mut self, room_id: &str) -> bool {
        self.rooms.remove(room_id)
    }

    pub fn contains(&self, room_id: &str) -> bool {
        self.rooms.contains(room_id)
    }

    /// Snapshot the dirty rooms for one flush cycle.
    pub fn snapshot(&self) -> Vec<String> {
        self.rooms.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
