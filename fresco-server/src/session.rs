//! Room session manager: one actor task owning every room.
//!
//! ## Architecture
//!
//! ```text
//! connection tasks            session actor (single task)        blocking pool
//!                        ┌─────────────────────────────────┐
//!  conn A ── command ──▶ │ rooms        memberships        │── write ──▶ RocksDB
//!  conn B ── command ──▶ │ dirty set    in-flight writes   │◀─ completion ─
//!  conn C ── command ──▶ │                                 │
//!                        │ select! { commands, completions,│◀─ load ──── RocksDB
//!  ◀── outbound frames ──│           flush tick, shutdown }│
//!                        └─────────────────────────────────┘
//! ```
//!
//! All room state lives in this one task, so there is no per-room lock
//! anywhere. Command handlers never await; storage work runs off-actor
//! and reports back on a completions channel, which means state can only
//! interleave between whole events, never inside one.
//!
//! Fan-out sends are non-blocking: each connection has a bounded
//! outbound buffer, and a full buffer drops the frame for that consumer
//! instead of stalling the room.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::board::{BoardDocument, CursorState, Room, Stroke};
use crate::persistence::{DirtySet, Persistence};
use crate::protocol::{ClientEvent, ServerEvent};
use crate::shutdown::ShutdownCoordinator;
use crate::store::{BoardMetadata, StoreError};

/// Session actor tuning.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Interval between dirty-room flush sweeps.
    pub flush_interval: Duration,
    /// Command channel capacity; connection tasks wait when it is full.
    pub command_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_secs(30),
            command_buffer: 1024,
        }
    }
}

/// Commands from connection tasks to the session actor.
pub enum SessionCommand {
    /// A new connection is ready to receive outbound frames.
    Register {
        connection_id: Uuid,
        outbound: mpsc::Sender<Arc<Vec<u8>>>,
    },
    /// A decoded client event.
    Event {
        connection_id: Uuid,
        event: ClientEvent,
    },
    /// The connection's socket closed or failed.
    Disconnect { connection_id: Uuid },
    /// Current counters.
    Stats {
        reply: oneshot::Sender<SessionStats>,
    },
    /// Point-in-time view of one room.
    InspectRoom {
        room_id: String,
        reply: oneshot::Sender<Option<RoomSnapshot>>,
    },
}

/// Counters the session actor maintains.
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    pub connections: usize,
    pub resident_rooms: usize,
    pub loading_rooms: usize,
    pub dirty_rooms: usize,
    pub events_handled: u64,
    pub strokes_appended: u64,
    pub flushes_completed: u64,
    pub flushes_failed: u64,
    pub frames_dropped: u64,
}

/// Point-in-time view of one resident room.
#[derive(Debug, Clone)]
pub struct RoomSnapshot {
    pub strokes: Vec<Stroke>,
    /// Sorted display names.
    pub participants: Vec<String>,
    pub cursor_count: usize,
    pub revision: u64,
    pub dirty: bool,
}

/// Cloneable handle for talking to the session actor.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// Announce a connection and its outbound channel.
    ///
    /// Returns `false` once the actor has stopped.
    pub async fn register(&self, connection_id: Uuid, outbound: mpsc::Sender<Arc<Vec<u8>>>) -> bool {
        self.tx
            .send(SessionCommand::Register {
                connection_id,
                outbound,
            })
            .await
            .is_ok()
    }

    /// Forward a decoded client event.
    pub async fn event(&self, connection_id: Uuid, event: ClientEvent) -> bool {
        self.tx
            .send(SessionCommand::Event {
                connection_id,
                event,
            })
            .await
            .is_ok()
    }

    /// Report a closed connection. Safe to call more than once.
    pub async fn disconnect(&self, connection_id: Uuid) -> bool {
        self.tx
            .send(SessionCommand::Disconnect { connection_id })
            .await
            .is_ok()
    }

    /// Fetch current counters, or `None` if the actor has stopped.
    pub async fn stats(&self) -> Option<SessionStats> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::Stats { reply })
            .await
            .ok()?;
        rx.await.ok()
    }

    /// Snapshot one room, or `None` if it is not resident.
    pub async fn inspect_room(&self, room_id: &str) -> Option<RoomSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SessionCommand::InspectRoom {
                room_id: room_id.to_string(),
                reply,
            })
            .await
            .ok()?;
        rx.await.ok().flatten()
    }
}

/// Spawn the session actor.
///
/// The actor runs until `shutdown` triggers, then performs one final
/// flush of every dirty room and exits. Await the returned task handle
/// to know the flush has finished.
pub fn spawn_session(
    persistence: Persistence,
    config: SessionConfig,
    shutdown: ShutdownCoordinator,
) -> (SessionHandle, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = mpsc::channel(config.command_buffer);
    let (completion_tx, completion_rx) = mpsc::unbounded_channel();

    let session = Session {
        persistence,
        config,
        connections: HashMap::new(),
        memberships: HashMap::new(),
        rooms: HashMap::new(),
        loading: HashMap::new(),
        dirty: DirtySet::new(),
        in_flight: HashSet::new(),
        counters: Counters::default(),
        completion_tx,
    };

    let task = tokio::spawn(session.run(cmd_rx, completion_rx, shutdown));
    (SessionHandle { tx: cmd_tx }, task)
}

/// A join waiting for its room's store load to finish.
struct PendingJoin {
    connection_id: Uuid,
    display_name: String,
}

/// A store load in flight: who is waiting on it, and whether its
/// result is still worth applying.
#[derive(Default)]
struct LoadState {
    /// Joins that complete when hydration lands.
    pending: Vec<PendingJoin>,
    /// Set when the room is cleared while the load runs; the stored
    /// strokes predate the wipe and must not be spliced in.
    invalidated: bool,
}

/// Completions reported by off-actor storage tasks.
enum Completion {
    /// A store load finished for a loading room.
    Hydrated {
        room_id: String,
        strokes: Vec<Stroke>,
    },
    /// A store write finished.
    Flushed {
        room_id: String,
        /// Room revision captured when the write started.
        revision: u64,
        result: Result<BoardMetadata, StoreError>,
    },
}

#[derive(Debug, Default)]
struct Counters {
    events_handled: u64,
    strokes_appended: u64,
    flushes_completed: u64,
    flushes_failed: u64,
    frames_dropped: u64,
}

struct Session {
    persistence: Persistence,
    config: SessionConfig,
    /// Connection id to its outbound frame channel.
    connections: HashMap<Uuid, mpsc::Sender<Arc<Vec<u8>>>>,
    /// Connection id to the room it is currently bound to.
    memberships: HashMap<Uuid, String>,
    /// Resident rooms.
    rooms: HashMap<String, Room>,
    /// Rooms with a store load in flight.
    loading: HashMap<String, LoadState>,
    dirty: DirtySet,
    /// Rooms with a store write in flight; at most one write per room.
    in_flight: HashSet<String>,
    counters: Counters,
    completion_tx: mpsc::UnboundedSender<Completion>,
}

impl Session {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<SessionCommand>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
        shutdown: ShutdownCoordinator,
    ) {
        let mut flush_tick = tokio::time::interval(self.config.flush_interval);
        flush_tick.tick().await; // immediate first tick

        log::info!(
            "Session actor started (flush interval {:?})",
            self.config.flush_interval
        );

        loop {
            tokio::select! {
                Some(cmd) = commands.recv() => self.handle_command(cmd),
                Some(completion) = completions.recv() => self.handle_completion(completion),
                _ = flush_tick.tick() => self.flush_dirty(),
                _ = shutdown.wait() => break,
            }
        }

        self.shutdown_flush(&mut completions).await;
    }

    fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Register {
                connection_id,
                outbound,
            } => {
                log::debug!("Connection {connection_id} registered");
                self.connections.insert(connection_id, outbound);
            }
            SessionCommand::Event {
                connection_id,
                event,
            } => self.handle_event(connection_id, event),
            SessionCommand::Disconnect { connection_id } => self.handle_disconnect(connection_id),
            SessionCommand::Stats { reply } => {
                let _ = reply.send(self.stats());
            }
            SessionCommand::InspectRoom { room_id, reply } => {
                let _ = reply.send(self.inspect_room(&room_id));
            }
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Hydrated { room_id, strokes } => self.handle_hydrated(room_id, strokes),
            Completion::Flushed {
                room_id,
                revision,
                result,
            } => self.handle_flushed(room_id, revision, result),
        }
    }

    fn handle_event(&mut self, connection_id: Uuid, event: ClientEvent) {
        self.counters.events_handled += 1;
        log::debug!("Event from {connection_id} for room '{}'", event.room_id());

        match event {
            ClientEvent::JoinRoom {
                room_id,
                display_name,
            } => self.handle_join(connection_id, room_id, display_name),
            ClientEvent::Draw {
                room_id,
                x0,
                y0,
                x1,
                y1,
                color,
                size,
            } => {
                let stroke = Stroke::segment(x0, y0, x1, y1, color, size);
                self.append_and_relay(connection_id, room_id, stroke, false);
            }
            ClientEvent::CommitStroke { room_id, stroke } => {
                self.append_and_relay(connection_id, room_id, stroke, true);
            }
            ClientEvent::ClearRoom { room_id } => self.handle_clear(room_id),
            ClientEvent::CursorMove {
                room_id,
                x,
                y,
                color,
                display_name,
            } => self.handle_cursor_move(connection_id, room_id, x, y, color, display_name),
            ClientEvent::CursorLeave { room_id } => {
                self.handle_cursor_leave(connection_id, room_id)
            }
            ClientEvent::SendMessage {
                room_id,
                display_name,
                text,
            } => self.handle_chat(connection_id, room_id, display_name, text),
        }
    }

    // ─── Join / leave ─────────────────────────────────────────────────

    fn handle_join(&mut self, connection_id: Uuid, room_id: String, display_name: String) {
        // A fresh join supersedes any of this connection's joins still
        // queued behind a loading room; a connection has at most one
        // pending join anywhere
        for load in self.loading.values_mut() {
            load.pending.retain(|p| p.connection_id != connection_id);
        }

        // Switching rooms is a full departure from the old one first
        if let Some(previous) = self.memberships.get(&connection_id).cloned() {
            if previous != room_id {
                self.leave_room(connection_id, &previous);
            }
        }

        if let Some(load) = self.loading.get_mut(&room_id) {
            // A load is already in flight; this join completes when it lands
            load.pending.push(PendingJoin {
                connection_id,
                display_name,
            });
            return;
        }

        if self.rooms.contains_key(&room_id) {
            self.complete_join(connection_id, room_id, display_name);
            return;
        }

        // First reference since startup: hydrate from the store. Only the
        // joining flow waits; the actor keeps serving other rooms.
        log::debug!("Room '{room_id}' not resident, loading");
        self.loading.insert(
            room_id.clone(),
            LoadState {
                pending: vec![PendingJoin {
                    connection_id,
                    display_name,
                }],
                invalidated: false,
            },
        );

        let persistence = self.persistence.clone();
        let completions = self.completion_tx.clone();
        tokio::spawn(async move {
            let strokes = persistence.load(&room_id).await;
            let _ = completions.send(Completion::Hydrated { room_id, strokes });
        });
    }

    /// Make a connection a member of a resident room.
    ///
    /// The joiner gets the full stroke log as a single event, then the
    /// whole room (joiner included) gets the refreshed name list.
    fn complete_join(&mut self, connection_id: Uuid, room_id: String, display_name: String) {
        let Some(room) = self.rooms.get_mut(&room_id) else {
            return;
        };
        room.participants.insert(connection_id, display_name.clone());
        let strokes = room.strokes.clone();
        let names = room.participant_names();

        log::info!(
            "'{display_name}' joined room '{room_id}' ({} strokes, {} participants)",
            strokes.len(),
            names.len()
        );

        if let Some(payload) = encode_event(&ServerEvent::InitBoard { strokes }) {
            self.send_to(&connection_id, &payload);
        }
        if let Some(payload) = encode_event(&ServerEvent::UserList {
            display_names: names,
        }) {
            self.broadcast_room(&room_id, &payload, None);
        }

        self.memberships.insert(connection_id, room_id);
    }

    /// Remove a connection from a room and notify the remaining members
    /// with exactly one `UserList` and one `CursorRemove`.
    fn leave_room(&mut self, connection_id: Uuid, room_id: &str) {
        self.memberships.remove(&connection_id);

        let Some(room) = self.rooms.get_mut(room_id) else {
            return;
        };
        let was_member = room.participants.remove(&connection_id).is_some();
        room.cursors.remove(&connection_id);
        if !was_member {
            return;
        }
        let names = room.participant_names();

        if let Some(payload) = encode_event(&ServerEvent::UserList {
            display_names: names,
        }) {
            self.broadcast_room(room_id, &payload, None);
        }
        if let Some(payload) = encode_event(&ServerEvent::CursorRemove { connection_id }) {
            self.broadcast_room(room_id, &payload, None);
        }
    }

    fn handle_disconnect(&mut self, connection_id: Uuid) {
        self.connections.remove(&connection_id);

        // Forget any join still queued behind a loading room
        for load in self.loading.values_mut() {
            load.pending.retain(|p| p.connection_id != connection_id);
        }

        if let Some(room_id) = self.memberships.get(&connection_id).cloned() {
            self.leave_room(connection_id, &room_id);
            log::info!("Connection {connection_id} left room '{room_id}'");
        } else {
            // Idempotent: unbound connections have nothing to clean up
            log::debug!("Connection {connection_id} disconnected without a room");
        }
    }

    // ─── Drawing / clearing ───────────────────────────────────────────

    fn append_and_relay(
        &mut self,
        connection_id: Uuid,
        room_id: String,
        stroke: Stroke,
        batched: bool,
    ) {
        let room = self.room_entry(&room_id);
        room.append_stroke(stroke.clone());
        self.counters.strokes_appended += 1;
        self.dirty.mark(&room_id);

        let event = if batched {
            ServerEvent::CommitStroke { stroke }
        } else {
            ServerEvent::Draw { stroke }
        };
        if let Some(payload) = encode_event(&event) {
            self.broadcast_room(&room_id, &payload, Some(&connection_id));
        }
    }

    fn handle_clear(&mut self, room_id: String) {
        let room = self.room_entry(&room_id);
        room.clear();
        self.dirty.mark(&room_id);
        log::info!("Room '{room_id}' cleared");

        // A load still in flight holds history that predates this wipe;
        // splicing it in later would resurrect the cleared strokes
        if let Some(load) = self.loading.get_mut(&room_id) {
            load.invalidated = true;
        }

        // The requester sees the wipe too
        if let Some(payload) = encode_event(&ServerEvent::BoardCleared) {
            self.broadcast_room(&room_id, &payload, None);
        }

        // An emptied board reaches disk without waiting for the sweep
        self.flush_room(&room_id);
    }

    // ─── Presence / chat ──────────────────────────────────────────────

    fn handle_cursor_move(
        &mut self,
        connection_id: Uuid,
        room_id: String,
        x: f32,
        y: f32,
        color: String,
        display_name: String,
    ) {
        let room = self.room_entry(&room_id);
        room.cursors.insert(
            connection_id,
            CursorState {
                x,
                y,
                color: color.clone(),
                display_name: display_name.clone(),
            },
        );

        // Cursors are ephemeral and never mark the room dirty
        if let Some(payload) = encode_event(&ServerEvent::CursorUpdate {
            connection_id,
            x,
            y,
            color,
            display_name,
        }) {
            self.broadcast_room(&room_id, &payload, Some(&connection_id));
        }
    }

    fn handle_cursor_leave(&mut self, connection_id: Uuid, room_id: String) {
        let room = self.room_entry(&room_id);
        room.cursors.remove(&connection_id);

        if let Some(payload) = encode_event(&ServerEvent::CursorRemove { connection_id }) {
            self.broadcast_room(&room_id, &payload, Some(&connection_id));
        }
    }

    fn handle_chat(
        &mut self,
        connection_id: Uuid,
        room_id: String,
        display_name: String,
        text: String,
    ) {
        // Broadcast once, never stored, never replayed
        self.room_entry(&room_id);

        if let Some(payload) = encode_event(&ServerEvent::NewMessage {
            display_name,
            text,
            connection_id,
        }) {
            self.broadcast_room(&room_id, &payload, None);
        }
    }

    // ─── Persistence lifecycle ────────────────────────────────────────

    fn handle_hydrated(&mut self, room_id: String, strokes: Vec<Stroke>) {
        let load = self.loading.remove(&room_id).unwrap_or_default();

        let room = self.room_entry(&room_id);
        if load.invalidated {
            log::debug!(
                "Dropping {} loaded strokes for room '{room_id}': cleared while loading",
                strokes.len()
            );
        } else {
            room.hydrate(strokes);
        }
        let stroke_count = room.strokes.len();

        // A join-triggered load is itself a mutating event
        self.dirty.mark(&room_id);

        log::debug!(
            "Room '{room_id}' hydrated ({stroke_count} strokes, {} queued joins)",
            load.pending.len()
        );

        for join in load.pending {
            // Queued connections may have dropped while the load ran
            if self.connections.contains_key(&join.connection_id) {
                self.complete_join(join.connection_id, room_id.clone(), join.display_name);
            }
        }

        if load.invalidated {
            // The clear's eager write was deferred while the load ran
            self.flush_room(&room_id);
        }
    }

    /// Start one store write for a room, capturing its content and
    /// revision synchronously.
    ///
    /// At most one write per room runs at a time, and no write starts
    /// while the room's load is still in flight. In either case the
    /// room just stays dirty and gets flushed on a later pass.
    fn flush_room(&mut self, room_id: &str) {
        if self.in_flight.contains(room_id) {
            return;
        }
        if self.loading.contains_key(room_id) {
            // A write now could be read back by the room's own load
            // and spliced in as stored history, duplicating the live
            // strokes; nothing is written until hydration lands
            return;
        }
        let Some(room) = self.rooms.get(room_id) else {
            return;
        };

        let doc = BoardDocument::new(room.strokes.clone());
        let revision = room.revision;
        self.in_flight.insert(room_id.to_string());

        let persistence = self.persistence.clone();
        let completions = self.completion_tx.clone();
        let id = room_id.to_string();
        tokio::spawn(async move {
            let result = persistence.write(&id, doc).await;
            // Release the store clone before reporting; a restart
            // reopens the database right after the actor stops
            drop(persistence);
            let _ = completions.send(Completion::Flushed {
                room_id: id,
                revision,
                result,
            });
        });
    }

    /// Flush every dirty room, one independent write per room.
    fn flush_dirty(&mut self) {
        let snapshot = self.dirty.snapshot();
        if snapshot.is_empty() {
            return;
        }
        log::debug!("Flush sweep over {} dirty rooms", snapshot.len());
        for room_id in snapshot {
            self.flush_room(&room_id);
        }
    }

    fn handle_flushed(
        &mut self,
        room_id: String,
        revision: u64,
        result: Result<BoardMetadata, StoreError>,
    ) {
        self.in_flight.remove(&room_id);

        match result {
            Ok(meta) => {
                self.counters.flushes_completed += 1;
                let current = self.rooms.get(&room_id).map(|r| r.revision);
                if current == Some(revision) {
                    // Captured content is still current
                    self.dirty.remove(&room_id);
                    log::debug!(
                        "Flushed room '{room_id}' ({} strokes, {} bytes)",
                        meta.stroke_count, meta.compressed_size
                    );
                } else {
                    // Mutated while the write ran; chase the new content now
                    self.flush_room(&room_id);
                }
            }
            Err(e) => {
                self.counters.flushes_failed += 1;
                log::error!("Flush failed for room '{room_id}', will retry: {e}");
                // Stays dirty; the next sweep retries
            }
        }
    }

    /// One final best-effort flush of everything dirty, then stop.
    ///
    /// Draining completions here also settles writes that were racing
    /// edits at shutdown: a stale write re-flushes with the final
    /// content before the actor exits. Loads still in flight land
    /// first, so a board whose hydration raced the shutdown is merged
    /// and written out instead of being overwritten by only the
    /// strokes drawn since the join.
    async fn shutdown_flush(&mut self, completions: &mut mpsc::UnboundedReceiver<Completion>) {
        log::info!(
            "Session draining: {} dirty rooms, {} writes in flight, {} rooms loading",
            self.dirty.len(),
            self.in_flight.len(),
            self.loading.len()
        );
        self.flush_dirty();

        while !self.in_flight.is_empty() || !self.loading.is_empty() {
            match completions.recv().await {
                Some(Completion::Hydrated { room_id, strokes }) => {
                    self.handle_hydrated(room_id.clone(), strokes);
                    // Hydration marked the room dirty; write the
                    // merged content before exiting
                    self.flush_room(&room_id);
                }
                Some(completion) => self.handle_completion(completion),
                None => break,
            }
        }

        if !self.dirty.is_empty() {
            log::warn!("Stopping with {} rooms still dirty", self.dirty.len());
        }
        log::info!("Session actor stopped");
    }

    // ─── Fan-out ──────────────────────────────────────────────────────

    /// Resident room for an event, created empty if unknown.
    ///
    /// Any event may name a room nobody has joined; creation is
    /// permissive and "room not found" is never an answer.
    fn room_entry(&mut self, room_id: &str) -> &mut Room {
        match self.rooms.entry(room_id.to_string()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                log::info!("Creating room '{room_id}' on first event");
                e.insert(Room::new())
            }
        }
    }

    /// Send one pre-encoded frame to a single connection.
    fn send_to(&mut self, connection_id: &Uuid, payload: &Arc<Vec<u8>>) {
        if let Some(tx) = self.connections.get(connection_id) {
            if tx.try_send(payload.clone()).is_err() {
                self.counters.frames_dropped += 1;
                log::debug!("Dropping frame for slow or closed connection {connection_id}");
            }
        }
    }

    /// Fan a pre-encoded frame out to a room's members.
    ///
    /// `without` skips one connection (the originator). A member whose
    /// outbound buffer is full loses the frame; the actor never blocks
    /// on a slow consumer.
    fn broadcast_room(&mut self, room_id: &str, payload: &Arc<Vec<u8>>, without: Option<&Uuid>) {
        let Some(room) = self.rooms.get(room_id) else {
            return;
        };
        for conn_id in room.participants.keys() {
            if Some(conn_id) == without {
                continue;
            }
            if let Some(tx) = self.connections.get(conn_id) {
                if tx.try_send(payload.clone()).is_err() {
                    self.counters.frames_dropped += 1;
                    log::debug!("Dropping frame for slow or closed connection {conn_id}");
                }
            }
        }
    }

    // ─── Observability ────────────────────────────────────────────────

    fn stats(&self) -> SessionStats {
        SessionStats {
            connections: self.connections.len(),
            resident_rooms: self.rooms.len(),
            loading_rooms: self.loading.len(),
            dirty_rooms: self.dirty.len(),
            events_handled: self.counters.events_handled,
            strokes_appended: self.counters.strokes_appended,
            flushes_completed: self.counters.flushes_completed,
            flushes_failed: self.counters.flushes_failed,
            frames_dropped: self.counters.frames_dropped,
        }
    }

    fn inspect_room(&self, room_id: &str) -> Option<RoomSnapshot> {
        self.rooms.get(room_id).map(|room| RoomSnapshot {
            strokes: room.strokes.clone(),
            participants: room.participant_names(),
            cursor_count: room.cursors.len(),
            revision: room.revision,
            dirty: self.dirty.contains(room_id),
        })
    }
}

/// Encode an outbound event once for zero-copy fan-out.
fn encode_event(event: &ServerEvent) -> Option<Arc<Vec<u8>>> {
    match event.encode() {
        Ok(bytes) => Some(Arc::new(bytes)),
        Err(e) => {
            log::error!("Failed to encode outbound event: {e}");
            None
        }
    }
}
