//! Board data model: strokes, rooms, and stored documents.
//!
//! Room state falls into two categories with different lifetimes:
//! - Durable: the ordered stroke log, persisted per room
//! - Ephemeral: participants and live cursors, gone on disconnect
//!
//! The stroke log is append-only. The only operation that removes
//! strokes is a full clear.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::SystemTime;
use uuid::Uuid;

/// Color token clients send for eraser strokes.
///
/// Erasing is rendered client-side as background-colored paint, so the
/// server stores eraser strokes like any other log entry.
pub const ERASER_COLOR: &str = "eraser";

/// A point in fractional board coordinates.
///
/// Each coordinate is a 0.0..=1.0 fraction of the consumer's own surface
/// size, so a board replays identically on differently sized canvases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One drawing unit in a room's stroke log.
///
/// Live freehand input arrives as single segments (two points); shape
/// and batch tools commit a whole polyline at once. Both land in the
/// log as one `Stroke` and replay in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Polyline vertices (at least two).
    pub points: Vec<Point>,
    /// Color token: a CSS color or [`ERASER_COLOR`].
    pub color: String,
    /// Line width in pixels at the consumer's native scale.
    pub width: f32,
}

impl Stroke {
    /// Build a single-segment stroke from raw endpoint coordinates.
    pub fn segment(
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        color: impl Into<String>,
        width: f32,
    ) -> Self {
        Self {
            points: vec![Point::new(x0, y0), Point::new(x1, y1)],
            color: color.into(),
            width,
        }
    }

    /// Whether this stroke erases rather than paints.
    pub fn is_eraser(&self) -> bool {
        self.color == ERASER_COLOR
    }
}

/// Live cursor state for one connection (ephemeral, never persisted).
#[derive(Debug, Clone, PartialEq)]
pub struct CursorState {
    pub x: f32,
    pub y: f32,
    pub color: String,
    pub display_name: String,
}

/// The exact unit stored per room: the stroke log plus the wall-clock
/// time of the write that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardDocument {
    pub strokes: Vec<Stroke>,
    /// Milliseconds since the Unix epoch.
    pub updated_at: u64,
}

impl BoardDocument {
    /// Wrap a stroke log with a fresh timestamp.
    pub fn new(strokes: Vec<Stroke>) -> Self {
        Self {
            strokes,
            updated_at: epoch_millis(),
        }
    }

    /// An empty document with a fresh timestamp.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// One resident room: durable stroke log plus ephemeral presence.
///
/// `revision` increments on every durable mutation. The flush path
/// captures it alongside the strokes so a store write that completes
/// after further edits cannot clear the room's dirty flag.
#[derive(Debug, Default)]
pub struct Room {
    /// Durable: ordered stroke log.
    pub strokes: Vec<Stroke>,
    /// Ephemeral: connection id to display name.
    pub participants: HashMap<Uuid, String>,
    /// Ephemeral: connection id to live cursor.
    pub cursors: HashMap<Uuid, CursorState>,
    /// Bumped on append, clear, and hydration.
    pub revision: u64,
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one stroke to the log.
    pub fn append_stroke(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
        self.revision += 1;
    }

    /// Drop every stroke.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.revision += 1;
    }

    /// Splice strokes loaded from the store in front of anything drawn
    /// while the load was in flight, keeping chronological order.
    pub fn hydrate(&mut self, mut loaded: Vec<Stroke>) {
        if loaded.is_empty() {
            return;
        }
        loaded.append(&mut self.strokes);
        self.strokes = loaded;
        self.revision += 1;
    }

    /// Display names of everyone in the room, sorted for stable output.
    pub fn participant_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.participants.values().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_new() {
        let p = Point::new(0.25, 0.75);
        assert_eq!(p.x, 0.25);
        assert_eq!(p.y, 0.75);
    }

    #[test]
    fn test_stroke_segment() {
        let s = Stroke::segment(0.1, 0.2, 0.3, 0.4, "#ff0000", 3.0);
        assert_eq!(s.points.len(), 2);
        assert_eq!(s.points[0], Point::new(0.1, 0.2));
        assert_eq!(s.points[1], Point::new(0.3, 0.4));
        assert_eq!(s.color, "#ff0000");
        assert_eq!(s.width, 3.0);
        assert!(!s.is_eraser());
    }

    #[test]
    fn test_stroke_is_eraser() {
        let s = Stroke::segment(0.0, 0.0, 0.5, 0.5, ERASER_COLOR, 20.0);
        assert!(s.is_eraser());
    }

    #[test]
    fn test_room_append_bumps_revision() {
        let mut room = Room::new();
        assert_eq!(room.revision, 0);

        room.append_stroke(Stroke::segment(0.0, 0.0, 0.1, 0.1, "#000", 1.0));
        room.append_stroke(Stroke::segment(0.1, 0.1, 0.2, 0.2, "#000", 1.0));

        assert_eq!(room.strokes.len(), 2);
        assert_eq!(room.revision, 2);
    }

    #[test]
    fn test_room_clear() {
        let mut room = Room::new();
        room.append_stroke(Stroke::segment(0.0, 0.0, 0.1, 0.1, "#000", 1.0));
        let rev = room.revision;

        room.clear();
        assert!(room.strokes.is_empty());
        assert_eq!(room.revision, rev + 1);
    }

    #[test]
    fn test_room_hydrate_prepends() {
        let mut room = Room::new();
        // Drawn while the store load was still in flight
        room.append_stroke(Stroke::segment(0.5, 0.5, 0.6, 0.6, "#live", 1.0));

        let loaded = vec![
            Stroke::segment(0.0, 0.0, 0.1, 0.1, "#old1", 1.0),
            Stroke::segment(0.1, 0.1, 0.2, 0.2, "#old2", 1.0),
        ];
        room.hydrate(loaded);

        assert_eq!(room.strokes.len(), 3);
        assert_eq!(room.strokes[0].color, "#old1");
        assert_eq!(room.strokes[1].color, "#old2");
        assert_eq!(room.strokes[2].color, "#live");
    }

    #[test]
    fn test_room_hydrate_empty_is_noop() {
        let mut room = Room::new();
        room.append_stroke(Stroke::segment(0.0, 0.0, 0.1, 0.1, "#000", 1.0));
        let rev = room.revision;

        room.hydrate(Vec::new());
        assert_eq!(room.strokes.len(), 1);
        assert_eq!(room.revision, rev);
    }

    #[test]
    fn test_participant_names_sorted() {
        let mut room = Room::new();
        room.participants.insert(Uuid::new_v4(), "Zoe".into());
        room.participants.insert(Uuid::new_v4(), "Alice".into());
        room.participants.insert(Uuid::new_v4(), "Bob".into());

        assert_eq!(room.participant_names(), vec!["Alice", "Bob", "Zoe"]);
    }

    #[test]
    fn test_board_document_timestamps() {
        let doc = BoardDocument::empty();
        assert!(doc.strokes.is_empty());
        // Sanity: later than 2020-01-01 in millis
        assert!(doc.updated_at > 1_577_836_800_000);
    }

    #[test]
    fn test_board_document_roundtrip() {
        let doc = BoardDocument::new(vec![Stroke::segment(0.0, 0.0, 1.0, 1.0, "#fff", 2.0)]);
        let bytes = bincode::serde::encode_to_vec(&doc, bincode::config::standard()).unwrap();
        let (decoded, _): (BoardDocument, _) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard()).unwrap();
        assert_eq!(decoded, doc);
    }
}
