use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fresco_server::board::{BoardDocument, Room, Stroke};
use fresco_server::protocol::{ClientEvent, ServerEvent};
use fresco_server::store::{BoardStore, StoreConfig};
use uuid::Uuid;

/// Realistic two-point strokes with varied coordinates.
fn make_strokes(n: usize) -> Vec<Stroke> {
    (0..n)
        .map(|i| {
            let t = i as f32 * 0.001;
            Stroke::segment(t, t * 0.5, t + 0.01, t * 0.5 + 0.01, "#2d7ff9", 2.5)
        })
        .collect()
}

// ─── Protocol benchmarks ─────────────────────────────────────────────

fn bench_draw_event_encode(c: &mut Criterion) {
    let event = ClientEvent::Draw {
        room_id: "design-review".to_string(),
        x0: 0.25,
        y0: 0.30,
        x1: 0.27,
        y1: 0.33,
        color: "#2d7ff9".to_string(),
        size: 3.0,
    };

    c.bench_function("draw_event_encode", |b| {
        b.iter(|| {
            black_box(black_box(&event).encode().unwrap());
        })
    });
}

fn bench_draw_event_decode(c: &mut Criterion) {
    let event = ClientEvent::Draw {
        room_id: "design-review".to_string(),
        x0: 0.25,
        y0: 0.30,
        x1: 0.27,
        y1: 0.33,
        color: "#2d7ff9".to_string(),
        size: 3.0,
    };
    let encoded = event.encode().unwrap();

    c.bench_function("draw_event_decode", |b| {
        b.iter(|| {
            black_box(ClientEvent::decode(black_box(&encoded)).unwrap());
        })
    });
}

fn bench_draw_relay_roundtrip(c: &mut Criterion) {
    let stroke = Stroke::segment(0.25, 0.30, 0.27, 0.33, "#2d7ff9", 3.0);

    c.bench_function("draw_relay_roundtrip", |b| {
        b.iter(|| {
            let event = ServerEvent::Draw {
                stroke: stroke.clone(),
            };
            let encoded = event.encode().unwrap();
            black_box(ServerEvent::decode(&encoded).unwrap());
        })
    });
}

fn bench_cursor_update_encode(c: &mut Criterion) {
    let event = ServerEvent::CursorUpdate {
        connection_id: Uuid::new_v4(),
        x: 0.42,
        y: 0.58,
        color: "#ff453a".to_string(),
        display_name: "Alice".to_string(),
    };

    c.bench_function("cursor_update_encode", |b| {
        b.iter(|| {
            black_box(black_box(&event).encode().unwrap());
        })
    });
}

fn bench_init_board_encode_1000(c: &mut Criterion) {
    // The join snapshot is the largest frame the server ever sends
    let event = ServerEvent::InitBoard {
        strokes: make_strokes(1000),
    };

    c.bench_function("init_board_encode_1000_strokes", |b| {
        b.iter(|| {
            black_box(black_box(&event).encode().unwrap());
        })
    });
}

// ─── Room benchmarks ─────────────────────────────────────────────────

fn bench_room_append_1000(c: &mut Criterion) {
    c.bench_function("room_append_1000_strokes", |b| {
        b.iter(|| {
            let mut room = Room::new();
            for i in 0..1000 {
                let t = i as f32 * 0.001;
                room.append_stroke(Stroke::segment(t, t, t + 0.01, t + 0.01, "#2d7ff9", 2.5));
            }
            black_box(room.revision);
        })
    });
}

fn bench_participant_names_100(c: &mut Criterion) {
    c.bench_function("participant_names_100_users", |b| {
        b.iter_custom(|iters| {
            let mut room = Room::new();
            for i in 0..100 {
                room.participants
                    .insert(Uuid::new_v4(), format!("User_{i}"));
            }

            let start = std::time::Instant::now();
            for _ in 0..iters {
                black_box(room.participant_names());
            }
            start.elapsed()
        })
    });
}

// ─── Storage benchmarks ──────────────────────────────────────────────

fn bench_save_board_1k(c: &mut Criterion) {
    let dir = std::env::temp_dir().join(format!("fresco_bench_save_{}", Uuid::new_v4()));
    let store = BoardStore::open(StoreConfig::for_testing(&dir)).unwrap();
    let doc = BoardDocument::new(make_strokes(1000));

    c.bench_function("save_board_1000_strokes", |b| {
        b.iter(|| {
            black_box(store.save_board(black_box("bench-room"), black_box(&doc)).unwrap());
        })
    });

    drop(store);
    let _ = std::fs::remove_dir_all(&dir);
}

fn bench_load_board_1k(c: &mut Criterion) {
    let dir = std::env::temp_dir().join(format!("fresco_bench_load_{}", Uuid::new_v4()));
    let store = BoardStore::open(StoreConfig::for_testing(&dir)).unwrap();
    let doc = BoardDocument::new(make_strokes(1000));
    store.save_board("bench-room", &doc).unwrap();

    c.bench_function("load_board_1000_strokes", |b| {
        b.iter(|| {
            black_box(store.load_board(black_box("bench-room")).unwrap());
        })
    });

    drop(store);
    let _ = std::fs::remove_dir_all(&dir);
}

fn bench_list_boards_100(c: &mut Criterion) {
    let dir = std::env::temp_dir().join(format!("fresco_bench_list_{}", Uuid::new_v4()));
    let store = BoardStore::open(StoreConfig::for_testing(&dir)).unwrap();
    let doc = BoardDocument::new(make_strokes(4));
    for i in 0..100 {
        store.save_board(&format!("room-{i:03}"), &doc).unwrap();
    }

    c.bench_function("list_boards_100", |b| {
        b.iter(|| {
            black_box(store.list_boards().unwrap());
        })
    });

    drop(store);
    let _ = std::fs::remove_dir_all(&dir);
}

criterion_group!(
    benches,
    bench_draw_event_encode,
    bench_draw_event_decode,
    bench_draw_relay_roundtrip,
    bench_cursor_update_encode,
    bench_init_board_encode_1000,
    bench_room_append_1000,
    bench_participant_names_100,
    bench_save_board_1k,
    bench_load_board_1k,
    bench_list_boards_100,
);
criterion_main!(benches);
