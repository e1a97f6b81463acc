//! RocksDB-backed persistent board store.
//!
//! Column families:
//! - `boards` — Full board documents (bincode, LZ4 compressed), keyed by room id
//! - `meta`   — Per-board metadata (stroke count, sizes, timestamps)
//!
//! One document per room, last writer wins. A save writes both column
//! families in a single atomic batch so metadata can never describe a
//! document that was not written.
//!
//! Performance targets:
//! - Open (10k boards): <100ms (bloom filters + block cache)
//! - Board load (cache hit): <1ms
//! - Board save (1k strokes): <500μs
//!
//! Reference: Kleppmann — DDIA, Chapter 3 (LSM Trees, SSTables)

use rocksdb::{
    BlockBasedOptions, Cache, ColumnFamilyDescriptor, DBCompressionType, DBWithThreadMode,
    IteratorMode, Options, SingleThreaded, WriteBatch, WriteOptions,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::board::{epoch_millis, BoardDocument};

/// Column family names.
const CF_BOARDS: &str = "boards";
const CF_META: &str = "meta";

/// All column family names for initialization.
const COLUMN_FAMILIES: &[&str] = &[CF_BOARDS, CF_META];

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database directory path
    pub path: PathBuf,
    /// Block cache size in bytes (default: 128MB)
    pub block_cache_size: usize,
    /// Bloom filter bits per key (default: 10)
    pub bloom_filter_bits: i32,
    /// Enable fsync on every write (default: false)
    pub sync_writes: bool,
    /// Max open files for RocksDB (default: 512)
    pub max_open_files: i32,
    /// Write buffer size per column family (default: 32MB)
    pub write_buffer_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("fresco_data"),
            block_cache_size: 128 * 1024 * 1024, // 128MB
            bloom_filter_bits: 10,
            sync_writes: false, // RocksDB WAL already covers crash safety
            max_open_files: 512,
            write_buffer_size: 32 * 1024 * 1024, // 32MB
        }
    }
}

impl StoreConfig {
    /// Create config for testing (small caches, temp directory).
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 8 * 1024 * 1024, // 8MB
            bloom_filter_bits: 10,
            sync_writes: false,
            max_open_files: 64,
            write_buffer_size: 4 * 1024 * 1024, // 4MB
        }
    }
}

/// Board metadata stored alongside each document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardMetadata {
    /// Number of strokes in the stored document
    pub stroke_count: u64,
    /// Uncompressed document size in bytes
    pub snapshot_size: u64,
    /// Compressed document size in bytes
    pub compressed_size: u64,
    /// First write timestamp (milliseconds since epoch)
    pub created_at: u64,
    /// Last write timestamp (milliseconds since epoch)
    pub updated_at: u64,
}

impl BoardMetadata {
    fn new() -> Self {
        let now = epoch_millis();
        Self {
            stroke_count: 0,
            snapshot_size: 0,
            compressed_size: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn encode(&self) -> Result<Vec<u8>, StoreError> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| StoreError::SerializationError(e.to_string()))
    }

    fn decode(bytes: &[u8]) -> Result<Self, StoreError> {
        let (meta, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map_err(|e| StoreError::DeserializationError(e.to_string()))?;
        Ok(meta)
    }
}

/// Storage errors.
#[derive(Debug, Clone)]
pub enum StoreError {
    /// RocksDB internal error
    DatabaseError(String),
    /// Board not found
    NotFound(String),
    /// Serialization failed
    SerializationError(String),
    /// Deserialization failed
    DeserializationError(String),
    /// Compression error
    CompressionError(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::DatabaseError(e) => write!(f, "Database error: {e}"),
            StoreError::NotFound(id) => write!(f, "Board not found: {id}"),
            StoreError::SerializationError(e) => write!(f, "Serialization error: {e}"),
            StoreError::DeserializationError(e) => write!(f, "Deserialization error: {e}"),
            StoreError::CompressionError(e) => write!(f, "Compression error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rocksdb::Error> for StoreError {
    fn from(e: rocksdb::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}

/// RocksDB-backed board store.
///
/// Provides durable storage for drawing rooms with:
/// - LZ4-compressed document snapshots
/// - Bloom filters for fast key lookup
/// - Block cache for hot board access
/// - Atomic write batches for document + metadata consistency
pub struct BoardStore {
    /// RocksDB instance (single-threaded mode, concurrency via tokio)
    db: DBWithThreadMode<SingleThreaded>,
    /// Store configuration
    config: StoreConfig,
}

impl BoardStore {
    /// Open the board store at the configured path.
    ///
    /// Creates the database and column families if they don't exist.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_max_open_files(config.max_open_files);
        db_opts.set_keep_log_file_num(5);
        db_opts.set_max_total_wal_size(64 * 1024 * 1024); // 64MB WAL limit
        db_opts.increase_parallelism(num_cpus());

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Self::cf_options(&config)))
            .collect();

        let db = DBWithThreadMode::<SingleThreaded>::open_cf_descriptors(
            &db_opts,
            &config.path,
            cf_descriptors,
        )?;

        Ok(Self { db, config })
    }

    /// Build column family options.
    ///
    /// Both families are point-lookup workloads keyed by room id.
    fn cf_options(config: &StoreConfig) -> Options {
        let mut opts = Options::default();

        let mut block_opts = BlockBasedOptions::default();
        let cache = Cache::new_lru_cache(config.block_cache_size);
        block_opts.set_block_cache(&cache);
        block_opts.set_bloom_filter(config.bloom_filter_bits as f64, false);
        block_opts.set_block_size(16 * 1024); // 16KB blocks
        opts.set_block_based_table_factory(&block_opts);

        opts.set_compression_type(DBCompressionType::Lz4);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_max_write_buffer_number(2);
        opts.optimize_for_point_lookup(config.block_cache_size as u64);

        opts
    }

    /// Save a board document, overwriting any previous version.
    ///
    /// Document and metadata land in one atomic write batch. The
    /// metadata's `updated_at` mirrors the document's own timestamp,
    /// which the caller sets at capture time.
    pub fn save_board(
        &self,
        room_id: &str,
        doc: &BoardDocument,
    ) -> Result<BoardMetadata, StoreError> {
        let cf_boards = self.cf(CF_BOARDS)?;
        let cf_meta = self.cf(CF_META)?;

        let encoded = bincode::serde::encode_to_vec(doc, bincode::config::standard())
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;
        let compressed = lz4_flex::compress_prepend_size(&encoded);

        // Preserve created_at across overwrites
        let mut meta = self.metadata(room_id).unwrap_or_else(|_| BoardMetadata::new());
        meta.stroke_count = doc.strokes.len() as u64;
        meta.snapshot_size = encoded.len() as u64;
        meta.compressed_size = compressed.len() as u64;
        meta.updated_at = doc.updated_at;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_boards, room_id.as_bytes(), &compressed);
        batch.put_cf(&cf_meta, room_id.as_bytes(), &meta.encode()?);

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        self.db.write_opt(batch, &write_opts)?;

        Ok(meta)
    }

    /// Load a board document.
    ///
    /// An empty board that was saved loads as an empty document, which
    /// is distinct from `NotFound` for a room never written at all.
    pub fn load_board(&self, room_id: &str) -> Result<BoardDocument, StoreError> {
        let cf = self.cf(CF_BOARDS)?;

        match self.db.get_cf(&cf, room_id.as_bytes())? {
            Some(compressed) => {
                let encoded = lz4_flex::decompress_size_prepended(&compressed)
                    .map_err(|e| StoreError::CompressionError(e.to_string()))?;
                let (doc, _) =
                    bincode::serde::decode_from_slice(&encoded, bincode::config::standard())
                        .map_err(|e| StoreError::DeserializationError(e.to_string()))?;
                Ok(doc)
            }
            None => Err(StoreError::NotFound(room_id.to_string())),
        }
    }

    /// Check whether a board document exists.
    pub fn board_exists(&self, room_id: &str) -> Result<bool, StoreError> {
        let cf = self.cf(CF_BOARDS)?;
        Ok(self.db.get_cf(&cf, room_id.as_bytes())?.is_some())
    }

    /// List all room ids with a stored board.
    pub fn list_boards(&self) -> Result<Vec<String>, StoreError> {
        let cf = self.cf(CF_BOARDS)?;
        let mut ids = Vec::new();

        let iter = self.db.iterator_cf(&cf, IteratorMode::Start);
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::DatabaseError(e.to_string()))?;
            ids.push(String::from_utf8_lossy(&key).into_owned());
        }

        Ok(ids)
    }

    /// Number of stored boards.
    pub fn board_count(&self) -> Result<usize, StoreError> {
        let cf = self.cf(CF_BOARDS)?;
        let mut count = 0;
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            item.map_err(|e| StoreError::DatabaseError(e.to_string()))?;
            count += 1;
        }
        Ok(count)
    }

    /// Load board metadata.
    pub fn metadata(&self, room_id: &str) -> Result<BoardMetadata, StoreError> {
        let cf = self.cf(CF_META)?;

        match self.db.get_cf(&cf, room_id.as_bytes())? {
            Some(bytes) => BoardMetadata::decode(&bytes),
            None => Err(StoreError::NotFound(room_id.to_string())),
        }
    }

    /// Flush memtables to disk.
    pub fn sync(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    /// Get the database path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily, StoreError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::DatabaseError(format!("Column family '{name}' not found")))
    }
}

/// Get number of CPU cores for RocksDB parallelism.
fn num_cpus() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as i32)
        .unwrap_or(4)
}
