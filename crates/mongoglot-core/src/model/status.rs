//! MongoDB status snapshots.
//!
//! A `StatusLine` is one point-in-time reading of a server's `serverStatus`
//! counters, already turned into per-second rates and gauges by whatever
//! acquired it. `DbStatusLine` is the matching `dbStats` reading for a single
//! database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Node type reported when replica set membership could not be determined.
pub const UNKNOWN_NODE_TYPE: &str = "UNK";

/// Server status snapshot for one polling cycle.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct StatusLine {
    /// Host the snapshot was taken from.
    pub host: String,

    /// Time the snapshot was taken.
    pub time: DateTime<Utc>,

    /// Storage engine name: `mmapv1`, `wiredTiger`, or anything else.
    pub storage_engine: String,

    /// Replica set member state ("PRI", "SEC", "ARB", ...).
    /// Empty for standalone servers, `UNK` if unknown.
    pub node_type: String,

    // Operation rates (per second).
    pub insert: i64,
    pub query: i64,
    pub update: i64,
    pub delete: i64,
    pub get_more: i64,
    pub command: i64,

    /// Data file flushes per second.
    pub flushes: i64,

    /// Virtual memory size (MB).
    pub virtual_mb: i64,
    /// Resident memory size (MB).
    pub resident_mb: i64,

    // Global lock queue and active client counts.
    pub queued_readers: i64,
    pub queued_writers: i64,
    pub active_readers: i64,
    pub active_writers: i64,

    /// Network bytes in/out per second.
    pub net_in: i64,
    pub net_out: i64,

    /// Open client connections.
    pub num_connections: i64,

    /// Documents deleted by the TTL monitor per second.
    pub deleted_documents: i64,
    /// TTL monitor passes per second.
    pub passes: i64,

    // Replicated operation rates (per second).
    pub insert_r: i64,
    pub query_r: i64,
    pub update_r: i64,
    pub delete_r: i64,
    pub get_more_r: i64,
    pub command_r: i64,

    /// Replication lag behind the primary (seconds).
    pub repl_lag: i64,

    /// Jumbo chunks in the cluster (mongos only, 0 elsewhere).
    pub jumbo_chunks_count: i64,

    // mmapv1 only.
    /// Mapped memory (MB).
    pub mapped_mb: i64,
    /// Non-mapped memory (MB).
    pub non_mapped_mb: i64,
    /// Page faults per second.
    pub faults: i64,

    // wiredTiger only, ratios in [0, 1].
    pub cache_dirty_percent: f64,
    pub cache_used_percent: f64,

    /// Per-database snapshots, in collection order.
    pub db_stats: Vec<DbStatusLine>,
}

/// Per-database snapshot (`dbStats`).
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
#[serde(default)]
pub struct DbStatusLine {
    /// Database name.
    pub name: String,
    pub collections: i64,
    pub objects: i64,
    /// Average document size (bytes).
    pub avg_obj_size: f64,
    /// Uncompressed data size (bytes).
    pub data_size: i64,
    /// Allocated storage (bytes).
    pub storage_size: i64,
    /// Extent count (mmapv1; 0 elsewhere).
    pub num_extents: i64,
    pub indexes: i64,
    /// Total index size (bytes).
    pub index_size: i64,
    /// `dbStats` command status, 1 on success.
    pub ok: i64,
}

/// Storage engines with engine-specific metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageEngine {
    MmapV1,
    WiredTiger,
    Other,
}

impl StorageEngine {
    /// Maps a reported engine name. Matching is exact: `wiredtiger` is `Other`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "mmapv1" => StorageEngine::MmapV1,
            "wiredTiger" => StorageEngine::WiredTiger,
            _ => StorageEngine::Other,
        }
    }
}

impl StatusLine {
    /// Node type, if the server reported any (including `UNK`).
    pub fn node_type(&self) -> Option<&str> {
        (!self.node_type.is_empty()).then_some(self.node_type.as_str())
    }

    /// Replica set member state, if known.
    pub fn member_state(&self) -> Option<&str> {
        self.node_type().filter(|t| *t != UNKNOWN_NODE_TYPE)
    }

    pub fn engine(&self) -> StorageEngine {
        StorageEngine::from_name(&self.storage_engine)
    }
}
