//! Pre-built status snapshots for testing.
//!
//! These scenarios provide realistic server states for the projection
//! branches: replica set member on wiredTiger, standalone on mmapv1, and a
//! server on an engine without engine-specific metrics.

use chrono::{DateTime, Utc};

use crate::model::{DbStatusLine, StatusLine};

/// Scenario names accepted by [`StatusLine::scenario`].
pub const SCENARIOS: &[&str] = &["wired-tiger-primary", "mmap-standalone", "unknown-engine"];

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

impl StatusLine {
    /// Looks up a scenario by name.
    pub fn scenario(name: &str) -> Option<Self> {
        match name {
            "wired-tiger-primary" => Some(Self::wired_tiger_primary()),
            "mmap-standalone" => Some(Self::mmap_standalone()),
            "unknown-engine" => Some(Self::unknown_engine()),
            _ => None,
        }
    }

    /// Primary of a replica set on wiredTiger with three databases.
    pub fn wired_tiger_primary() -> Self {
        Self {
            host: "db1.example.net:27017".to_string(),
            time: at(1_714_564_800),
            storage_engine: "wiredTiger".to_string(),
            node_type: "PRI".to_string(),
            insert: 120,
            query: 950,
            update: 80,
            delete: 4,
            get_more: 35,
            command: 410,
            flushes: 0,
            virtual_mb: 2048,
            resident_mb: 1024,
            queued_readers: 1,
            queued_writers: 0,
            active_readers: 3,
            active_writers: 1,
            net_in: 524_288,
            net_out: 2_097_152,
            num_connections: 57,
            deleted_documents: 12,
            passes: 1,
            insert_r: 0,
            query_r: 0,
            update_r: 0,
            delete_r: 0,
            get_more_r: 0,
            command_r: 0,
            repl_lag: 0,
            jumbo_chunks_count: 0,
            mapped_mb: 0,
            non_mapped_mb: 0,
            faults: 0,
            cache_dirty_percent: 0.0312,
            cache_used_percent: 0.7854,
            db_stats: vec![
                DbStatusLine {
                    name: "admin".to_string(),
                    collections: 3,
                    objects: 12,
                    avg_obj_size: 221.5,
                    data_size: 2658,
                    storage_size: 77_824,
                    num_extents: 0,
                    indexes: 4,
                    index_size: 110_592,
                    ok: 1,
                },
                DbStatusLine {
                    name: "app".to_string(),
                    collections: 14,
                    objects: 500,
                    avg_obj_size: 1024.0,
                    data_size: 512_000,
                    storage_size: 1_048_576,
                    num_extents: 0,
                    indexes: 22,
                    index_size: 393_216,
                    ok: 1,
                },
                DbStatusLine {
                    name: "local".to_string(),
                    collections: 7,
                    objects: 40_211,
                    avg_obj_size: 310.2,
                    data_size: 12_473_452,
                    storage_size: 4_194_304,
                    num_extents: 0,
                    indexes: 5,
                    index_size: 163_840,
                    ok: 1,
                },
            ],
        }
    }

    /// Standalone mmapv1 server with one database.
    pub fn mmap_standalone() -> Self {
        Self {
            host: "legacy.example.net:27017".to_string(),
            time: at(1_714_564_810),
            storage_engine: "mmapv1".to_string(),
            node_type: String::new(),
            insert: 15,
            query: 60,
            update: 9,
            delete: 1,
            get_more: 2,
            command: 44,
            flushes: 1,
            virtual_mb: 8192,
            resident_mb: 512,
            num_connections: 12,
            mapped_mb: 4096,
            non_mapped_mb: 96,
            faults: 3,
            db_stats: vec![DbStatusLine {
                name: "legacy".to_string(),
                collections: 5,
                objects: 9_800,
                avg_obj_size: 480.0,
                data_size: 4_704_000,
                storage_size: 8_380_416,
                num_extents: 18,
                indexes: 9,
                index_size: 1_226_400,
                ok: 1,
            }],
            ..Default::default()
        }
    }

    /// Server on an engine with no engine-specific metrics, no databases.
    pub fn unknown_engine() -> Self {
        Self {
            host: "mem.example.net:27017".to_string(),
            time: at(1_714_564_820),
            storage_engine: "inMemory".to_string(),
            node_type: String::new(),
            insert: 3,
            query: 17,
            num_connections: 4,
            cache_dirty_percent: 0.5,
            mapped_mb: 64,
            ..Default::default()
        }
    }
}
