//! Metric projection tables.
//!
//! Each table maps a public metric name to the snapshot attribute it is read
//! from. Which tables apply to a given snapshot is decided by the predicates
//! at the bottom of this module; adding a metric is a table edit only.

use crate::model::{DbStatusAttr, StatusAttr, StatusLine, StorageEngine};

/// Public metric name → snapshot attribute.
pub type Projection<A> = &'static [(&'static str, A)];

/// Always emitted.
pub const DEFAULT_STATS: Projection<StatusAttr> = &[
    ("inserts_per_sec", StatusAttr::Insert),
    ("queries_per_sec", StatusAttr::Query),
    ("updates_per_sec", StatusAttr::Update),
    ("deletes_per_sec", StatusAttr::Delete),
    ("getmores_per_sec", StatusAttr::GetMore),
    ("commands_per_sec", StatusAttr::Command),
    ("flushes_per_sec", StatusAttr::Flushes),
    ("vsize_megabytes", StatusAttr::Virtual),
    ("resident_megabytes", StatusAttr::Resident),
    ("queued_reads", StatusAttr::QueuedReaders),
    ("queued_writes", StatusAttr::QueuedWriters),
    ("active_reads", StatusAttr::ActiveReaders),
    ("active_writes", StatusAttr::ActiveWriters),
    ("net_in_bytes", StatusAttr::NetIn),
    ("net_out_bytes", StatusAttr::NetOut),
    ("open_connections", StatusAttr::NumConnections),
    ("ttl_deletes_per_sec", StatusAttr::DeletedDocuments),
    ("ttl_passes_per_sec", StatusAttr::Passes),
];

/// Emitted for replica set members.
pub const REPL_STATS: Projection<StatusAttr> = &[
    ("repl_inserts_per_sec", StatusAttr::InsertR),
    ("repl_queries_per_sec", StatusAttr::QueryR),
    ("repl_updates_per_sec", StatusAttr::UpdateR),
    ("repl_deletes_per_sec", StatusAttr::DeleteR),
    ("repl_getmores_per_sec", StatusAttr::GetMoreR),
    ("repl_commands_per_sec", StatusAttr::CommandR),
    ("member_status", StatusAttr::NodeType),
    ("repl_lag", StatusAttr::ReplLag),
];

/// Always emitted (zero outside sharded clusters).
pub const CLUSTER_STATS: Projection<StatusAttr> =
    &[("jumbo_chunks", StatusAttr::JumboChunksCount)];

/// Emitted for the mmapv1 storage engine.
pub const MMAP_STATS: Projection<StatusAttr> = &[
    ("mapped_megabytes", StatusAttr::Mapped),
    ("non-mapped_megabytes", StatusAttr::NonMapped),
    ("page_faults_per_sec", StatusAttr::Faults),
];

/// Emitted for the wiredTiger storage engine.
/// Source attributes are ratios in [0, 1]; emitted as percentages.
pub const WIRED_TIGER_STATS: Projection<StatusAttr> = &[
    ("percent_cache_dirty", StatusAttr::CacheDirtyPercent),
    ("percent_cache_used", StatusAttr::CacheUsedPercent),
];

/// Emitted once per database.
pub const DB_STATS: Projection<DbStatusAttr> = &[
    ("collections", DbStatusAttr::Collections),
    ("objects", DbStatusAttr::Objects),
    ("avg_obj_size", DbStatusAttr::AvgObjSize),
    ("data_size", DbStatusAttr::DataSize),
    ("storage_size", DbStatusAttr::StorageSize),
    ("num_extents", DbStatusAttr::NumExtents),
    ("indexes", DbStatusAttr::Indexes),
    ("index_size", DbStatusAttr::IndexSize),
    ("ok", DbStatusAttr::Ok),
];

/// Replica stats apply when the server reports a known member state.
pub fn includes_repl_stats(status: &StatusLine) -> bool {
    status.member_state().is_some()
}

pub fn includes_mmap_stats(status: &StatusLine) -> bool {
    status.engine() == StorageEngine::MmapV1
}

pub fn includes_wired_tiger_stats(status: &StatusLine) -> bool {
    status.engine() == StorageEngine::WiredTiger
}
