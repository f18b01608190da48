//! mongoglot-core — MongoDB status projection library.
//!
//! Provides:
//! - `model` — status snapshots, attribute accessors, field/tag values
//! - `projection` — static metric tables and inclusion predicates
//! - `record` — per-cycle metric record builder and flush
//! - `sink` — output boundary (in-memory, JSON lines, line protocol)
//! - `source` — status snapshot sources (file, mock scenarios)
//! - `collector` — one polling cycle: source → record → sink
//! - `fmt` — numeric display helpers

pub mod collector;
pub mod fmt;
pub mod model;
pub mod projection;
pub mod record;
pub mod sink;
pub mod source;

pub use collector::{Collector, CycleSummary};
pub use model::{DbStatusLine, StatusLine};
pub use record::{DatabaseMetric, MetricRecord};
pub use sink::Sink;
