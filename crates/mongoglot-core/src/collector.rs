//! One polling cycle: source → metric record → sink.
//!
//! The `Collector` owns a [`StatusSource`] and the base tags for one server.
//! Every cycle gets a fresh [`MetricRecord`] seeded with a copy of the base
//! tags, so per-cycle tags (`state`, `db_name`) never carry over.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::model::Tags;
use crate::record::{DEFAULT_SERVICE, MetricRecord};
use crate::sink::Sink;
use crate::source::{SourceError, StatusSource};

/// Tag carrying the snapshot's host, unless the caller already set one.
pub const HOSTNAME_TAG: &str = "hostname";

/// What a single cycle produced.
#[derive(Debug, Clone, Default)]
pub struct CycleSummary {
    /// Host reported by the snapshot.
    pub host: String,
    /// Server-level fields emitted.
    pub fields: usize,
    /// Per-database records emitted.
    pub databases: usize,
    /// Time spent projecting and emitting.
    pub elapsed: Duration,
}

/// Drives projection cycles for one monitored server.
pub struct Collector<S: StatusSource> {
    source: S,
    service: String,
    tags: Tags,
    last_error: Option<String>,
}

impl<S: StatusSource> Collector<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            service: DEFAULT_SERVICE.to_string(),
            tags: Tags::new(),
            last_error: None,
        }
    }

    /// Sets the measurement name prefix.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Sets tags added to every record.
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Returns the last source error message, if the last cycle failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Runs one cycle: reads a snapshot, projects it and flushes to `sink`.
    ///
    /// On source failure nothing is emitted.
    pub fn collect<K: Sink + ?Sized>(
        &mut self,
        sink: &mut K,
    ) -> Result<CycleSummary, SourceError> {
        let start = Instant::now();

        let status = match self.source.next_status() {
            Ok(status) => status,
            Err(e) => {
                warn!("Status source failed: {}", e);
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };
        self.last_error = None;

        let mut tags = self.tags.clone();
        if !status.host.is_empty() && !tags.contains_key(HOSTNAME_TAG) {
            tags.insert(HOSTNAME_TAG.to_string(), status.host.clone());
        }
        let host = status.host.clone();

        let mut record = MetricRecord::new(status, tags).with_service(&self.service);
        record.project_defaults();
        record.project_databases();

        let fields = record.fields().len();
        let databases = record.db_data().len();
        record.flush(sink);

        let summary = CycleSummary {
            host,
            fields,
            databases,
            elapsed: start.elapsed(),
        };
        debug!(
            "Cycle for {}: {} fields, {} databases in {:?}",
            summary.host, summary.fields, summary.databases, summary.elapsed
        );
        Ok(summary)
    }
}
