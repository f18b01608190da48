//! Per-cycle metric record.
//!
//! `MetricRecord` turns one [`StatusLine`] into flat field maps using the
//! tables in [`crate::projection`], then hands them to a [`Sink`]:
//!
//! ```text
//! project_defaults()   ── server fields (default, repl, cluster, engine)
//! project_databases()  ── one DatabaseMetric per db_stats entry
//! flush(sink)          ── "<service>" record, then "<service>_db_stats" per db
//! ```
//!
//! A record owns its tags. `flush` writes `db_name` into them for each
//! database record and leaves the last one in place; callers reusing a tag
//! map across cycles should seed a fresh one per record.

use tracing::{debug, warn};

use crate::fmt::ratio_to_percent;
use crate::model::{AttributeSource, Fields, StatusLine, Tags};
use crate::projection::{
    self, CLUSTER_STATS, DB_STATS, DEFAULT_STATS, MMAP_STATS, Projection, REPL_STATS,
    WIRED_TIGER_STATS,
};
use crate::sink::Sink;

/// Default measurement name for server-level records.
pub const DEFAULT_SERVICE: &str = "mongodb";

/// Appended to the service name for per-database records.
pub const DB_STATS_SUFFIX: &str = "_db_stats";

/// Value of the `type` field on every per-database record.
pub const DB_STAT_TYPE: &str = "db_stat";

/// Tag holding the replica set member state.
pub const STATE_TAG: &str = "state";

/// Tag holding the database name on per-database records.
pub const DB_NAME_TAG: &str = "db_name";

/// Fields of one database, ready for emission.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct DatabaseMetric {
    pub name: String,
    pub fields: Fields,
}

/// Metric state for one server and one polling cycle.
pub struct MetricRecord {
    status: StatusLine,
    service: String,
    fields: Fields,
    tags: Tags,
    db_data: Vec<DatabaseMetric>,
}

impl MetricRecord {
    /// Creates a record for `status`, seeded with caller tags.
    ///
    /// Adds the `state` tag when the server reports a known member state.
    pub fn new(status: StatusLine, mut tags: Tags) -> Self {
        if let Some(state) = status.member_state() {
            tags.insert(STATE_TAG.to_string(), state.to_string());
        }
        Self {
            status,
            service: DEFAULT_SERVICE.to_string(),
            fields: Fields::new(),
            tags,
            db_data: Vec::new(),
        }
    }

    /// Overrides the measurement name prefix (default `mongodb`).
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Server-level fields accumulated since the last flush.
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn db_data(&self) -> &[DatabaseMetric] {
        &self.db_data
    }

    /// Projects server-level stats into the field map.
    ///
    /// Default and cluster stats are always included, replica stats only for
    /// replica set members, and engine stats only for mmapv1 or wiredTiger.
    pub fn project_defaults(&mut self) {
        project(&mut self.fields, &self.status, DEFAULT_STATS);
        if projection::includes_repl_stats(&self.status) {
            project(&mut self.fields, &self.status, REPL_STATS);
        }
        project(&mut self.fields, &self.status, CLUSTER_STATS);

        if projection::includes_mmap_stats(&self.status) {
            project(&mut self.fields, &self.status, MMAP_STATS);
        } else if projection::includes_wired_tiger_stats(&self.status) {
            for &(metric, attr) in WIRED_TIGER_STATS {
                let Some(ratio) = self.status.attribute(attr).as_f64() else {
                    panic!("{} maps to non-numeric attribute {}", metric, attr);
                };
                self.fields
                    .insert(metric.to_string(), ratio_to_percent(ratio).into());
            }
        } else {
            warn!(
                "No engine stats for storage engine {:?}",
                self.status.storage_engine
            );
        }

        debug!(
            "Projected {} server fields (node_type={:?}, engine={:?})",
            self.fields.len(),
            self.status.node_type,
            self.status.storage_engine
        );
    }

    /// Builds one [`DatabaseMetric`] per database snapshot, in snapshot order.
    ///
    /// Appends to any databases already projected; call once per record.
    pub fn project_databases(&mut self) {
        for db in &self.status.db_stats {
            let mut fields = Fields::new();
            fields.insert("type".to_string(), DB_STAT_TYPE.into());
            project(&mut fields, db, DB_STATS);
            self.db_data.push(DatabaseMetric {
                name: db.name.clone(),
                fields,
            });
        }
        debug!("Projected {} databases", self.status.db_stats.len());
    }

    /// Emits the server record, clears server fields, then emits one record
    /// per database.
    ///
    /// Database fields are kept, so flushing again re-emits the same database
    /// records. The `db_name` tag is left at the last database emitted.
    pub fn flush<S: Sink + ?Sized>(&mut self, sink: &mut S) {
        let timestamp = self.status.time;
        sink.add_fields(&self.service, &self.fields, &self.tags, timestamp);
        self.fields.clear();

        let measurement = format!("{}{}", self.service, DB_STATS_SUFFIX);
        for db in &self.db_data {
            self.tags.insert(DB_NAME_TAG.to_string(), db.name.clone());
            sink.add_fields(&measurement, &db.fields, &self.tags, timestamp);
        }
    }
}

fn project<R: AttributeSource>(fields: &mut Fields, record: &R, table: Projection<R::Attr>) {
    for &(metric, attr) in table {
        fields.insert(metric.to_string(), record.attribute(attr).into());
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::model::{DbStatusLine, FieldValue, UNKNOWN_NODE_TYPE};
    use crate::sink::MemorySink;

    fn keys<A>(table: Projection<A>) -> impl Iterator<Item = &'static str> {
        table.iter().map(|(name, _)| *name)
    }

    fn projected(status: StatusLine) -> MetricRecord {
        let mut record = MetricRecord::new(status, Tags::new());
        record.project_defaults();
        record
    }

    #[test]
    fn standalone_has_no_repl_stats_or_state() {
        for node_type in ["", UNKNOWN_NODE_TYPE] {
            let record = projected(StatusLine {
                node_type: node_type.to_string(),
                ..StatusLine::mmap_standalone()
            });
            for key in keys(REPL_STATS) {
                assert!(!record.fields().contains_key(key), "{key}");
            }
            assert!(!record.tags().contains_key(STATE_TAG));
        }
    }

    #[test]
    fn replica_member_has_repl_stats_and_state() {
        let record = projected(StatusLine::wired_tiger_primary());
        for key in keys(REPL_STATS) {
            assert!(record.fields().contains_key(key), "{key}");
        }
        assert_eq!(
            record.fields()["member_status"],
            FieldValue::Str("PRI".to_string())
        );
        assert_eq!(record.fields()["repl_lag"], FieldValue::Float(0.0));
        assert_eq!(record.tags()[STATE_TAG], "PRI");
    }

    #[test]
    fn mmap_engine_gets_mmap_stats_only() {
        let record = projected(StatusLine::mmap_standalone());
        for key in keys(MMAP_STATS) {
            assert!(record.fields().contains_key(key), "{key}");
        }
        for key in keys(WIRED_TIGER_STATS) {
            assert!(!record.fields().contains_key(key), "{key}");
        }
        assert_eq!(record.fields()["page_faults_per_sec"], FieldValue::Float(3.0));
    }

    #[test]
    fn wired_tiger_engine_gets_percentages_only() {
        let record = projected(StatusLine {
            cache_dirty_percent: 0.12345,
            cache_used_percent: 0.005,
            ..StatusLine::wired_tiger_primary()
        });
        for key in keys(MMAP_STATS) {
            assert!(!record.fields().contains_key(key), "{key}");
        }
        assert_eq!(record.fields()["percent_cache_dirty"], FieldValue::Float(12.3));
        assert_eq!(record.fields()["percent_cache_used"], FieldValue::Float(0.5));
    }

    #[test]
    fn unknown_engine_gets_no_engine_stats() {
        let record = projected(StatusLine::unknown_engine());
        for key in keys(MMAP_STATS).chain(keys(WIRED_TIGER_STATS)) {
            assert!(!record.fields().contains_key(key), "{key}");
        }
        let expected = DEFAULT_STATS.len() + CLUSTER_STATS.len();
        assert_eq!(record.fields().len(), expected);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn unknown_engine_is_logged_as_warning() {
        let buf = LogBuffer::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            projected(StatusLine::unknown_engine());
        });

        let logs = buf.contents();
        assert!(logs.contains("WARN"), "{logs}");
        assert!(
            logs.contains("No engine stats for storage engine \"inMemory\""),
            "{logs}"
        );
    }

    #[test]
    fn field_count_matches_applicable_tables() {
        let record = projected(StatusLine::wired_tiger_primary());
        let expected = DEFAULT_STATS.len()
            + REPL_STATS.len()
            + CLUSTER_STATS.len()
            + WIRED_TIGER_STATS.len();
        assert_eq!(record.fields().len(), expected);
    }

    #[test]
    fn databases_follow_snapshot_order() {
        let mut record = MetricRecord::new(StatusLine::wired_tiger_primary(), Tags::new());
        record.project_databases();

        let names: Vec<&str> = record.db_data().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["admin", "app", "local"]);
        for db in record.db_data() {
            assert_eq!(db.fields["type"], FieldValue::from("db_stat"));
            assert_eq!(db.fields.len(), DB_STATS.len() + 1);
        }
        assert_eq!(record.db_data()[1].fields["objects"], FieldValue::Float(500.0));
    }

    #[test]
    fn project_databases_appends_on_repeat() {
        let mut record = MetricRecord::new(StatusLine::wired_tiger_primary(), Tags::new());
        record.project_databases();
        record.project_databases();
        assert_eq!(record.db_data().len(), 6);
    }

    #[test]
    fn no_databases_means_no_db_records() {
        let mut record = MetricRecord::new(StatusLine::unknown_engine(), Tags::new());
        record.project_defaults();
        record.project_databases();

        let mut sink = MemorySink::new();
        record.flush(&mut sink);
        assert_eq!(sink.len(), 1);
        assert!(!record.tags().contains_key(DB_NAME_TAG));
    }

    #[test]
    fn flush_emits_server_then_databases() {
        let mut tags = Tags::new();
        tags.insert("hostname".to_string(), "db1:27017".to_string());
        let status = StatusLine::wired_tiger_primary();
        let time = status.time;
        let mut record = MetricRecord::new(status, tags);
        record.project_defaults();
        record.project_databases();

        let mut sink = MemorySink::new();
        record.flush(&mut sink);

        let records = sink.records();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].measurement, "mongodb");
        assert!(!records[0].tags.contains_key(DB_NAME_TAG));
        assert_eq!(records[0].tags["hostname"], "db1:27017");
        for (emitted, name) in records[1..].iter().zip(["admin", "app", "local"]) {
            assert_eq!(emitted.measurement, "mongodb_db_stats");
            assert_eq!(emitted.tags[DB_NAME_TAG], name);
            assert_eq!(emitted.tags[STATE_TAG], "PRI");
            assert_eq!(emitted.timestamp, time);
        }

        assert!(record.fields().is_empty());
        assert_eq!(record.tags()[DB_NAME_TAG], "local");
    }

    #[test]
    fn repeated_cycle_reproduces_output() {
        let mut record = MetricRecord::new(StatusLine::wired_tiger_primary(), Tags::new());
        record.project_defaults();
        record.project_databases();
        let mut first = MemorySink::new();
        record.flush(&mut first);

        record.project_defaults();
        let mut second = MemorySink::new();
        record.flush(&mut second);

        assert_eq!(first.records()[0].fields, second.records()[0].fields);
        assert_eq!(first.records()[1..], second.records()[1..]);

        // db_name from the previous flush is still in the shared tags.
        assert!(!first.records()[0].tags.contains_key(DB_NAME_TAG));
        assert_eq!(second.records()[0].tags[DB_NAME_TAG], "local");
    }

    #[test]
    fn custom_service_prefixes_both_measurements() {
        let mut record =
            MetricRecord::new(StatusLine::wired_tiger_primary(), Tags::new()).with_service("mongo");
        record.project_defaults();
        record.project_databases();

        let mut sink = MemorySink::new();
        record.flush(&mut sink);
        assert_eq!(sink.records()[0].measurement, "mongo");
        assert_eq!(sink.records()[1].measurement, "mongo_db_stats");
    }

    #[test]
    fn end_to_end_wired_tiger_standalone() {
        let status = StatusLine {
            insert: 10,
            node_type: String::new(),
            storage_engine: "wiredTiger".to_string(),
            cache_dirty_percent: 0.2,
            db_stats: vec![DbStatusLine {
                name: "app".to_string(),
                objects: 500,
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut record = MetricRecord::new(status, Tags::new());
        record.project_defaults();
        record.project_databases();

        let mut sink = MemorySink::new();
        record.flush(&mut sink);

        let records = sink.records();
        assert_eq!(records.len(), 2);

        let server = &records[0];
        assert_eq!(server.measurement, "mongodb");
        assert_eq!(server.fields["inserts_per_sec"], FieldValue::Float(10.0));
        assert_eq!(server.fields["percent_cache_dirty"], FieldValue::Float(20.0));
        assert!(!server.tags.contains_key(STATE_TAG));

        let db = &records[1];
        assert_eq!(db.measurement, "mongodb_db_stats");
        assert_eq!(db.tags[DB_NAME_TAG], "app");
        assert_eq!(db.fields["objects"], FieldValue::Float(500.0));
    }
}
