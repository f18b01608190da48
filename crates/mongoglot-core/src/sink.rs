//! Output boundary for emitted metric records.
//!
//! A [`Sink`] receives one call per record. Calls are fire-and-forget: sinks
//! that can fail (writers) log the failure and keep going, the caller never
//! sees it.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::model::{FieldValue, Fields, Tags};

/// Receives finished metric records.
pub trait Sink {
    fn add_fields(
        &mut self,
        measurement: &str,
        fields: &Fields,
        tags: &Tags,
        timestamp: DateTime<Utc>,
    );
}

/// One record as seen by a sink.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Emitted {
    pub measurement: String,
    pub tags: Tags,
    pub fields: Fields,
    pub timestamp: DateTime<Utc>,
}

/// Keeps every record in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<Emitted>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Emitted] {
        &self.records
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&mut self) -> Vec<Emitted> {
        std::mem::take(&mut self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Sink for MemorySink {
    fn add_fields(
        &mut self,
        measurement: &str,
        fields: &Fields,
        tags: &Tags,
        timestamp: DateTime<Utc>,
    ) {
        self.records.push(Emitted {
            measurement: measurement.to_string(),
            tags: tags.clone(),
            fields: fields.clone(),
            timestamp,
        });
    }
}

/// Error type for writer-backed sinks.
///
/// Never returned to the caller of [`Sink::add_fields`]; sinks log it and
/// move on to the next record.
#[derive(Debug)]
pub enum SinkError {
    /// Underlying writer failed.
    Io(std::io::Error),
    /// Record could not be serialized.
    Serialize(serde_json::Error),
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Io(e) => write!(f, "write failed: {}", e),
            SinkError::Serialize(e) => write!(f, "serialization failed: {}", e),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SinkError::Io(e) => Some(e),
            SinkError::Serialize(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for SinkError {
    fn from(e: std::io::Error) -> Self {
        SinkError::Io(e)
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            SinkError::Io(e.into())
        } else {
            SinkError::Serialize(e)
        }
    }
}

/// Writes one JSON object per record, newline-delimited.
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_record(&mut self, record: &JsonRecord<'_>) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    measurement: &'a str,
    tags: &'a Tags,
    fields: &'a Fields,
    timestamp: DateTime<Utc>,
}

impl<W: Write> Sink for JsonSink<W> {
    fn add_fields(
        &mut self,
        measurement: &str,
        fields: &Fields,
        tags: &Tags,
        timestamp: DateTime<Utc>,
    ) {
        let record = JsonRecord {
            measurement,
            tags,
            fields,
            timestamp,
        };
        if let Err(e) = self.write_record(&record) {
            warn!("JSON sink: {} for {}", e, measurement);
        }
    }
}

/// Writes InfluxDB line protocol:
/// `measurement,tag=value field=value timestamp_ns`.
///
/// Tags and fields are written in key order. Non-finite float fields are
/// dropped, and records left without fields are skipped since the protocol
/// cannot express them.
pub struct LineSink<W: Write> {
    writer: W,
}

impl<W: Write> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, line: &str) -> Result<(), SinkError> {
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> Sink for LineSink<W> {
    fn add_fields(
        &mut self,
        measurement: &str,
        fields: &Fields,
        tags: &Tags,
        timestamp: DateTime<Utc>,
    ) {
        let Some(line) = format_line(measurement, fields, tags, timestamp) else {
            debug!("Line sink: skipping {} with no writable fields", measurement);
            return;
        };
        if let Err(e) = self.write_line(&line) {
            warn!("Line sink: {} for {}", e, measurement);
        }
    }
}

/// Formats one line-protocol record (without trailing newline).
///
/// Returns `None` when no field survives: the record is empty or every
/// field is a NaN/infinite float.
pub fn format_line(
    measurement: &str,
    fields: &Fields,
    tags: &Tags,
    timestamp: DateTime<Utc>,
) -> Option<String> {
    let fields = fields
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                FieldValue::Float(v) if !v.is_finite() => {
                    debug!("Line sink: dropping non-finite field {}={}", key, v);
                    return None;
                }
                FieldValue::Float(_) => value.to_string(),
                FieldValue::Str(s) => format!("\"{}\"", escape(s, &['"'])),
            };
            Some(format!("{}={}", escape(key, &[',', '=', ' ']), value))
        })
        .collect::<Vec<_>>();
    if fields.is_empty() {
        return None;
    }

    let mut line = escape(measurement, &[',', ' ']);
    for (key, value) in tags {
        if value.is_empty() {
            continue;
        }
        line.push(',');
        line.push_str(&escape(key, &[',', '=', ' ']));
        line.push('=');
        line.push_str(&escape(value, &[',', '=', ' ']));
    }
    line.push(' ');
    line.push_str(&fields.join(","));

    if let Some(ns) = timestamp.timestamp_nanos_opt() {
        line.push(' ');
        line.push_str(&ns.to_string());
    }
    Some(line)
}

/// Backslash-escapes `special` characters and backslashes; line breaks
/// become `\n` / `\r` so a record always stays on one line.
fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if c == '\\' || special.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn sample() -> (Fields, Tags) {
        let mut fields = Fields::new();
        fields.insert("inserts_per_sec".to_string(), FieldValue::Float(10.0));
        fields.insert("member_status".to_string(), FieldValue::from("PRI"));
        let mut tags = Tags::new();
        tags.insert("hostname".to_string(), "db1:27017".to_string());
        tags.insert("state".to_string(), "PRI".to_string());
        (fields, tags)
    }

    #[test]
    fn memory_sink_keeps_order() {
        let (fields, tags) = sample();
        let mut sink = MemorySink::new();
        sink.add_fields("mongodb", &fields, &tags, ts());
        sink.add_fields("mongodb_db_stats", &Fields::new(), &tags, ts());

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.records()[0].measurement, "mongodb");
        assert_eq!(sink.records()[1].measurement, "mongodb_db_stats");

        let taken = sink.take();
        assert_eq!(taken.len(), 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn json_sink_writes_one_object_per_line() {
        let (fields, tags) = sample();
        let mut sink = JsonSink::new(Vec::new());
        sink.add_fields("mongodb", &fields, &tags, ts());
        sink.add_fields("mongodb", &fields, &tags, ts());

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["measurement"], "mongodb");
        assert_eq!(value["tags"]["state"], "PRI");
        assert_eq!(value["fields"]["inserts_per_sec"], 10.0);
        assert_eq!(value["fields"]["member_status"], "PRI");
        assert_eq!(value["timestamp"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn line_protocol_format() {
        let (fields, tags) = sample();
        let line = format_line("mongodb", &fields, &tags, ts()).unwrap();
        assert_eq!(
            line,
            "mongodb,hostname=db1:27017,state=PRI \
             inserts_per_sec=10,member_status=\"PRI\" 1714564800000000000"
        );
    }

    #[test]
    fn line_protocol_escapes_special_characters() {
        let mut fields = Fields::new();
        fields.insert("non-mapped megabytes".to_string(), FieldValue::Float(1.5));
        fields.insert("note".to_string(), FieldValue::from("say \"hi\""));
        let mut tags = Tags::new();
        tags.insert("db_name".to_string(), "my db,prod".to_string());
        tags.insert("empty".to_string(), String::new());

        let line = format_line("mongodb stats", &fields, &tags, ts()).unwrap();
        assert!(line.starts_with("mongodb\\ stats,db_name=my\\ db\\,prod "));
        assert!(line.contains("non-mapped\\ megabytes=1.5"));
        assert!(line.contains("note=\"say \\\"hi\\\"\""));
        assert!(!line.contains("empty"));
    }

    #[test]
    fn line_sink_skips_records_without_fields() {
        let (_, tags) = sample();
        let mut sink = LineSink::new(Vec::new());
        sink.add_fields("mongodb_db_stats", &Fields::new(), &tags, ts());
        assert!(sink.into_inner().is_empty());
    }

    #[test]
    fn line_protocol_escapes_newlines() {
        let mut fields = Fields::new();
        fields.insert("note".to_string(), FieldValue::from("first\nsecond\r"));
        let mut tags = Tags::new();
        tags.insert("db_name".to_string(), "a\nb".to_string());

        let line = format_line("mongodb", &fields, &tags, ts()).unwrap();
        assert!(!line.contains('\n'));
        assert!(!line.contains('\r'));
        assert!(line.contains("db_name=a\\nb "));
        assert!(line.contains("note=\"first\\nsecond\\r\""));

        let mut sink = LineSink::new(Vec::new());
        sink.add_fields("mongodb", &fields, &tags, ts());
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn line_protocol_drops_non_finite_floats() {
        let mut fields = Fields::new();
        fields.insert("a_nan".to_string(), FieldValue::Float(f64::NAN));
        fields.insert("b_inf".to_string(), FieldValue::Float(f64::INFINITY));
        fields.insert("c_neg_inf".to_string(), FieldValue::Float(f64::NEG_INFINITY));
        fields.insert("d_ok".to_string(), FieldValue::Float(0.5));
        let tags = Tags::new();

        let line = format_line("mongodb", &fields, &tags, ts()).unwrap();
        assert_eq!(line, "mongodb d_ok=0.5 1714564800000000000");

        fields.remove("d_ok");
        assert_eq!(format_line("mongodb", &fields, &tags, ts()), None);

        let mut sink = LineSink::new(Vec::new());
        sink.add_fields("mongodb", &fields, &tags, ts());
        assert!(sink.into_inner().is_empty());
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn json_sink_reports_io_errors_as_sink_error() {
        let (fields, tags) = sample();
        let mut sink = JsonSink::new(BrokenWriter);
        let record = JsonRecord {
            measurement: "mongodb",
            tags: &tags,
            fields: &fields,
            timestamp: ts(),
        };
        let err = sink.write_record(&record).unwrap_err();
        assert!(matches!(err, SinkError::Io(_)));
        assert!(err.to_string().starts_with("write failed: "));
        assert!(std::error::Error::source(&err).is_some());

        // add_fields logs and carries on
        sink.add_fields("mongodb", &fields, &tags, ts());
        sink.add_fields("mongodb", &fields, &tags, ts());
    }

    #[test]
    fn line_sink_reports_io_errors_as_sink_error() {
        let (fields, tags) = sample();
        let mut sink = LineSink::new(BrokenWriter);
        let err = sink.write_line("mongodb x=1").unwrap_err();
        assert!(matches!(err, SinkError::Io(ref e) if e.kind() == std::io::ErrorKind::BrokenPipe));

        sink.add_fields("mongodb", &fields, &tags, ts());
    }

    #[test]
    fn sink_error_display() {
        let io = SinkError::from(std::io::Error::other("disk full"));
        assert_eq!(io.to_string(), "write failed: disk full");

        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let ser = SinkError::from(parse);
        assert!(matches!(ser, SinkError::Serialize(_)));
        assert!(ser.to_string().starts_with("serialization failed: "));
    }
}
