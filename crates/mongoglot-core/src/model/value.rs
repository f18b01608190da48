//! Attribute values read from snapshots and the field/tag maps handed to sinks.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metric name → value, as handed to a sink.
pub type Fields = BTreeMap<String, FieldValue>;

/// Tag name → tag value, as handed to a sink.
pub type Tags = BTreeMap<String, String>;

/// Kind of a raw snapshot attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrKind {
    Int,
    Float,
    Str,
    Time,
}

/// Raw attribute value read from a snapshot.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Str(String),
    Time(DateTime<Utc>),
}

impl AttrValue {
    pub fn kind(&self) -> AttrKind {
        match self {
            AttrValue::Int(_) => AttrKind::Int,
            AttrValue::Float(_) => AttrKind::Float,
            AttrValue::Str(_) => AttrKind::Str,
            AttrValue::Time(_) => AttrKind::Time,
        }
    }

    /// Numeric view of the value. `None` for strings and timestamps.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Float(v) => Some(*v),
            AttrValue::Str(_) | AttrValue::Time(_) => None,
        }
    }
}

/// Value of an emitted metric field.
///
/// Counters and gauges are carried as `f64` regardless of their raw kind,
/// which is what downstream sinks expect.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Float(f64),
    Str(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Float(_) => None,
            FieldValue::Str(s) => Some(s),
        }
    }
}

impl From<AttrValue> for FieldValue {
    fn from(value: AttrValue) -> Self {
        match value {
            AttrValue::Int(v) => FieldValue::Float(v as f64),
            AttrValue::Float(v) => FieldValue::Float(v),
            AttrValue::Str(s) => FieldValue::Str(s),
            AttrValue::Time(t) => FieldValue::Str(t.to_rfc3339()),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Str(s) => write!(f, "{}", s),
        }
    }
}
