//! Data models for MongoDB status collection.
//!
//! - [`status`]: server and per-database status snapshots
//! - [`attr`]: named attribute access over those snapshots
//! - [`value`]: attribute values and emitted field/tag maps
//!
//! # Architecture
//!
//! ```text
//! StatusLine ──get(StatusAttr)──► AttrValue ──into──► FieldValue ──► Fields
//!   └── db_stats: Vec<DbStatusLine> ──get(DbStatusAttr)──┘
//! ```

mod attr;
mod status;
mod value;

pub use attr::{AttributeSource, DbStatusAttr, StatusAttr};
pub use status::{DbStatusLine, StatusLine, StorageEngine, UNKNOWN_NODE_TYPE};
pub use value::{AttrKind, AttrValue, FieldValue, Fields, Tags};
