//! Named attribute access over status snapshots.
//!
//! Projection tables refer to snapshot attributes through these enums, so a
//! table entry naming an attribute that a snapshot does not carry fails to
//! compile. Textual names (`"Insert"`, `"CacheDirtyPercent"`, ...) are kept for
//! lookups driven by configuration or diagnostics.

use std::fmt;

use super::status::{DbStatusLine, StatusLine};
use super::value::AttrValue;

/// A snapshot type whose attributes can be read by name.
pub trait AttributeSource {
    type Attr: Copy + fmt::Debug;

    /// Reads one attribute. Never fails: every variant of `Attr` is backed by a field.
    fn attribute(&self, attr: Self::Attr) -> AttrValue;
}

macro_rules! attributes {
    (
        $(#[$meta:meta])*
        $name:ident for $record:ty {
            $($variant:ident => $text:literal => |$r:ident| $get:expr,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Every attribute, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Attribute name as used in snapshot schemas.
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Looks up an attribute by its schema name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl AttributeSource for $record {
            type Attr = $name;

            fn attribute(&self, attr: $name) -> AttrValue {
                match attr {
                    $($name::$variant => {
                        let $r = self;
                        AttrValue::from($get)
                    })+
                }
            }
        }
    };
}

attributes! {
    /// Attributes of a [`StatusLine`].
    StatusAttr for StatusLine {
        Host => "Host" => |s| s.host.clone(),
        Time => "Time" => |s| s.time,
        StorageEngine => "StorageEngine" => |s| s.storage_engine.clone(),
        NodeType => "NodeType" => |s| s.node_type.clone(),
        Insert => "Insert" => |s| s.insert,
        Query => "Query" => |s| s.query,
        Update => "Update" => |s| s.update,
        Delete => "Delete" => |s| s.delete,
        GetMore => "GetMore" => |s| s.get_more,
        Command => "Command" => |s| s.command,
        Flushes => "Flushes" => |s| s.flushes,
        Virtual => "Virtual" => |s| s.virtual_mb,
        Resident => "Resident" => |s| s.resident_mb,
        QueuedReaders => "QueuedReaders" => |s| s.queued_readers,
        QueuedWriters => "QueuedWriters" => |s| s.queued_writers,
        ActiveReaders => "ActiveReaders" => |s| s.active_readers,
        ActiveWriters => "ActiveWriters" => |s| s.active_writers,
        NetIn => "NetIn" => |s| s.net_in,
        NetOut => "NetOut" => |s| s.net_out,
        NumConnections => "NumConnections" => |s| s.num_connections,
        DeletedDocuments => "DeletedDocuments" => |s| s.deleted_documents,
        Passes => "Passes" => |s| s.passes,
        InsertR => "InsertR" => |s| s.insert_r,
        QueryR => "QueryR" => |s| s.query_r,
        UpdateR => "UpdateR" => |s| s.update_r,
        DeleteR => "DeleteR" => |s| s.delete_r,
        GetMoreR => "GetMoreR" => |s| s.get_more_r,
        CommandR => "CommandR" => |s| s.command_r,
        ReplLag => "ReplLag" => |s| s.repl_lag,
        JumboChunksCount => "JumboChunksCount" => |s| s.jumbo_chunks_count,
        Mapped => "Mapped" => |s| s.mapped_mb,
        NonMapped => "NonMapped" => |s| s.non_mapped_mb,
        Faults => "Faults" => |s| s.faults,
        CacheDirtyPercent => "CacheDirtyPercent" => |s| s.cache_dirty_percent,
        CacheUsedPercent => "CacheUsedPercent" => |s| s.cache_used_percent,
    }
}

attributes! {
    /// Attributes of a [`DbStatusLine`].
    DbStatusAttr for DbStatusLine {
        Name => "Name" => |d| d.name.clone(),
        Collections => "Collections" => |d| d.collections,
        Objects => "Objects" => |d| d.objects,
        AvgObjSize => "AvgObjSize" => |d| d.avg_obj_size,
        DataSize => "DataSize" => |d| d.data_size,
        StorageSize => "StorageSize" => |d| d.storage_size,
        NumExtents => "NumExtents" => |d| d.num_extents,
        Indexes => "Indexes" => |d| d.indexes,
        IndexSize => "IndexSize" => |d| d.index_size,
        Ok => "Ok" => |d| d.ok,
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for AttrValue {
    fn from(value: chrono::DateTime<chrono::Utc>) -> Self {
        AttrValue::Time(value)
    }
}

impl StatusLine {
    /// Reads an attribute by schema name, `None` if the name is unknown.
    pub fn get(&self, name: &str) -> Option<AttrValue> {
        StatusAttr::from_name(name).map(|attr| self.attribute(attr))
    }
}

impl DbStatusLine {
    /// Reads an attribute by schema name, `None` if the name is unknown.
    pub fn get(&self, name: &str) -> Option<AttrValue> {
        DbStatusAttr::from_name(name).map(|attr| self.attribute(attr))
    }
}
