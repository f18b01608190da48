//! Status snapshot sources.
//!
//! A [`StatusSource`] yields one [`StatusLine`] per polling cycle. Talking to
//! a live server is left to external tooling; sources here read snapshots that
//! tooling has already produced, or replay canned ones for tests.
//!
//! ```text
//! ┌────────────┐   ┌────────────┐
//! │ FileSource │   │ MockSource │
//! │ (JSON)     │   │ (fixtures) │
//! └─────┬──────┘   └─────┬──────┘
//!       └───────┬────────┘
//!        StatusSource (trait)
//!               │
//!           Collector
//! ```

mod file;
pub mod mock;

use std::path::PathBuf;

use crate::model::StatusLine;

pub use file::FileSource;
pub use mock::MockSource;

/// Error type for snapshot sources.
#[derive(Debug)]
pub enum SourceError {
    /// Snapshot file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// Snapshot file is not valid JSON for a status line.
    Parse { path: PathBuf, message: String },
    /// Source has no snapshot to give.
    Empty,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            SourceError::Parse { path, message } => {
                write!(f, "invalid status snapshot in {}: {}", path.display(), message)
            }
            SourceError::Empty => write!(f, "no status snapshot available"),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Yields status snapshots, one per cycle.
pub trait StatusSource {
    fn next_status(&mut self) -> Result<StatusLine, SourceError>;
}

impl<S: StatusSource + ?Sized> StatusSource for Box<S> {
    fn next_status(&mut self) -> Result<StatusLine, SourceError> {
        (**self).next_status()
    }
}
