//! Replays canned status snapshots.
//!
//! Used by tests and by the daemon when no input file is configured.

mod scenarios;

pub use scenarios::SCENARIOS;

use super::{SourceError, StatusSource};
use crate::model::StatusLine;

/// Source that cycles through a fixed list of snapshots.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    statuses: Vec<StatusLine>,
    next: usize,
}

impl MockSource {
    pub fn new(statuses: Vec<StatusLine>) -> Self {
        Self { statuses, next: 0 }
    }

    /// Builds a source from a scenario name, see [`StatusLine::scenario`].
    pub fn from_scenario(name: &str) -> Option<Self> {
        StatusLine::scenario(name).map(|status| Self::new(vec![status]))
    }
}

impl StatusSource for MockSource {
    fn next_status(&mut self) -> Result<StatusLine, SourceError> {
        if self.statuses.is_empty() {
            return Err(SourceError::Empty);
        }
        let status = self.statuses[self.next % self.statuses.len()].clone();
        self.next = self.next.wrapping_add(1);
        Ok(status)
    }
}
