//! JSON file snapshot source.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::{SourceError, StatusSource};
use crate::model::StatusLine;

/// Reads the status snapshot from a JSON file on every cycle.
///
/// The file holds either one status object or an array of them; for an
/// array the last element (most recent) is used. The file is expected to be
/// rewritten between cycles by whatever polls the server.
pub struct FileSource {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StatusDocument {
    Many(Vec<StatusLine>),
    One(Box<StatusLine>),
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatusSource for FileSource {
    fn next_status(&mut self) -> Result<StatusLine, SourceError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;

        let document: StatusDocument =
            serde_json::from_str(&content).map_err(|e| SourceError::Parse {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        let status = match document {
            StatusDocument::One(status) => *status,
            StatusDocument::Many(mut statuses) => statuses.pop().ok_or(SourceError::Empty)?,
        };
        debug!(
            "Read status for {:?} from {} ({} databases)",
            status.host,
            self.path.display(),
            status.db_stats.len()
        );
        Ok(status)
    }
}
