//! File status tracking (`textDocument/clangd.fileStatus`)
//!
//! The server pushes per-file progress states while it parses and builds
//! preambles. The tracker keeps the latest state per URI; "idle" means
//! there is nothing worth showing for that file.

use std::collections::HashMap;

use crate::infra::protocol::FileStatus;

const IDLE_STATE: &str = "idle";

#[derive(Debug, Default)]
pub struct FileStatusTracker {
    statuses: HashMap<String, String>,
}

impl FileStatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest pushed status for a file.
    pub fn on_file_updated(&mut self, status: FileStatus) {
        self.statuses.insert(status.uri, status.state);
    }

    /// Current displayable state for a file. `None` when the server never
    /// reported on it or the file is idle.
    pub fn status_for(&self, uri: &str) -> Option<&str> {
        self.statuses
            .get(uri)
            .map(String::as_str)
            .filter(|state| *state != IDLE_STATE)
    }

    pub fn clear(&mut self) {
        self.statuses.clear();
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}
