//! Append-only JSON-lines session log (native)

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use super::{SessionPersister, SessionRecord};
use crate::error::PersistError;
use crate::sim::SessionSummary;

/// Appends one JSON record per line
#[derive(Debug, Clone)]
pub struct JsonLinesPersister {
    path: PathBuf,
    user_id: Option<String>,
}

impl JsonLinesPersister {
    pub fn new(path: impl Into<PathBuf>, user_id: Option<String>) -> Self {
        Self {
            path: path.into(),
            user_id,
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SessionPersister for JsonLinesPersister {
    fn persist(&mut self, summary: SessionSummary) -> Result<(), PersistError> {
        let line = SessionRecord::new(self.user_id.clone(), &summary).to_json()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        log::debug!("Appended session to {}", self.path.display());
        Ok(())
    }
}
