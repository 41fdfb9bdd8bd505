//! Seed document loading and decoding

use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tracing::debug;

use super::SeedError;

/// Loads stage documents from the seed data directory.
pub struct RecordSource {
    dir: PathBuf,
}

impl RecordSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Decode one named document into typed records, preserving document
    /// order (document order determines processing order and the tie-break
    /// for duplicate natural keys). A missing or structurally invalid
    /// document is fatal.
    pub fn load<T: DeserializeOwned>(&self, document: &str) -> Result<Vec<T>, SeedError> {
        let path = self.dir.join(document);
        debug!("Loading seed document: {}", path.display());

        let raw = std::fs::read_to_string(&path).map_err(|e| SeedError::Source {
            document: document.to_string(),
            reason: format!("{}: {e}", path.display()),
        })?;

        let records: Vec<T> = serde_json::from_str(&raw).map_err(|e| SeedError::Source {
            document: document.to_string(),
            reason: e.to_string(),
        })?;

        Ok(records)
    }
}
