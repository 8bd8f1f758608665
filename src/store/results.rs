//! Flat-file result store: one pretty-printed `<id>.json` per email.

use std::path::PathBuf;

use tracing::debug;

use crate::error::{MailbriefError, Result};
use crate::model::record::ProcessedRecord;

const EXTENSION: &str = "json";

/// Directory of persisted [`ProcessedRecord`]s keyed by email id.
///
/// Saving an id that already exists overwrites it; re-running a batch is
/// idempotent at the file level.
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    /// Open `dir`, creating it if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| MailbriefError::io(&dir, e))?;
        Ok(Self { dir })
    }

    /// Open `dir` for reading without creating it.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{EXTENSION}"))
    }

    pub fn exists(&self, id: &str) -> bool {
        self.path_for(id).is_file()
    }

    pub fn save(&self, id: &str, record: &ProcessedRecord) -> Result<PathBuf> {
        let path = self.path_for(id);
        let json = serde_json::to_string_pretty(record)?;
        std::fs::write(&path, json).map_err(|e| MailbriefError::io(&path, e))?;
        debug!(path = %path.display(), "Saved result");
        Ok(path)
    }

    pub fn load(&self, id: &str) -> Result<ProcessedRecord> {
        let path = self.path_for(id);
        let data = std::fs::read(&path).map_err(|e| MailbriefError::io(&path, e))?;
        serde_json::from_slice(&data).map_err(|e| MailbriefError::Store {
            path,
            reason: e.to_string(),
        })
    }

    /// Ids of all stored results, sorted.
    pub fn list_ids(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(MailbriefError::io(&self.dir, e)),
        };

        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == EXTENSION))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        ids.sort();
        Ok(ids)
    }
}
