use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use panel_logging::{panel_debug, panel_error, panel_warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::persist::{AtomicFileWriter, PersistError};

/// Fixed storage name of the persisted status banner.
pub const STATUS_FILENAME: &str = "ip_pool_status.json";

/// Best-effort JSON storage for the single status record.
pub struct StatusStore {
    dir: PathBuf,
    writer: AtomicFileWriter,
}

impl StatusStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            writer: AtomicFileWriter::new(dir.clone()),
            dir,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STATUS_FILENAME)
    }

    /// Reads the stored record. Missing, unreadable or malformed entries read
    /// as absent; malformed ones are deleted.
    pub fn load<T: DeserializeOwned>(&self) -> Option<T> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
            Err(err) => {
                panel_warn!("Failed to read persisted status from {:?}: {}", path, err);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(record) => {
                panel_debug!("Loaded persisted status from {:?}", path);
                Some(record)
            }
            Err(err) => {
                panel_warn!("Discarding malformed persisted status {:?}: {}", path, err);
                self.clear();
                None
            }
        }
    }

    /// Overwrites the stored record.
    pub fn save<T: Serialize>(&self, record: &T) -> Result<(), PersistError> {
        let content = serde_json::to_string(record)?;
        self.writer.write(STATUS_FILENAME, &content)?;
        Ok(())
    }

    /// Like [`StatusStore::save`], but failures are only logged.
    pub fn save_or_log<T: Serialize>(&self, record: &T) {
        if let Err(err) = self.save(record) {
            panel_error!("Failed to persist status to {:?}: {}", self.path(), err);
        }
    }

    /// Removes the stored record; failures are only logged.
    pub fn clear(&self) {
        if let Err(err) = self.writer.remove(STATUS_FILENAME) {
            panel_error!("Failed to remove persisted status {:?}: {}", self.path(), err);
        }
    }
}
