//! Progress records written on restore checkpoints and level completion.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::ability::Ability;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub level_name: String,
    pub completed: bool,
    /// Whether the next level is unlocked.
    pub unlocked: bool,
    /// Fountain ids of restore checkpoints touched so far, in order.
    pub checkpoints_passed: Vec<u32>,
    pub serenity_remaining: f32,
    pub ability_queue: Vec<Ability>,
    pub saved_at: String,
}

#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Encode(serde_json::Error),
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "save I/O failed: {e}"),
            Self::Encode(e) => write!(f, "save encoding failed: {e}"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Encode(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        Self::Encode(e)
    }
}

/// Destination for save records.
pub trait SaveSink: Send {
    fn write(&mut self, record: &SaveRecord) -> Result<(), SaveError>;
}

/// Discards every record.
#[derive(Debug, Default)]
pub struct NullSink;

impl SaveSink for NullSink {
    fn write(&mut self, _record: &SaveRecord) -> Result<(), SaveError> {
        Ok(())
    }
}

/// Keeps records in memory. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<SaveRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<SaveRecord> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn last(&self) -> Option<SaveRecord> {
        self.records().pop()
    }
}

impl SaveSink for MemorySink {
    fn write(&mut self, record: &SaveRecord) -> Result<(), SaveError> {
        let mut records = self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        records.push(record.clone());
        Ok(())
    }
}

/// Writes the latest record as pretty JSON, replacing the previous file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<SaveRecord, SaveError> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl SaveSink for JsonFileSink {
    fn write(&mut self, record: &SaveRecord) -> Result<(), SaveError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(record)?;
        // Write then rename so a crash never leaves a truncated save behind.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::info!(path = %self.path.display(), level = %record.level_name, "Progress saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn record(completed: bool) -> SaveRecord {
        SaveRecord {
            level_name: "meadow".to_string(),
            completed,
            unlocked: completed,
            checkpoints_passed: vec![2],
            serenity_remaining: 1234.0,
            ability_queue: vec![Ability::Dash, Ability::Flight],
            saved_at: "42Z".to_string(),
        }
    }

    #[test]
    fn memory_sink_clones_share_records() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.write(&record(false)).unwrap();
        writer.write(&record(true)).unwrap();
        assert_eq!(sink.records().len(), 2);
        assert!(sink.last().unwrap().completed);
    }

    #[test]
    fn json_sink_writes_latest_record() {
        let temp = TempDir::new().expect("temp");
        let mut sink = JsonFileSink::new(temp.path().join("saves").join("meadow.json"));
        sink.write(&record(false)).unwrap();
        sink.write(&record(true)).unwrap();

        let loaded = sink.read().unwrap();
        assert_eq!(loaded, record(true));
        assert!(!sink.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn reading_missing_file_is_io_error() {
        let temp = TempDir::new().expect("temp");
        let sink = JsonFileSink::new(temp.path().join("absent.json"));
        assert!(matches!(sink.read(), Err(SaveError::Io(_))));
    }

    #[test]
    fn corrupt_file_is_encode_error() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let sink = JsonFileSink::new(path);
        let err = sink.read().unwrap_err();
        assert!(matches!(err, SaveError::Encode(_)));
        assert!(err.to_string().contains("encoding"));
    }
}
