use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Error type for slot reads and writes
#[derive(Debug, thiserror::Error)]
pub enum SlotError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize tasks: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// A local key-value store holding one string per key.
///
/// Every write replaces the whole value; there is no partial update.
pub trait Slot {
    /// Read the value stored under `key`, or `None` if nothing is stored
    fn read(&self, key: &str) -> Result<Option<String>, SlotError>;

    /// Replace the value stored under `key`
    fn write(&mut self, key: &str, value: &str) -> Result<(), SlotError>;
}

/// Slots backed by files in a directory: key `k` lives in `<dir>/<k>.json`
#[derive(Debug, Clone)]
pub struct DirSlot {
    dir: PathBuf,
}

impl DirSlot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirSlot { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Slot for DirSlot {
    fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SlotError::ReadError { path, source }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), SlotError> {
        let path = self.path_for(key);
        fs::create_dir_all(&self.dir).map_err(|source| SlotError::WriteError {
            path: path.clone(),
            source,
        })?;
        atomic_write(&path, value.as_bytes())
            .map_err(|source| SlotError::WriteError { path, source })
    }
}

/// In-memory slots, used by tests and anywhere nothing should touch disk
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    values: HashMap<String, String>,
    writes: usize,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key, as if an earlier session had written it
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut slot = Self::default();
        slot.values.insert(key.to_string(), value.to_string());
        slot
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// Number of writes performed since creation
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl Slot for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), SlotError> {
        self.values.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn dir_slot_missing_key_reads_none() {
        let tmp = TempDir::new().unwrap();
        let slot = DirSlot::new(tmp.path());
        assert!(slot.read("todos").unwrap().is_none());
    }

    #[test]
    fn dir_slot_write_then_read() {
        let tmp = TempDir::new().unwrap();
        let mut slot = DirSlot::new(tmp.path());
        slot.write("todos", "[]").unwrap();
        assert_eq!(slot.read("todos").unwrap().as_deref(), Some("[]"));
        assert!(tmp.path().join("todos.json").exists());

        slot.write("todos", "[1]").unwrap();
        assert_eq!(slot.read("todos").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn dir_slot_creates_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a").join("b");
        let mut slot = DirSlot::new(&nested);
        slot.write("todos", "[]").unwrap();
        assert!(nested.join("todos.json").exists());
    }

    #[test]
    fn dir_slot_keys_are_independent() {
        let tmp = TempDir::new().unwrap();
        let mut slot = DirSlot::new(tmp.path());
        slot.write("todos", "[]").unwrap();
        assert!(slot.read("other").unwrap().is_none());
    }

    #[test]
    fn memory_slot_counts_writes() {
        let mut slot = MemorySlot::with_value("todos", "[]");
        assert_eq!(slot.write_count(), 0);
        slot.write("todos", "[1]").unwrap();
        assert_eq!(slot.get("todos"), Some("[1]"));
        assert_eq!(slot.write_count(), 1);
    }

    #[test]
    fn atomic_write_replaces_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("file.json");
        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }
}
