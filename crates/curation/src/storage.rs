//! Storage trait and implementations
//!
//! A backend holds one blob: the whole serialized collection.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub trait Storage: Send + Sync {
    /// `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Vec<u8>>, Box<dyn std::error::Error>>;
    fn save(&mut self, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>>;
    /// Keep a copy of contents that could not be fully loaded, so the next
    /// `save` does not destroy them.
    fn backup(&mut self, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>>;
}

/// In-memory storage (for testing and ephemeral runs)
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    blob: Arc<RwLock<Option<Vec<u8>>>>,
    backup: Arc<RwLock<Option<Vec<u8>>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            blob: Arc::new(RwLock::new(Some(bytes.into()))),
            ..Self::default()
        }
    }

    /// Snapshot of what was last saved; clones share the same blob.
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.blob.read().ok().and_then(|b| b.clone())
    }

    pub fn backup_contents(&self) -> Option<Vec<u8>> {
        self.backup.read().ok().and_then(|b| b.clone())
    }
}

impl Storage for InMemoryStorage {
    fn load(&self) -> Result<Option<Vec<u8>>, Box<dyn std::error::Error>> {
        let blob = self.blob.read().map_err(|e| e.to_string())?;
        Ok(blob.clone())
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        let mut blob = self.blob.write().map_err(|e| e.to_string())?;
        *blob = Some(bytes.to_vec());
        Ok(())
    }

    fn backup(&mut self, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        let mut backup = self.backup.write().map_err(|e| e.to_string())?;
        *backup = Some(bytes.to_vec());
        Ok(())
    }
}

/// Single JSON file on disk. Saves go through `<path>.tmp` + rename; backups
/// land in `<path>.corrupt`.
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.sibling(".corrupt")
    }
}

impl Storage for FileStorage {
    fn load(&self) -> Result<Option<Vec<u8>>, Box<dyn std::error::Error>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        let tmp = self.sibling(".tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn backup(&mut self, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::write(self.backup_path(), bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_clones_share_blob() {
        let storage = InMemoryStorage::new();
        let mut handle = storage.clone();
        assert_eq!(storage.load().unwrap(), None);

        handle.save(b"[]").unwrap();
        assert_eq!(storage.contents(), Some(b"[]".to_vec()));
    }

    #[test]
    fn test_file_storage_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested/data/dataset.json")).unwrap();
        assert!(storage.path().parent().unwrap().is_dir());
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_file_storage_overwrites_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.json");
        let mut storage = FileStorage::new(&path).unwrap();

        storage.save(b"[1]").unwrap();
        storage.save(b"[1,2]").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"[1,2]");
        assert!(!dir.path().join("dataset.json.tmp").exists());
        assert_eq!(storage.load().unwrap(), Some(b"[1,2]".to_vec()));
    }

    #[test]
    fn test_file_backup_is_a_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("dataset.json")).unwrap();

        storage.backup(b"{broken").unwrap();
        assert_eq!(storage.backup_path(), dir.path().join("dataset.json.corrupt"));
        assert_eq!(std::fs::read(storage.backup_path()).unwrap(), b"{broken");
        assert_eq!(storage.load().unwrap(), None);
    }
}
