use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::{new_entry_id, Entry, Storage};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Ser(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Ordered in-memory collection mirrored to a single storage blob.
///
/// Every mutation rewrites the whole blob. If the write fails the in-memory
/// change is rolled back, so a completed call never leaves memory and storage apart.
pub struct CollectionStore<S: Storage> {
    storage: S,
    entries: Vec<Entry>,
}

impl<S: Storage> CollectionStore<S> {
    /// Open and load. See [`CollectionStore::load`].
    pub fn open(storage: S) -> Self {
        let mut store = Self { storage, entries: Vec::new() };
        store.load();
        store
    }

    /// Records are read one by one. Unreadable records are skipped; if anything
    /// was skipped the original bytes go to `Storage::backup` before the next
    /// persist can overwrite them. A read failure starts an empty collection.
    pub fn load(&mut self) {
        let bytes = match self.storage.load() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                self.entries = Vec::new();
                return;
            }
            Err(e) => {
                warn!(error = %e, "failed to read collection, starting empty");
                self.entries = Vec::new();
                return;
            }
        };

        let (entries, complete) = parse_entries(&bytes);
        if !complete {
            match self.storage.backup(&bytes) {
                Ok(()) => {
                    warn!(kept = entries.len(), "collection partially loaded, original backed up")
                }
                Err(e) => warn!(error = %e, "collection partially loaded and backup failed"),
            }
        }
        self.entries = entries;
    }

    pub fn persist(&mut self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.entries)
            .map_err(|e| StoreError::Ser(e.to_string()))?;
        self.storage
            .save(&bytes)
            .map_err(|e| StoreError::Storage(e.to_string()))
    }

    pub fn append(&mut self, entry: Entry) -> Result<()> {
        let id = entry.id.clone();
        self.entries.push(entry);
        if let Err(e) = self.persist() {
            self.entries.pop();
            return Err(e);
        }
        info!(%id, total = self.entries.len(), "entry appended");
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<Entry> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let removed = self.entries.remove(pos);
        if let Err(e) = self.persist() {
            self.entries.insert(pos, removed);
            return Err(e);
        }
        info!(%id, total = self.entries.len(), "entry removed");
        Ok(removed)
    }

    /// Returns how many entries were dropped.
    pub fn clear(&mut self) -> Result<usize> {
        let previous = std::mem::take(&mut self.entries);
        if let Err(e) = self.persist() {
            self.entries = previous;
            return Err(e);
        }
        info!(cleared = previous.len(), "collection cleared");
        Ok(previous.len())
    }

    pub fn list(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Returns the readable entries and whether every record was readable.
fn parse_entries(bytes: &[u8]) -> (Vec<Entry>, bool) {
    let records: Vec<Value> = match serde_json::from_slice(bytes) {
        Ok(Value::Array(records)) => records,
        Ok(_) => {
            warn!("collection is not a JSON array, starting empty");
            return (Vec::new(), false);
        }
        Err(e) => {
            warn!(error = %e, "collection is not valid JSON, starting empty");
            return (Vec::new(), false);
        }
    };

    let mut complete = true;
    let mut entries = Vec::with_capacity(records.len());
    for (index, rec) in records.into_iter().enumerate() {
        let id = rec.get("id").and_then(Value::as_str).unwrap_or("<none>").to_string();
        match serde_json::from_value::<Entry>(rec) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!(index, %id, error = %e, "skipping unreadable entry");
                complete = false;
            }
        }
    }

    let mut seen = HashSet::with_capacity(entries.len());
    for e in entries.iter_mut() {
        if !seen.insert(e.id.clone()) {
            let fresh = new_entry_id();
            warn!(old_id = %e.id, new_id = %fresh, "duplicate entry id in storage, re-keyed");
            e.id = fresh.clone();
            seen.insert(fresh);
        }
    }
    (entries, complete)
}
