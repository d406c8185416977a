use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    validate, DatasetStats, Entry, EntryKind, Payload, Storage, StoreError, CollectionStore,
    UnknownEntryKind, ValidationResult,
};

#[derive(Debug, Error)]
pub enum CurationError {
    #[error(transparent)]
    UnsupportedType(#[from] UnknownEntryKind),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Ser(String),
}

pub type CurationResult<T> = std::result::Result<T, CurationError>;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub validation: ValidationResult,
}

/// Submission and export on top of a [`CollectionStore`].
pub struct CurationService<S: Storage> {
    store: CollectionStore<S>,
}

impl<S: Storage> CurationService<S> {
    pub fn new(store: CollectionStore<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &CollectionStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CollectionStore<S> {
        &mut self.store
    }

    /// Score, wrap and append. The stored score is the one returned here.
    pub fn submit(&mut self, kind: &str, data: Value) -> CurationResult<Submission> {
        let kind: EntryKind = kind.parse()?;
        let validation = validate(&Payload::from_value(kind, &data));

        let entry = Entry::new(kind, data, validation.quality_score);
        let id = entry.id.clone();
        self.store.append(entry)?;

        Ok(Submission { id, validation })
    }

    /// Dry run: same scoring as `submit`, nothing stored.
    pub fn validate_only(&self, kind: &str, data: &Value) -> CurationResult<ValidationResult> {
        let kind: EntryKind = kind.parse()?;
        Ok(validate(&Payload::from_value(kind, data)))
    }

    pub fn list(&self) -> &[Entry] {
        self.store.list()
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.store.get(id)
    }

    pub fn delete(&mut self, id: &str) -> CurationResult<Entry> {
        Ok(self.store.remove(id)?)
    }

    pub fn clear(&mut self) -> CurationResult<usize> {
        Ok(self.store.clear()?)
    }

    fn payloads(&self) -> impl Iterator<Item = &Value> {
        self.store.list().iter().map(|e| &e.data)
    }

    /// Payloads only, as one pretty-printed JSON array.
    pub fn export_json(&self) -> CurationResult<String> {
        let items: Vec<&Value> = self.payloads().collect();
        serde_json::to_string_pretty(&items).map_err(|e| CurationError::Ser(e.to_string()))
    }

    /// Payloads only, one compact object per newline-terminated line.
    pub fn export_jsonl(&self) -> CurationResult<String> {
        let mut out = String::new();
        for item in self.payloads() {
            let line = serde_json::to_string(item).map_err(|e| CurationError::Ser(e.to_string()))?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }

    pub fn stats(&self) -> CurationResult<DatasetStats> {
        let jsonl = self.export_jsonl()?;
        Ok(DatasetStats::compute(self.store.list(), jsonl.as_bytes()))
    }
}
