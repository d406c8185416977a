use std::{path::PathBuf, sync::Arc};
use tokio::sync::RwLock;
use tokio::task::JoinError;

use curation::{CollectionStore, CurationService, FileStorage};

pub type SharedState = Arc<AppState>;
pub type Curation = CurationService<FileStorage>;

/// One lock guards every mutation together with its persist step.
#[derive(Clone)]
pub struct AppState {
    pub curation: Arc<RwLock<Curation>>,
}

impl AppState {
    /// Loads the collection; a missing or unreadable file starts empty.
    pub fn open(path: PathBuf) -> std::io::Result<Self> {
        let storage = FileStorage::new(path)?;
        let store = CollectionStore::open(storage);
        Ok(Self {
            curation: Arc::new(RwLock::new(CurationService::new(store))),
        })
    }

    /// Runs `f` with the write lock held on a blocking thread, since every
    /// mutation ends in a file write.
    pub async fn mutate<R, F>(&self, f: F) -> Result<R, JoinError>
    where
        R: Send + 'static,
        F: FnOnce(&mut Curation) -> R + Send + 'static,
    {
        let curation = self.curation.clone();
        tokio::task::spawn_blocking(move || f(&mut curation.blocking_write())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mutate_is_visible_to_readers() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::open(dir.path().join("dataset.json")).unwrap();

        let sub = state
            .mutate(|svc| svc.submit("chat", json!({"messages": []})))
            .await
            .unwrap()
            .unwrap();

        let svc = state.curation.read().await;
        assert_eq!(svc.list().len(), 1);
        assert_eq!(svc.list()[0].id, sub.id);
    }
}
