//! services/api/src/adapters/index_store.rs
//!
//! This module contains the filesystem adapter for vector index persistence.
//! It implements the `IndexStore` port from the `core` crate, keeping one
//! directory per document under the configured index root.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

use study_buddy_core::index::VectorIndex;
use study_buddy_core::ports::{CoreError, CoreResult, IndexStore};

const INDEX_FILE: &str = "index.bin";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `IndexStore` on the local filesystem with bincode.
#[derive(Clone)]
pub struct FsIndexStore {
    root: PathBuf,
}

impl FsIndexStore {
    /// Creates a new `FsIndexStore` rooted at `root`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn document_dir(&self, document_id: i64) -> PathBuf {
        self.root.join(format!("doc_{}", document_id))
    }
}

//=========================================================================================
// `IndexStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl IndexStore for FsIndexStore {
    async fn save(&self, document_id: i64, index: &VectorIndex) -> CoreResult<()> {
        let dir = self.document_dir(document_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| CoreError::Store(e.to_string()))?;

        let bytes = bincode::serialize(index).map_err(|e| CoreError::Store(e.to_string()))?;

        // Write to a sibling temp file and rename so a crash mid-write never
        // leaves a truncated index behind.
        let tmp = dir.join(format!("{}.tmp", INDEX_FILE));
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| CoreError::Store(e.to_string()))?;
        tokio::fs::rename(&tmp, dir.join(INDEX_FILE))
            .await
            .map_err(|e| CoreError::Store(e.to_string()))?;
        Ok(())
    }

    async fn load(&self, document_id: i64) -> CoreResult<VectorIndex> {
        let path = self.document_dir(document_id).join(INDEX_FILE);
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                CoreError::IndexNotFound(document_id)
            } else {
                CoreError::Store(e.to_string())
            }
        })?;
        bincode::deserialize(&bytes).map_err(|e| CoreError::Store(e.to_string()))
    }

    async fn delete(&self, document_id: i64) -> CoreResult<()> {
        match tokio::fs::remove_dir_all(self.document_dir(document_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Store(e.to_string())),
        }
    }
}

//=========================================================================================
// Tests
//=========================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> VectorIndex {
        let mut index = VectorIndex::new(3);
        index.push(vec![1.0, 0.0, 0.0], "Cells are small.".to_string());
        index.push(vec![0.0, 1.0, 0.0], "Mitochondria make energy.".to_string());
        index
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsIndexStore::new(dir.path().to_path_buf());

        let index = sample_index();
        store.save(42, &index).await.unwrap();
        let loaded = store.load(42).await.unwrap();
        assert_eq!(loaded, index);
    }

    #[tokio::test]
    async fn loading_a_missing_index_reports_index_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsIndexStore::new(dir.path().to_path_buf());

        let err = store.load(7).await.unwrap_err();
        assert!(matches!(err, CoreError::IndexNotFound(7)));
    }

    #[tokio::test]
    async fn saving_again_replaces_the_previous_index() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsIndexStore::new(dir.path().to_path_buf());

        store.save(1, &sample_index()).await.unwrap();

        let mut replacement = VectorIndex::new(3);
        replacement.push(vec![0.0, 0.0, 1.0], "Ribosomes build proteins.".to_string());
        store.save(1, &replacement).await.unwrap();

        let loaded = store.load(1).await.unwrap();
        assert_eq!(loaded, replacement);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsIndexStore::new(dir.path().to_path_buf());

        store.save(5, &sample_index()).await.unwrap();
        store.delete(5).await.unwrap();
        assert!(matches!(
            store.load(5).await.unwrap_err(),
            CoreError::IndexNotFound(5)
        ));

        // A second delete of the same document is a quiet no-op.
        store.delete(5).await.unwrap();
    }
}
