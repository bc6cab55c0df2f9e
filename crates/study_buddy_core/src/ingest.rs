//! crates/study_buddy_core/src/ingest.rs
//!
//! The ingestion pipeline: extracted text in, persisted document + vector
//! index out. Also owns document deletion, since that must remove the index
//! along with the row.

use std::sync::Arc;
use tracing::{error, info};

use crate::chunker::TextSplitter;
use crate::domain::Document;
use crate::error::{CoreError, CoreResult};
use crate::index::VectorIndex;
use crate::ports::{EmbeddingService, IndexStore, StudyStore};

pub struct DocumentIngestor {
    store: Arc<dyn StudyStore>,
    embedder: Arc<dyn EmbeddingService>,
    index_store: Arc<dyn IndexStore>,
    splitter: TextSplitter,
}

impl DocumentIngestor {
    pub fn new(
        store: Arc<dyn StudyStore>,
        embedder: Arc<dyn EmbeddingService>,
        index_store: Arc<dyn IndexStore>,
        splitter: TextSplitter,
    ) -> Self {
        Self {
            store,
            embedder,
            index_store,
            splitter,
        }
    }

    /// Ingests one document: chunk, embed, build the index, create the row,
    /// persist the index under the new ID.
    ///
    /// The document row is only created once embedding has succeeded, and it
    /// is deleted again if the index cannot be persisted, so a document never
    /// exists without a loadable index.
    pub async fn ingest(
        &self,
        filename: &str,
        text: &str,
        owner_id: Option<i64>,
    ) -> CoreResult<Document> {
        let chunks = self.splitter.split(text);
        if chunks.is_empty() {
            return Err(CoreError::EmptyDocument);
        }
        info!("Split '{}' into {} chunks", filename, chunks.len());

        let vectors = self.embedder.embed_batch(&chunks).await?;
        if vectors.len() != chunks.len() {
            return Err(CoreError::Model(format!(
                "embedding count mismatch: {} chunks, {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }

        let dimension = vectors.first().map(|v| v.len()).unwrap_or(0);
        let mut index = VectorIndex::new(dimension);
        for (vector, chunk) in vectors.into_iter().zip(chunks) {
            index.push(vector, chunk);
        }

        let document = self.store.create_document(filename, owner_id).await?;
        if let Err(save_err) = self.index_store.save(document.id, &index).await {
            // Roll the row back so DocumentNotFound and IndexNotFound cannot
            // disagree about this ID.
            if let Err(del_err) = self.store.delete_document(document.id).await {
                error!(
                    "Failed to roll back document {} after index save error: {}",
                    document.id, del_err
                );
            }
            return Err(save_err);
        }

        info!("Ingested document {} ('{}')", document.id, document.filename);
        Ok(document)
    }

    /// Deletes a document, everything it owns in the database (via foreign
    /// key cascades), and its persisted index.
    ///
    /// Anonymous documents (no owner) can be deleted by any logged-in user;
    /// owned documents only by their owner.
    pub async fn delete(&self, document_id: i64, user_id: i64) -> CoreResult<()> {
        let document = self.store.get_document(document_id).await?;
        if let Some(owner_id) = document.owner_id {
            if owner_id != user_id {
                return Err(CoreError::AccessDenied);
            }
        }

        self.store.delete_document(document_id).await?;
        self.index_store.delete(document_id).await?;
        info!("Deleted document {} and its index", document_id);
        Ok(())
    }
}
