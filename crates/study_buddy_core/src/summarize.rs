//! crates/study_buddy_core/src/summarize.rs
//!
//! Whole-document summaries from a storage-order sample of the index.

use std::sync::Arc;
use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::ports::{IndexStore, LanguageModelService, StudyStore};
use crate::prompts::SUMMARY_INSTRUCTIONS;

/// How many chunks (in storage order) feed the summary.
const SAMPLE_CHUNKS: usize = 50;

pub struct Summarizer {
    store: Arc<dyn StudyStore>,
    model: Arc<dyn LanguageModelService>,
    index_store: Arc<dyn IndexStore>,
}

impl Summarizer {
    pub fn new(
        store: Arc<dyn StudyStore>,
        model: Arc<dyn LanguageModelService>,
        index_store: Arc<dyn IndexStore>,
    ) -> Self {
        Self {
            store,
            model,
            index_store,
        }
    }

    /// Produces a three-paragraph summary of the document from its first
    /// fifty chunks. Fails with `CoreError::NoContent` before any model call
    /// when the index holds nothing.
    pub async fn summarize(&self, document_id: i64) -> CoreResult<String> {
        let document = self.store.get_document(document_id).await?;
        let index = self.index_store.load(document.id).await?;

        let chunks = index.chunks(SAMPLE_CHUNKS);
        if chunks.is_empty() {
            return Err(CoreError::NoContent);
        }

        let text = chunks.join(" ");
        let summary = self.model.complete(SUMMARY_INSTRUCTIONS, &text).await?;

        info!(
            "Summarized document {} from {} chunks",
            document.id,
            chunks.len()
        );
        Ok(summary)
    }
}
