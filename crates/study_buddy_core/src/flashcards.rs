//! crates/study_buddy_core/src/flashcards.rs
//!
//! Flashcard generation: the document's first hundred chunks go to the model,
//! the reply is validated to exactly ten term/definition pairs, and the set
//! is persisted atomically with its cards.

use std::sync::Arc;
use tracing::info;

use crate::domain::{FlashcardDrafts, FlashcardSet};
use crate::error::{CoreError, CoreResult};
use crate::ports::{IndexStore, LanguageModelService, StudyStore};
use crate::prompts::FLASHCARD_INSTRUCTIONS;

/// How many chunks (in storage order) feed card generation.
const SAMPLE_CHUNKS: usize = 100;
/// Every set has exactly this many cards.
const CARDS_PER_SET: usize = 10;

pub struct FlashcardGenerator {
    store: Arc<dyn StudyStore>,
    model: Arc<dyn LanguageModelService>,
    index_store: Arc<dyn IndexStore>,
}

impl FlashcardGenerator {
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

    /// Generates a ten-card set for a document and stores it (set and cards
    /// in one transaction) under the title `Flashcards for <filename>`.
    pub async fn generate(&self, document_id: i64, user_id: i64) -> CoreResult<FlashcardSet> {
        let document = self.store.get_document(document_id).await?;
        let index = self.index_store.load(document.id).await?;

        let chunks = index.chunks(SAMPLE_CHUNKS);
        if chunks.is_empty() {
            return Err(CoreError::NoContent);
        }
        let source = chunks.join(" ");

        let reply = self.model.complete(FLASHCARD_INSTRUCTIONS, &source).await?;
        let drafts = parse_flashcards(&reply)?;

        let title = format!("Flashcards for {}", document.filename);
        let set = self
            .store
            .create_flashcard_set(document.id, user_id, &title, &drafts.flashcards)
            .await?;

        info!(
            "Generated flashcard set {} for document {}",
            set.id, document.id
        );
        Ok(set)
    }
}

/// Parses and validates a model reply into flashcard drafts. Markdown code
/// fences are tolerated; the card count is not negotiable.
pub fn parse_flashcards(reply: &str) -> CoreResult<FlashcardDrafts> {
    let cleaned = reply
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let drafts: FlashcardDrafts = serde_json::from_str(cleaned).map_err(|e| {
        CoreError::GenerationFormat(format!("flashcard reply was not valid JSON: {}", e))
    })?;

    if drafts.flashcards.len() != CARDS_PER_SET {
        return Err(CoreError::GenerationFormat(format!(
            "expected {} flashcards, got {}",
            CARDS_PER_SET,
            drafts.flashcards.len()
        )));
    }

    Ok(drafts)
}
