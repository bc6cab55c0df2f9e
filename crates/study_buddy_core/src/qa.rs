//! crates/study_buddy_core/src/qa.rs
//!
//! The conversational question-answering engine: history-aware reformulation,
//! retrieval against the document's index, depth-adaptive grounded generation,
//! and recording of the exchange.

use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::{ChatRole, ChatTurn};
use crate::error::CoreResult;
use crate::ports::{EmbeddingService, IndexStore, LanguageModelService, StudyStore};
use crate::prompts::{qa_system_prompt, AnswerDepth, REFORMULATE_INSTRUCTIONS};

/// How many chunks are retrieved as context for an answer.
const RETRIEVAL_K: usize = 4;

pub struct QaEngine {
    store: Arc<dyn StudyStore>,
    embedder: Arc<dyn EmbeddingService>,
    model: Arc<dyn LanguageModelService>,
    index_store: Arc<dyn IndexStore>,
}

impl QaEngine {
    pub fn new(
        store: Arc<dyn StudyStore>,
        embedder: Arc<dyn EmbeddingService>,
        model: Arc<dyn LanguageModelService>,
        index_store: Arc<dyn IndexStore>,
    ) -> Self {
        Self {
            store,
            embedder,
            model,
            index_store,
        }
    }

    /// Answers `question` about one document, using `history` as the
    /// conversational context, and appends the exchange (human message first,
    /// then the AI answer) to the document's stored chat history.
    ///
    /// `user_id` is recorded on both messages when present; anonymous
    /// interactions are allowed and stored without a user.
    pub async fn ask(
        &self,
        document_id: i64,
        question: &str,
        history: &[ChatTurn],
        user_id: Option<i64>,
    ) -> CoreResult<String> {
        // 1. Both the document and its index must exist.
        let document = self.store.get_document(document_id).await?;
        let index = self.index_store.load(document.id).await?;

        // 2. Turn a follow-up into a standalone question. With no history
        //    there is nothing to resolve, so the question passes through
        //    without a model call.
        let standalone = if history.is_empty() {
            question.to_string()
        } else {
            self.model
                .complete_chat(REFORMULATE_INSTRUCTIONS, history, question)
                .await?
        };
        debug!("Retrieving with standalone question: {}", standalone);

        // 3. Retrieve context for the standalone question.
        let query = self.embedder.embed(&standalone).await?;
        let context = index.search(&query, RETRIEVAL_K).join("\n\n");

        // 4. Depth comes from the user's original phrasing, not the
        //    reformulation.
        let depth = AnswerDepth::classify(question);

        // 5. Grounded generation, with the prior turns kept in the
        //    conversation so follow-ups stay coherent.
        let system = qa_system_prompt(depth, &context);
        let answer = self.model.complete_chat(&system, history, question).await?;

        // 6. Record the exchange in order: the question, then the answer.
        self.store
            .append_chat_message(document.id, ChatRole::Human, question, user_id)
            .await?;
        self.store
            .append_chat_message(document.id, ChatRole::Ai, &answer, user_id)
            .await?;

        info!(
            "Answered question on document {} ({:?} depth)",
            document.id, depth
        );
        Ok(answer)
    }
}
