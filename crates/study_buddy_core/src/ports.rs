//! crates/study_buddy_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    CardDraft, ChatMessage, ChatRole, ChatTurn, Document, FlashcardSet, NewQuizAnswer,
    ProgressReport, QuizAttempt, User, UserCredentials,
};
use crate::index::VectorIndex;

pub use crate::error::{CoreError, CoreResult};

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The relational store for documents and everything they own.
#[async_trait]
pub trait StudyStore: Send + Sync {
    // --- Auth ---
    async fn create_user(&self, email: &str, password_hash: &str) -> CoreResult<User>;

    async fn get_user_credentials(&self, email: &str) -> CoreResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> CoreResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> CoreResult<User>;

    async fn delete_auth_session(&self, session_id: &str) -> CoreResult<()>;

    // --- Documents ---
    async fn create_document(&self, filename: &str, owner_id: Option<i64>)
        -> CoreResult<Document>;

    async fn get_document(&self, document_id: i64) -> CoreResult<Document>;

    async fn list_documents(&self, owner_id: i64) -> CoreResult<Vec<Document>>;

    /// Deletes the document row. Owned chat messages, quiz attempts and
    /// flashcard sets go with it via foreign key cascades.
    async fn delete_document(&self, document_id: i64) -> CoreResult<()>;

    // --- Chat History ---
    async fn append_chat_message(
        &self,
        document_id: i64,
        role: ChatRole,
        content: &str,
        user_id: Option<i64>,
    ) -> CoreResult<ChatMessage>;

    async fn chat_history(&self, document_id: i64) -> CoreResult<Vec<ChatMessage>>;

    async fn delete_chat_history(&self, document_id: i64) -> CoreResult<u64>;

    // --- Quiz Attempts ---
    /// Inserts the attempt and all of its answers in one transaction.
    async fn create_quiz_attempt(
        &self,
        document_id: i64,
        user_id: i64,
        score: f64,
        answers: &[NewQuizAnswer],
    ) -> CoreResult<QuizAttempt>;

    async fn quiz_history(&self, document_id: i64, user_id: i64) -> CoreResult<Vec<QuizAttempt>>;

    async fn delete_quiz_attempt(&self, attempt_id: i64, user_id: i64) -> CoreResult<()>;

    async fn delete_quiz_attempts(&self, attempt_ids: &[i64], user_id: i64) -> CoreResult<u64>;

    async fn delete_quiz_history(&self, document_id: i64, user_id: i64) -> CoreResult<u64>;

    async fn progress_report(&self, document_id: i64, user_id: i64) -> CoreResult<ProgressReport>;

    // --- Flashcards ---
    /// Inserts the set and all of its cards in one transaction.
    async fn create_flashcard_set(
        &self,
        document_id: i64,
        user_id: i64,
        title: &str,
        cards: &[CardDraft],
    ) -> CoreResult<FlashcardSet>;

    async fn flashcard_sets(&self, document_id: i64, user_id: i64)
        -> CoreResult<Vec<FlashcardSet>>;

    async fn delete_flashcard_set(&self, set_id: i64, user_id: i64) -> CoreResult<()>;

    async fn delete_flashcard_sets(&self, set_ids: &[i64], user_id: i64) -> CoreResult<u64>;

    async fn delete_all_flashcard_sets(&self, document_id: i64, user_id: i64) -> CoreResult<u64>;
}

/// Turns text into embedding vectors.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embeds a single query string.
    async fn embed(&self, text: &str) -> CoreResult<Vec<f32>>;

    /// Embeds a batch of chunks. The output order must match the input order.
    async fn embed_batch(&self, texts: &[String]) -> CoreResult<Vec<Vec<f32>>>;
}

/// Chat-completion access to the language model.
#[async_trait]
pub trait LanguageModelService: Send + Sync {
    /// A single system + user exchange (summaries, quiz and flashcard generation).
    async fn complete(&self, system: &str, user: &str) -> CoreResult<String>;

    /// A completion that also carries prior conversation turns.
    async fn complete_chat(
        &self,
        system: &str,
        history: &[ChatTurn],
        user: &str,
    ) -> CoreResult<String>;
}

/// Persistence for per-document vector indexes.
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Persists the index for a document, replacing any previous one.
    async fn save(&self, document_id: i64, index: &VectorIndex) -> CoreResult<()>;

    /// Loads a document's index. Fails with `CoreError::IndexNotFound` when
    /// no index has been saved for that ID.
    async fn load(&self, document_id: i64) -> CoreResult<VectorIndex>;

    /// Removes a document's index. Deleting an index that does not exist
    /// is a no-op success.
    async fn delete(&self, document_id: i64) -> CoreResult<()>;
}
