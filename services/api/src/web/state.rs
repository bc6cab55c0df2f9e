//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use study_buddy_core::flashcards::FlashcardGenerator;
use study_buddy_core::ingest::DocumentIngestor;
use study_buddy_core::ports::StudyStore;
use study_buddy_core::qa::QaEngine;
use study_buddy_core::quiz::QuizGenerator;
use study_buddy_core::summarize::Summarizer;

use crate::config::Config;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// Handlers that only read or delete rows go straight to the store; everything
/// that touches the vector index or the language model goes through an engine.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StudyStore>,
    pub ingestor: Arc<DocumentIngestor>,
    pub qa: Arc<QaEngine>,
    pub summarizer: Arc<Summarizer>,
    pub quiz: Arc<QuizGenerator>,
    pub flashcards: Arc<FlashcardGenerator>,
    pub config: Arc<Config>,
}
