pub mod chunker;
pub mod domain;
pub mod error;
pub mod flashcards;
pub mod index;
pub mod ingest;
pub mod ports;
pub mod prompts;
pub mod qa;
pub mod quiz;
pub mod summarize;

pub use chunker::TextSplitter;
pub use domain::{ChatMessage, ChatRole, ChatTurn, Document, FlashcardSet, Quiz, User};
pub use error::{CoreError, CoreResult};
pub use flashcards::FlashcardGenerator;
pub use index::VectorIndex;
pub use ingest::DocumentIngestor;
pub use ports::{EmbeddingService, IndexStore, LanguageModelService, StudyStore};
pub use qa::QaEngine;
pub use quiz::QuizGenerator;
pub use summarize::Summarizer;
