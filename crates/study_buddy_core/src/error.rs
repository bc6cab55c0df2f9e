//! crates/study_buddy_core/src/error.rs
//!
//! Defines the error taxonomy shared by the core engines and the service ports.
//! Every variant is distinct and user-visible; the API layer maps each one to
//! its own HTTP status, so engines must never collapse them into one another.

/// The error type for all core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No document row exists for the given ID.
    #[error("Document {0} not found")]
    DocumentNotFound(i64),

    /// A secondary resource (quiz attempt, flashcard set, user) is missing.
    #[error("Item not found: {0}")]
    NotFound(String),

    /// No persisted vector index exists for the given document ID.
    #[error("Vector index for document {0} not found")]
    IndexNotFound(i64),

    /// The uploaded file's content type is not one we can extract text from.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Extraction succeeded but produced no usable text.
    #[error("Could not extract any text from the document")]
    EmptyDocument,

    /// The document's index holds zero chunks, so there is nothing to work from.
    #[error("No content available for this document")]
    NoContent,

    /// The model's reply did not conform to the requested output schema.
    #[error("Model output failed validation: {0}")]
    GenerationFormat(String),

    /// The caller does not own the resource it is trying to touch.
    #[error("Not authorized to access this resource")]
    AccessDenied,

    /// The operation requires a logged-in user.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// A persistence failure (database or index storage).
    #[error("Storage error: {0}")]
    Store(String),

    /// A failure in the embedding or chat model provider.
    #[error("Model service error: {0}")]
    Model(String),
}

/// A convenience type alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;
