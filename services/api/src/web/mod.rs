pub mod auth;
pub mod documents;
pub mod flashcards;
pub mod interactions;
pub mod middleware;
pub mod state;

use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use study_buddy_core::ports::CoreError;

use crate::error::ApiError;
use crate::web::state::AppState;

// Re-export the middleware so the binary that builds the router can layer it.
pub use middleware::{require_auth, resolve_user};

//=========================================================================================
// Shared Response Types and Helpers
//=========================================================================================

/// A plain confirmation body used by the delete endpoints.
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fails with 404 when the document does not exist and 403 when it exists but
/// belongs to someone else (or to nobody).
pub(crate) async fn ensure_document_owner(
    state: &AppState,
    document_id: i64,
    user_id: i64,
) -> Result<(), ApiError> {
    let document = state.store.get_document(document_id).await?;
    if document.owner_id != Some(user_id) {
        return Err(ApiError::Core(CoreError::AccessDenied));
    }
    Ok(())
}

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        documents::upload_handler,
        documents::list_documents_handler,
        documents::history_handler,
        documents::delete_document_handler,
        documents::progress_report_handler,
        interactions::ask_handler,
        interactions::summarize_handler,
        interactions::generate_quiz_handler,
        interactions::submit_quiz_handler,
        interactions::quiz_history_handler,
        interactions::delete_chat_handler,
        interactions::delete_quiz_history_handler,
        interactions::delete_quiz_attempt_handler,
        interactions::delete_multiple_attempts_handler,
        flashcards::generate_flashcards_handler,
        flashcards::list_flashcard_sets_handler,
        flashcards::delete_flashcard_set_handler,
        flashcards::delete_multiple_flashcard_sets_handler,
        flashcards::delete_all_flashcard_sets_handler,
    ),
    components(
        schemas(
            MessageResponse,
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            documents::DocumentResponse,
            documents::ChatMessageResponse,
            documents::ScoreOverTime,
            documents::ProgressReportResponse,
            interactions::ChatTurnInput,
            interactions::AskRequest,
            interactions::AnswerResponse,
            interactions::DocumentRequest,
            interactions::SummaryResponse,
            interactions::QuizQuestionResponse,
            interactions::QuizResponse,
            interactions::UserAnswerInput,
            interactions::SubmitQuizRequest,
            interactions::QuizAnswerResponse,
            interactions::QuizAttemptResponse,
            interactions::DeleteAttemptsRequest,
            flashcards::FlashcardResponse,
            flashcards::FlashcardSetResponse,
            flashcards::DeleteSetsRequest,
        )
    ),
    tags(
        (name = "AI Study Buddy API", description = "API endpoints for document-grounded studying.")
    )
)]
pub struct ApiDoc;
