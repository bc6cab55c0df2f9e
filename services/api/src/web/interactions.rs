//! services/api/src/web/interactions.rs
//!
//! Axum handlers for asking questions, summarizing and quizzing.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use study_buddy_core::domain::{ChatRole, ChatTurn, NewQuizAnswer, Quiz, QuizAttempt, User};

use crate::error::ApiError;
use crate::web::state::AppState;
use crate::web::{ensure_document_owner, MessageResponse};

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// A prior conversation turn as supplied by the client. Extra fields such as
/// ids or timestamps are accepted and ignored.
#[derive(Deserialize, ToSchema)]
pub struct ChatTurnInput {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize, ToSchema)]
pub struct AskRequest {
    pub document_id: i64,
    pub question: String,
    #[serde(default)]
    pub chat_history: Option<Vec<ChatTurnInput>>,
}

#[derive(Serialize, ToSchema)]
pub struct AnswerResponse {
    pub answer: String,
}

#[derive(Deserialize, ToSchema)]
pub struct DocumentRequest {
    pub document_id: i64,
}

#[derive(Serialize, ToSchema)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Serialize, ToSchema)]
pub struct QuizQuestionResponse {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

#[derive(Serialize, ToSchema)]
pub struct QuizResponse {
    pub questions: Vec<QuizQuestionResponse>,
}

impl From<Quiz> for QuizResponse {
    fn from(quiz: Quiz) -> Self {
        Self {
            questions: quiz
                .questions
                .into_iter()
                .map(|q| QuizQuestionResponse {
                    question: q.question,
                    options: q.options,
                    correct_answer: q.correct_answer,
                    explanation: q.explanation,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UserAnswerInput {
    pub question_text: String,
    pub selected_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct SubmitQuizRequest {
    pub document_id: i64,
    pub score: f64,
    pub answers: Vec<UserAnswerInput>,
}

#[derive(Serialize, ToSchema)]
pub struct QuizAnswerResponse {
    pub id: i64,
    pub question_text: String,
    pub selected_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

#[derive(Serialize, ToSchema)]
pub struct QuizAttemptResponse {
    pub id: i64,
    pub score: f64,
    pub timestamp: DateTime<Utc>,
    pub answers: Vec<QuizAnswerResponse>,
}

impl From<QuizAttempt> for QuizAttemptResponse {
    fn from(attempt: QuizAttempt) -> Self {
        Self {
            id: attempt.id,
            score: attempt.score,
            timestamp: attempt.created_at,
            answers: attempt
                .answers
                .into_iter()
                .map(|a| QuizAnswerResponse {
                    id: a.id,
                    question_text: a.question_text,
                    selected_answer: a.selected_answer,
                    correct_answer: a.correct_answer,
                    is_correct: a.is_correct,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct DeleteAttemptsRequest {
    pub attempt_ids: Vec<i64>,
}

fn parse_history(turns: Vec<ChatTurnInput>) -> Result<Vec<ChatTurn>, ApiError> {
    turns
        .into_iter()
        .map(|t| {
            let role = ChatRole::parse(&t.role)
                .ok_or_else(|| ApiError::BadRequest(format!("Invalid chat role '{}'", t.role)))?;
            Ok(ChatTurn {
                role,
                content: t.content,
            })
        })
        .collect()
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Ask a question about a document.
///
/// Works for guests; when a session cookie is present the stored messages are
/// attributed to that user.
#[utoipa::path(
    post,
    path = "/ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "The grounded answer", body = AnswerResponse),
        (status = 400, description = "Invalid chat history"),
        (status = 404, description = "Document or index not found"),
        (status = 502, description = "Model failure")
    )
)]
pub async fn ask_handler(
    State(state): State<Arc<AppState>>,
    user: Option<Extension<User>>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let history = parse_history(req.chat_history.unwrap_or_default())?;
    let user_id = user.map(|Extension(u)| u.id);
    let answer = state
        .qa
        .ask(req.document_id, &req.question, &history, user_id)
        .await?;
    Ok(Json(AnswerResponse { answer }))
}

/// Summarize a document in three paragraphs.
#[utoipa::path(
    post,
    path = "/summarize",
    request_body = DocumentRequest,
    responses(
        (status = 200, description = "The summary", body = SummaryResponse),
        (status = 404, description = "Document, index or content not found"),
        (status = 502, description = "Model failure")
    )
)]
pub async fn summarize_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DocumentRequest>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let summary = state.summarizer.summarize(req.document_id).await?;
    Ok(Json(SummaryResponse { summary }))
}

/// Generate a five-question multiple-choice quiz from a document.
#[utoipa::path(
    post,
    path = "/generate-quiz",
    request_body = DocumentRequest,
    responses(
        (status = 200, description = "The generated quiz", body = QuizResponse),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Document, index or content not found"),
        (status = 502, description = "Model reply failed validation")
    )
)]
pub async fn generate_quiz_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DocumentRequest>,
) -> Result<Json<QuizResponse>, ApiError> {
    let quiz = state.quiz.generate(req.document_id, None).await?;
    Ok(Json(QuizResponse::from(quiz)))
}

/// Record a graded quiz attempt with its per-question answers.
#[utoipa::path(
    post,
    path = "/submit-quiz",
    request_body = SubmitQuizRequest,
    responses(
        (status = 201, description = "Attempt saved", body = MessageResponse),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn submit_quiz_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // The attempt must point at a real document before anything is written.
    state.store.get_document(req.document_id).await?;

    let answers: Vec<NewQuizAnswer> = req
        .answers
        .into_iter()
        .map(|a| NewQuizAnswer {
            question_text: a.question_text,
            selected_answer: a.selected_answer,
            correct_answer: a.correct_answer,
            is_correct: a.is_correct,
        })
        .collect();

    state
        .store
        .create_quiz_attempt(req.document_id, user.id, req.score, &answers)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Quiz attempt saved successfully.")),
    ))
}

/// List the caller's quiz attempts for a document, newest first.
#[utoipa::path(
    get,
    path = "/documents/{document_id}/quiz-history",
    params(("document_id" = i64, Path, description = "The document whose attempts to list")),
    responses(
        (status = 200, description = "The caller's attempts", body = [QuizAttemptResponse]),
        (status = 401, description = "Authentication required")
    )
)]
pub async fn quiz_history_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(document_id): Path<i64>,
) -> Result<Json<Vec<QuizAttemptResponse>>, ApiError> {
    let attempts = state.store.quiz_history(document_id, user.id).await?;
    Ok(Json(
        attempts.into_iter().map(QuizAttemptResponse::from).collect(),
    ))
}

/// Clear a document's chat history.
#[utoipa::path(
    delete,
    path = "/documents/{document_id}/chat",
    params(("document_id" = i64, Path, description = "The document whose chat to clear")),
    responses(
        (status = 200, description = "Chat history cleared", body = MessageResponse),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the document's owner"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn delete_chat_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(document_id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    ensure_document_owner(&state, document_id, user.id).await?;
    state.store.delete_chat_history(document_id).await?;
    Ok(Json(MessageResponse::new(
        "Chat history deleted successfully.",
    )))
}

/// Delete all of the caller's quiz attempts for a document.
#[utoipa::path(
    delete,
    path = "/documents/{document_id}/quizzes",
    params(("document_id" = i64, Path, description = "The document whose attempts to delete")),
    responses(
        (status = 200, description = "Quiz history cleared", body = MessageResponse),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the document's owner"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn delete_quiz_history_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(document_id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    ensure_document_owner(&state, document_id, user.id).await?;
    state.store.delete_quiz_history(document_id, user.id).await?;
    Ok(Json(MessageResponse::new(
        "All quiz history for this document has been deleted.",
    )))
}

/// Delete a single quiz attempt.
#[utoipa::path(
    delete,
    path = "/quiz-attempts/{attempt_id}",
    params(("attempt_id" = i64, Path, description = "The attempt to delete")),
    responses(
        (status = 200, description = "Attempt deleted", body = MessageResponse),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the attempt's owner"),
        (status = 404, description = "Attempt not found")
    )
)]
pub async fn delete_quiz_attempt_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(attempt_id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.delete_quiz_attempt(attempt_id, user.id).await?;
    Ok(Json(MessageResponse::new(
        "Quiz attempt deleted successfully.",
    )))
}

/// Delete several quiz attempts in one request. All listed attempts must
/// belong to the caller or nothing is deleted.
#[utoipa::path(
    post,
    path = "/quiz-attempts/delete-multiple",
    request_body = DeleteAttemptsRequest,
    responses(
        (status = 200, description = "Attempts deleted", body = MessageResponse),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "One or more attempts are not the caller's")
    )
)]
pub async fn delete_multiple_attempts_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<DeleteAttemptsRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = state
        .store
        .delete_quiz_attempts(&req.attempt_ids, user.id)
        .await?;
    Ok(Json(MessageResponse::new(format!(
        "{} quiz attempts deleted successfully.",
        deleted
    ))))
}
