//! services/api/src/web/documents.rs
//!
//! Axum handlers for document upload, listing, chat history, deletion and
//! the per-document progress report.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use study_buddy_core::domain::{ChatMessage, Document, ProgressReport, User};

use crate::error::ApiError;
use crate::extract::{extract_text, TempUpload};
use crate::web::state::AppState;
use crate::web::MessageResponse;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: i64,
    pub filename: String,
    pub owner_id: Option<i64>,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            filename: document.filename,
            owner_id: document.owner_id,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ChatMessageResponse {
    pub id: i64,
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<ChatMessage> for ChatMessageResponse {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id,
            role: message.role.as_str().to_string(),
            content: message.content,
            timestamp: message.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ScoreOverTime {
    pub timestamp: DateTime<Utc>,
    pub score: f64,
}

#[derive(Serialize, ToSchema)]
pub struct ProgressReportResponse {
    pub total_quizzes_taken: i64,
    pub average_score: Option<f64>,
    pub highest_score: Option<f64>,
    pub scores_over_time: Vec<ScoreOverTime>,
}

impl From<ProgressReport> for ProgressReportResponse {
    fn from(report: ProgressReport) -> Self {
        Self {
            total_quizzes_taken: report.total_quizzes_taken,
            average_score: report.average_score,
            highest_score: report.highest_score,
            scores_over_time: report
                .scores_over_time
                .into_iter()
                .map(|p| ScoreOverTime {
                    timestamp: p.taken_at,
                    score: p.score,
                })
                .collect(),
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Upload a document and build its vector index.
///
/// Accepts a multipart/form-data request with a single `file` part. Works for
/// guests; when a session cookie is present the document is owned by that user.
#[utoipa::path(
    post,
    path = "/documents/upload",
    request_body(content_type = "multipart/form-data", description = "The PDF or DOCX file to ingest."),
    responses(
        (status = 201, description = "Document ingested successfully", body = DocumentResponse),
        (status = 400, description = "Malformed multipart request"),
        (status = 415, description = "Unsupported file format"),
        (status = 422, description = "No text could be extracted"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    user: Option<Extension<User>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Pull the file part out of the form
    let mut file_part = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart data: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("untitled").to_string();
            let content_type = field
                .content_type()
                .ok_or_else(|| {
                    ApiError::BadRequest("File part is missing a content type".to_string())
                })?
                .to_string();
            let data = field.bytes().await.map_err(|e| {
                ApiError::BadRequest(format!("Failed to read file bytes: {}", e))
            })?;
            file_part = Some((filename, content_type, data));
            break;
        }
    }
    let (filename, content_type, data) = file_part.ok_or_else(|| {
        ApiError::BadRequest("Multipart form must include a 'file' part".to_string())
    })?;

    // 2. Spool the upload to disk and extract its text
    let upload = TempUpload::write(&state.config.upload_dir, &data).await?;
    let text = extract_text(upload.path(), &content_type).await?;

    // 3. Chunk, embed and persist
    let owner_id = user.map(|Extension(u)| u.id);
    let document = state.ingestor.ingest(&filename, &text, owner_id).await?;

    Ok((StatusCode::CREATED, Json(DocumentResponse::from(document))))
}

/// List the caller's documents, newest first.
#[utoipa::path(
    get,
    path = "/documents",
    responses(
        (status = 200, description = "The caller's documents", body = [DocumentResponse]),
        (status = 401, description = "Authentication required")
    )
)]
pub async fn list_documents_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<DocumentResponse>>, ApiError> {
    let documents = state.store.list_documents(user.id).await?;
    Ok(Json(
        documents.into_iter().map(DocumentResponse::from).collect(),
    ))
}

/// Fetch a document's chat history, oldest message first.
#[utoipa::path(
    get,
    path = "/documents/{document_id}/history",
    params(("document_id" = i64, Path, description = "The document whose history to fetch")),
    responses(
        (status = 200, description = "The stored conversation", body = [ChatMessageResponse])
    )
)]
pub async fn history_handler(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<i64>,
) -> Result<Json<Vec<ChatMessageResponse>>, ApiError> {
    let messages = state.store.chat_history(document_id).await?;
    Ok(Json(
        messages.into_iter().map(ChatMessageResponse::from).collect(),
    ))
}

/// Delete a document along with its chat history, quizzes, flashcards and index.
#[utoipa::path(
    delete,
    path = "/documents/{document_id}",
    params(("document_id" = i64, Path, description = "The document to delete")),
    responses(
        (status = 200, description = "Document deleted", body = MessageResponse),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the document's owner"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn delete_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(document_id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.ingestor.delete(document_id, user.id).await?;
    Ok(Json(MessageResponse::new(
        "Document and all associated data deleted successfully.",
    )))
}

/// Aggregate the caller's quiz performance on one document.
#[utoipa::path(
    get,
    path = "/documents/{document_id}/progress-report",
    params(("document_id" = i64, Path, description = "The document to report on")),
    responses(
        (status = 200, description = "Quiz performance summary", body = ProgressReportResponse),
        (status = 401, description = "Authentication required")
    )
)]
pub async fn progress_report_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(document_id): Path<i64>,
) -> Result<Json<ProgressReportResponse>, ApiError> {
    let report = state.store.progress_report(document_id, user.id).await?;
    Ok(Json(ProgressReportResponse::from(report)))
}
