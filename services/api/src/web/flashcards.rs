//! services/api/src/web/flashcards.rs
//!
//! Axum handlers for generating and managing flashcard sets.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use study_buddy_core::domain::{FlashcardSet, User};

use crate::error::ApiError;
use crate::web::interactions::DocumentRequest;
use crate::web::state::AppState;
use crate::web::ensure_document_owner;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct FlashcardResponse {
    pub id: i64,
    pub set_id: i64,
    pub term: String,
    pub definition: String,
}

#[derive(Serialize, ToSchema)]
pub struct FlashcardSetResponse {
    pub id: i64,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub cards: Vec<FlashcardResponse>,
}

impl From<FlashcardSet> for FlashcardSetResponse {
    fn from(set: FlashcardSet) -> Self {
        Self {
            id: set.id,
            title: set.title,
            timestamp: set.created_at,
            cards: set
                .cards
                .into_iter()
                .map(|c| FlashcardResponse {
                    id: c.id,
                    set_id: c.set_id,
                    term: c.term,
                    definition: c.definition,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct DeleteSetsRequest {
    pub set_ids: Vec<i64>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Generate a ten-card flashcard set from a document and store it.
#[utoipa::path(
    post,
    path = "/flashcards/generate",
    request_body = DocumentRequest,
    responses(
        (status = 200, description = "The stored flashcard set", body = FlashcardSetResponse),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Document, index or content not found"),
        (status = 502, description = "Model reply failed validation")
    )
)]
pub async fn generate_flashcards_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<DocumentRequest>,
) -> Result<Json<FlashcardSetResponse>, ApiError> {
    let set = state.flashcards.generate(req.document_id, user.id).await?;
    Ok(Json(FlashcardSetResponse::from(set)))
}

/// List the caller's flashcard sets for a document, newest first.
#[utoipa::path(
    get,
    path = "/flashcards/document/{document_id}",
    params(("document_id" = i64, Path, description = "The document whose sets to list")),
    responses(
        (status = 200, description = "The caller's flashcard sets", body = [FlashcardSetResponse]),
        (status = 401, description = "Authentication required")
    )
)]
pub async fn list_flashcard_sets_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(document_id): Path<i64>,
) -> Result<Json<Vec<FlashcardSetResponse>>, ApiError> {
    let sets = state.store.flashcard_sets(document_id, user.id).await?;
    Ok(Json(
        sets.into_iter().map(FlashcardSetResponse::from).collect(),
    ))
}

/// Delete a single flashcard set.
#[utoipa::path(
    delete,
    path = "/flashcards/set/{set_id}",
    params(("set_id" = i64, Path, description = "The set to delete")),
    responses(
        (status = 204, description = "Set deleted"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the set's owner"),
        (status = 404, description = "Set not found")
    )
)]
pub async fn delete_flashcard_set_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(set_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_flashcard_set(set_id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete several flashcard sets in one request. All listed sets must belong
/// to the caller or nothing is deleted.
#[utoipa::path(
    post,
    path = "/flashcards/delete-multiple",
    request_body = DeleteSetsRequest,
    responses(
        (status = 204, description = "Sets deleted"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "One or more sets are not the caller's")
    )
)]
pub async fn delete_multiple_flashcard_sets_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<DeleteSetsRequest>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_flashcard_sets(&req.set_ids, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete all of the caller's flashcard sets for a document.
#[utoipa::path(
    delete,
    path = "/flashcards/document/{document_id}/all",
    params(("document_id" = i64, Path, description = "The document whose sets to delete")),
    responses(
        (status = 204, description = "Sets deleted"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the document's owner"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn delete_all_flashcard_sets_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(document_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    ensure_document_owner(&state, document_id, user.id).await?;
    state
        .store
        .delete_all_flashcard_sets(document_id, user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
