//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use study_buddy_core::ports::CoreError;

use crate::error::ApiError;
use crate::web::state::AppState;

/// Pulls the session ID out of the `Cookie` header, if one is present.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
}

/// Middleware that validates the auth session cookie and extracts the user.
///
/// If valid, inserts the `User` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Parse the session ID from the cookie header
    let session_id = session_id_from_headers(req.headers())
        .ok_or(ApiError::Core(CoreError::AuthenticationRequired))?
        .to_string();

    // 2. Validate the auth session in the database, get the user
    let user = state.store.validate_auth_session(&session_id).await?;

    // 3. Insert the user into request extensions
    req.extensions_mut().insert(user);

    // 4. Continue to the handler
    Ok(next.run(req).await)
}

/// Middleware that attaches the user when a valid session cookie is present
/// but lets the request through anonymously otherwise. Used on routes that
/// work for guests and simply record ownership for logged-in users.
pub async fn resolve_user(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let session_id = session_id_from_headers(req.headers()).map(str::to_string);
    if let Some(session_id) = session_id {
        if let Ok(user) = state.store.validate_auth_session(&session_id).await {
            req.extensions_mut().insert(user);
        }
    }
    next.run(req).await
}
