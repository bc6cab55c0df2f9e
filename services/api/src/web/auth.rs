//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, and logout.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use study_buddy_core::ports::CoreError;

use crate::error::ApiError;
use crate::web::middleware::session_id_from_headers;
use crate::web::state::AppState;

/// How long a login session stays valid.
const SESSION_DAYS: i64 = 30;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: i64,
    pub email: String,
}

fn session_cookie(session_id: &str, max_age_seconds: i64) -> String {
    format!(
        "session={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        session_id, max_age_seconds
    )
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?
        .to_string();

    // 2. Create the user. A unique-constraint failure means the email is taken.
    let user = state
        .store
        .create_user(&req.email, &password_hash)
        .await
        .map_err(|e| match &e {
            CoreError::Store(msg) if msg.contains("UNIQUE constraint failed") => {
                ApiError::Conflict("Email already registered".to_string())
            }
            _ => ApiError::from(e),
        })?;

    // 3. Open a session for the new user right away
    let session_id = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::days(SESSION_DAYS);
    state
        .store
        .create_auth_session(&session_id, user.id, expires_at)
        .await?;

    // 4. Return the response with the session cookie
    let cookie = session_cookie(&session_id, Duration::days(SESSION_DAYS).num_seconds());
    let response = AuthResponse {
        user_id: user.id,
        email: user.email,
    };
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(response),
    ))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Look up the stored credentials. An unknown email reads the same as a
    //    bad password so the endpoint does not leak which emails exist.
    let creds = state
        .store
        .get_user_credentials(&req.email)
        .await
        .map_err(|_| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    // 2. Verify the password against the stored hash
    let parsed_hash = PasswordHash::new(&creds.password_hash)
        .map_err(|e| ApiError::Internal(format!("Failed to parse password hash: {}", e)))?;
    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    // 3. Open a fresh session
    let session_id = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::days(SESSION_DAYS);
    state
        .store
        .create_auth_session(&session_id, creds.id, expires_at)
        .await?;

    // 4. Return the response with the session cookie
    let cookie = session_cookie(&session_id, Duration::days(SESSION_DAYS).num_seconds());
    let response = AuthResponse {
        user_id: creds.id,
        email: creds.email,
    };
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(response)))
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Parse the session ID from the cookie
    let session_id = session_id_from_headers(&headers)
        .ok_or_else(|| ApiError::Unauthorized("No session found".to_string()))?;

    // 2. Delete the auth session from the database
    state.store.delete_auth_session(session_id).await?;

    // 3. Clear the cookie
    let cookie = session_cookie("", 0);
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)]))
}
