//! Authentication endpoints and middleware

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    http::StatusCode,
    middleware::Next,
    response::Response,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, Result};
use crate::models::{LoginRequest, LoginResponse, SignupRequest, SignupResponse};
use crate::AppState;

/// Authenticated user info stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub token: String,
}

/// Auth middleware - resolves the session token from the Authorization header
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    // Extract Bearer token
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization format".to_string()))?
        .to_string();

    // Look up the session; expired tokens resolve to nothing
    let user = state
        .db
        .get_session_user(&token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired session".to_string()))?;

    // Store authenticated user in request extensions
    request.extensions_mut().insert(AuthenticatedUser {
        user_id: user.id,
        email: user.email,
        name: user.name,
        token,
    });

    Ok(next.run(request).await)
}

/// Hash a password with Argon2id
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {e}")))
}

/// Verify a password against a stored Argon2id hash
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| ApiError::Internal(format!("Stored password hash is invalid: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>)> {
    payload.validate()?;

    if state
        .db
        .get_user_by_email(&payload.email)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "A user with this email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = state
        .db
        .create_user(&payload.name, &payload.email, &password_hash)
        .await?;

    tracing::info!("Registered new user: {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user: user.to_public(),
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let user = state
        .db
        .get_user_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let session = state.db.create_session(user.id).await?;

    Ok(Json(LoginResponse {
        token: session.token,
        user: user.to_public(),
    }))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<serde_json::Value>> {
    state.db.delete_session(&auth.token).await?;

    Ok(Json(serde_json::json!({ "logged_out": true })))
}
