//! Handlers for the `/auth` resource (sign-up, sign-in, refresh, logout).
//!
//! The refresh token never appears in a response body: it is set as an
//! `HttpOnly` cookie. Refresh and logout read it from that cookie, or from a
//! `{"refreshToken": ...}` body when the client sends one explicitly.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use resumate_core::accounts::{normalize_email, require_credentials};
use resumate_core::error::CoreError;
use resumate_core::roles::ROLE_USER;
use resumate_core::types::DbId;
use resumate_db::models::user::{CreateUser, User};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::cookies;
use crate::auth::password::{hash_password, verify_password, DUMMY_PASSWORD_HASH};
use crate::auth::rotation::{RotationError, TokenPair};
use crate::auth::AuthError;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub password: String,
    #[validate(length(max = 200))]
    pub name: Option<String>,
}

/// Request body for `POST /auth/signin`.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Optional body for `POST /auth/refresh` and `POST /auth/logout`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenBody {
    pub refresh_token: Option<String>,
}

/// Returned by sign-up and sign-in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Returned by refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub expires_in: i64,
}

/// Public user info.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserInfo,
}

/// Returned by the admin session revocation.
#[derive(Debug, Serialize)]
pub struct RevokedResponse {
    pub revoked: u64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Create an email/password account and open its first session. Returns 201.
pub async fn sign_up(
    State(state): State<AppState>,
    Json(mut input): Json<SignUpRequest>,
) -> AppResult<Response> {
    require_credentials(&input.email, &input.password)?;
    input.email = normalize_email(&input.email);
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    if state.accounts.find_by_email(&input.email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Email already registered.".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = state
        .accounts
        .create(&CreateUser {
            email: input.email,
            name: input.name,
            password_hash,
            role: ROLE_USER.to_string(),
        })
        .await?;
    tracing::info!(user_id = user.id, "Account created");

    let pair = state.auth.start_session(user.id, &user.role).await?;
    let cookie = refresh_cookie_header(&state, &pair)?;

    Ok((StatusCode::CREATED, cookie, Json(auth_response(&state, pair, &user))).into_response())
}

/// POST /api/v1/auth/signin
///
/// Authenticate with email + password and open a new session.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(input): Json<SignInRequest>,
) -> AppResult<Response> {
    require_credentials(&input.email, &input.password)?;

    let user = state
        .accounts
        .find_by_email(&normalize_email(&input.email))
        .await?;

    // Unknown emails still pay for one Argon2 verification.
    let stored_hash = user
        .as_ref()
        .map_or(DUMMY_PASSWORD_HASH, |u| u.password_hash.as_str());
    let password_valid = verify_password(&input.password, stored_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    let Some(user) = user.filter(|_| password_valid) else {
        return Err(invalid_credentials());
    };

    let pair = state.auth.start_session(user.id, &user.role).await?;
    let cookie = refresh_cookie_header(&state, &pair)?;

    Ok((cookie, Json(auth_response(&state, pair, &user))).into_response())
}

/// POST /api/v1/auth/refresh
///
/// Rotate the presented refresh token. Every rejection is a 401 that also
/// clears the cookie; the `code` field tells `INVALID_TOKEN`,
/// `REFRESH_REUSE_DETECTED` and `MISSING_TOKEN` apart.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let Some(raw) = presented_refresh_token(&state, &headers, &body) else {
        return Ok(reject(&state, AuthError::MissingToken));
    };

    match state.auth.rotate(&raw).await {
        Ok(pair) => {
            let cookie = refresh_cookie_header(&state, &pair)?;
            let body = RefreshResponse {
                access_token: pair.access_token,
                expires_in: state.auth.tokens().access_ttl_secs(),
            };
            Ok((cookie, Json(body)).into_response())
        }
        Err(RotationError::Auth(err)) => Ok(reject(&state, err)),
        Err(err) => Err(err.into()),
    }
}

/// POST /api/v1/auth/logout
///
/// Delete the presented session and clear the cookie. Idempotent: succeeds
/// when the token is missing, unknown, or no longer verifies.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    if let Some(raw) = presented_refresh_token(&state, &headers, &body) {
        match state.auth.end_session(&raw).await {
            Ok(_) => {}
            Err(RotationError::Auth(err)) => {
                tracing::debug!(code = err.code(), "Logout with unusable refresh token");
            }
            Err(err) => return Err(err.into()),
        }
    }

    let cookie = clear_cookie_header(&state)?;
    let body = MessageResponse {
        message: "Logged out successfully.",
    };
    Ok((cookie, Json(body)).into_response())
}

/// POST /api/v1/auth/logout-all
///
/// Delete every session of the authenticated user. Returns 204 No Content.
pub async fn logout_all(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Response> {
    state.auth.end_all_sessions(auth_user.user_id).await?;
    let cookie = clear_cookie_header(&state)?;
    Ok((StatusCode::NO_CONTENT, cookie).into_response())
}

/// POST /api/v1/auth/users/{user_id}/logout-all
///
/// Admin only: delete every session of another account, forcing it to sign
/// in again on all devices.
pub async fn revoke_user_sessions(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<RevokedResponse>> {
    if state.accounts.find_by_id(user_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }));
    }

    let revoked = state.auth.end_all_sessions(user_id).await?;
    tracing::warn!(admin_id = admin.user_id, user_id, revoked, "Sessions revoked by admin");
    Ok(Json(RevokedResponse { revoked }))
}

/// GET /api/v1/auth/me
///
/// Return the account behind the presented access token.
pub async fn me(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<Json<MeResponse>> {
    let user = state
        .accounts
        .find_by_id(auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;

    Ok(Json(MeResponse {
        user: UserInfo::from(&user),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid credentials".into()))
}

fn auth_response(state: &AppState, pair: TokenPair, user: &User) -> AuthResponse {
    AuthResponse {
        access_token: pair.access_token,
        expires_in: state.auth.tokens().access_ttl_secs(),
        user: UserInfo::from(user),
    }
}

/// Body token first, then the cookie.
fn presented_refresh_token(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Option<String> {
    serde_json::from_slice::<RefreshTokenBody>(body)
        .ok()
        .and_then(|b| b.refresh_token)
        .filter(|t| !t.is_empty())
        .or_else(|| cookies::refresh_token_from_headers(headers, &state.config.cookies))
}

fn refresh_cookie_header(
    state: &AppState,
    pair: &TokenPair,
) -> AppResult<[(HeaderName, HeaderValue); 1]> {
    let max_age = state.auth.tokens().refresh_ttl().num_seconds();
    let value = cookies::refresh_cookie(&state.config.cookies, &pair.refresh_token, max_age)
        .map_err(|e| AppError::InternalError(format!("Invalid refresh cookie: {e}")))?;
    Ok([(SET_COOKIE, value)])
}

fn clear_cookie_header(state: &AppState) -> AppResult<[(HeaderName, HeaderValue); 1]> {
    let value = cookies::clear_refresh_cookie(&state.config.cookies)
        .map_err(|e| AppError::InternalError(format!("Invalid refresh cookie: {e}")))?;
    Ok([(SET_COOKIE, value)])
}

fn reject(state: &AppState, err: AuthError) -> Response {
    match clear_cookie_header(state) {
        Ok(cookie) => (cookie, AppError::Auth(err)).into_response(),
        Err(_) => AppError::Auth(err).into_response(),
    }
}
