pub mod auth;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                                     sign up (POST)
/// /auth/signin                                     sign in (POST)
/// /auth/refresh                                    rotate refresh token (POST)
/// /auth/logout                                     end one session (POST)
/// /auth/logout-all                                 end all sessions (POST, auth)
/// /auth/me                                         current user (GET, auth)
/// /auth/users/{user_id}/logout-all                 revoke a user's sessions (POST, admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/auth", auth::router())
}
