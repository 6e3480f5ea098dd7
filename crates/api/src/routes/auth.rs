//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /signup      -> sign_up
/// POST /signin      -> sign_in
/// POST /refresh     -> refresh
/// POST /logout      -> logout
/// POST /logout-all  -> logout_all (requires auth)
/// GET  /me          -> me (requires auth)
/// POST /users/{user_id}/logout-all -> revoke_user_sessions (requires admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::sign_up))
        .route("/signin", post(auth::sign_in))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/logout-all", post(auth::logout_all))
        .route("/me", get(auth::me))
        .route("/users/{user_id}/logout-all", post(auth::revoke_user_sessions))
}
