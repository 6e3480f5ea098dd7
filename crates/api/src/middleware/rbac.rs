//! Role checks layered on top of [`AuthUser`].
//!
//! A missing or invalid access token is still a 401 (from [`AuthUser`]); a
//! valid token whose role is not allowed is a 403.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use resumate_core::error::CoreError;
use resumate_core::roles::ROLE_ADMIN;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

impl AuthUser {
    /// Fail with 403 unless the user's role is one of `allowed`.
    pub fn require_role(&self, allowed: &[&str]) -> Result<(), AppError> {
        if allowed.contains(&self.role.as_str()) {
            Ok(())
        } else {
            Err(AppError::Core(CoreError::Forbidden(
                "Insufficient permissions".into(),
            )))
        }
    }
}

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        user.require_role(&[ROLE_ADMIN]).map_err(|_| {
            AppError::Core(CoreError::Forbidden("Admin role required".into()))
        })?;
        Ok(RequireAdmin(user))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use resumate_core::roles::ROLE_USER;

    use super::*;

    fn user(role: &str) -> AuthUser {
        AuthUser {
            user_id: 1,
            role: role.to_string(),
        }
    }

    #[test]
    fn allowed_role_passes() {
        assert!(user(ROLE_ADMIN).require_role(&[ROLE_USER, ROLE_ADMIN]).is_ok());
    }

    #[test]
    fn other_role_is_forbidden() {
        assert_matches!(
            user(ROLE_USER).require_role(&[ROLE_ADMIN]),
            Err(AppError::Core(CoreError::Forbidden(_)))
        );
    }
}
