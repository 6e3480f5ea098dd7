//! Refresh-token sessions: start, rotate with reuse detection, end.
//!
//! Every refresh token belongs to a lineage backed by one `user_sessions` row
//! keyed by the token's SHA-256 digest. Presenting a token rotates the lineage
//! (old row deleted, new row inserted, atomically). Presenting a token whose
//! row is gone is treated as replay of a stolen token and revokes every
//! session of the user:
//!
//! ```text
//! ISSUED --(used once, valid)--> ROTATED (old deleted, new ISSUED)
//! ISSUED --(used again)--------> REUSE_DETECTED --> ALL_SESSIONS_REVOKED
//! ```
//!
//! An expired-and-swept row is indistinguishable from a rotated one, so both
//! take the revocation branch.

use std::sync::Arc;

use resumate_core::hashing::hash_token;
use resumate_core::types::{DbId, Timestamp};
use resumate_db::models::session::CreateSession;
use resumate_db::store::{AccountStore, SessionStore, StoreError};

use crate::auth::jwt::TokenService;
use crate::auth::AuthError;

/// Access + refresh tokens handed back to the client.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub user_id: DbId,
    pub access_token: String,
    pub refresh_token: String,
    /// When the refresh token (and its session row) expires.
    pub refresh_expires_at: Timestamp,
}

/// Failure of a session operation.
#[derive(Debug, thiserror::Error)]
pub enum RotationError {
    /// The presented token was refused; the client must sign in again.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The session or account store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Token signing failed.
    #[error("Token generation error: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Coordinates the token service with the session and account stores.
///
/// Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct SessionManager {
    tokens: Arc<TokenService>,
    sessions: Arc<dyn SessionStore>,
    accounts: Arc<dyn AccountStore>,
}

impl SessionManager {
    pub fn new(
        tokens: Arc<TokenService>,
        sessions: Arc<dyn SessionStore>,
        accounts: Arc<dyn AccountStore>,
    ) -> Self {
        Self {
            tokens,
            sessions,
            accounts,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Open a new lineage for a freshly authenticated user.
    pub async fn start_session(
        &self,
        user_id: DbId,
        role: &str,
    ) -> Result<TokenPair, RotationError> {
        let (pair, next) = self.issue_pair(user_id, role)?;
        let session = self.sessions.create(&next).await?;

        tracing::info!(user_id, session_id = session.id, "Session started");
        Ok(pair)
    }

    /// Exchange a refresh token for a new pair, retiring the presented one.
    ///
    /// Fails with [`AuthError::InvalidToken`] before touching the store when
    /// the token does not verify, and with [`AuthError::RefreshReuseDetected`]
    /// (after deleting every session of the user) when its lineage is gone.
    pub async fn rotate(&self, raw_token: &str) -> Result<TokenPair, RotationError> {
        let claims = self.tokens.verify_refresh_token(raw_token)?;
        let user_id = claims.sub;
        let old_hash = hash_token(raw_token);

        if self.sessions.find_valid(user_id, &old_hash).await?.is_none() {
            return Err(self.revoke_on_reuse(user_id).await?);
        }

        let Some(user) = self.accounts.find_by_id(user_id).await? else {
            let deleted = self.sessions.delete_all_for_user(user_id).await?;
            tracing::warn!(user_id, deleted, "Refresh for missing account; sessions deleted");
            return Err(AuthError::InvalidToken.into());
        };

        let (pair, next) = self.issue_pair(user_id, &user.role)?;

        match self.sessions.rotate(user_id, &old_hash, &next).await? {
            Some(session) => {
                tracing::info!(user_id, session_id = session.id, "Refresh token rotated");
                Ok(pair)
            }
            // A concurrent request rotated the same token first.
            None => Err(self.revoke_on_reuse(user_id).await?),
        }
    }

    /// Delete the lineage of the presented token only.
    ///
    /// Returns whether a session row was removed. Reuse detection does not
    /// apply: logging out a stolen token still removes its lineage.
    pub async fn end_session(&self, raw_token: &str) -> Result<bool, RotationError> {
        let claims = self.tokens.verify_refresh_token(raw_token)?;
        let deleted = self
            .sessions
            .delete_by_hash(claims.sub, &hash_token(raw_token))
            .await?;

        tracing::info!(user_id = claims.sub, deleted, "Session ended");
        Ok(deleted)
    }

    /// Delete every session of the user (sign out of all devices).
    pub async fn end_all_sessions(&self, user_id: DbId) -> Result<u64, RotationError> {
        let deleted = self.sessions.delete_all_for_user(user_id).await?;
        tracing::info!(user_id, deleted, "All sessions ended");
        Ok(deleted)
    }

    async fn revoke_on_reuse(&self, user_id: DbId) -> Result<RotationError, RotationError> {
        let deleted = self.sessions.delete_all_for_user(user_id).await?;
        tracing::warn!(
            user_id,
            deleted,
            "Refresh token reuse detected; all sessions revoked"
        );
        Ok(AuthError::RefreshReuseDetected.into())
    }

    fn issue_pair(
        &self,
        user_id: DbId,
        role: &str,
    ) -> Result<(TokenPair, CreateSession), RotationError> {
        let access_token = self.tokens.issue_access_token(user_id, role)?;
        let refresh = self.tokens.issue_refresh_token(user_id)?;

        let next = CreateSession {
            user_id,
            token_hash: hash_token(&refresh.token),
            expires_at: refresh.expires_at,
        };
        let pair = TokenPair {
            user_id,
            access_token,
            refresh_token: refresh.token,
            refresh_expires_at: refresh.expires_at,
        };
        Ok((pair, next))
    }
}
