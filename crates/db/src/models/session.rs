//! Refresh-token session model and DTOs.

use resumate_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A session row from the `user_sessions` table.
///
/// One row represents one refresh-token lineage. `token_hash` is the SHA-256
/// digest of the lineage's current refresh token, never the token itself.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl Session {
    /// A session is usable only while `expires_at` lies in the future.
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        self.expires_at > now
    }
}

/// DTO for creating a new session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub user_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
}
