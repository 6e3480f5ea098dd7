//! Storage abstractions used by the authentication flow.
//!
//! - [`SessionStore`] -- durable bookkeeping of valid refresh-token hashes.
//! - [`AccountStore`] -- the account lookups sign-in and refresh depend on.
//!
//! Both have a Postgres implementation ([`postgres`]) backed by the
//! repositories and an in-process implementation ([`memory`]).

use async_trait::async_trait;
use resumate_core::types::DbId;

use crate::models::session::{CreateSession, Session};
use crate::models::user::{CreateUser, User};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryAccountStore, MemorySessionStore};
pub use postgres::{PgAccountStore, PgSessionStore};

/// Errors raised by a store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness rule was violated.
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Durable record of which refresh-token hashes are currently valid.
///
/// `rotate` is the only compound operation and must be atomic per lineage:
/// no observer may see both the old and the new row valid, or neither.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session. Fails with [`StoreError::Conflict`] (or a unique
    /// violation) if the `(user_id, token_hash)` pair already exists.
    async fn create(&self, input: &CreateSession) -> Result<Session, StoreError>;

    /// Return the session only if it exists and has not expired.
    async fn find_valid(
        &self,
        user_id: DbId,
        token_hash: &str,
    ) -> Result<Option<Session>, StoreError>;

    /// Delete one lineage. Idempotent; returns whether a row was removed.
    async fn delete_by_hash(&self, user_id: DbId, token_hash: &str) -> Result<bool, StoreError>;

    /// Delete every session for the user, returning how many were removed.
    async fn delete_all_for_user(&self, user_id: DbId) -> Result<u64, StoreError>;

    /// Atomically delete the unexpired row for `old_hash` and insert `next`.
    ///
    /// Returns `None` and inserts nothing if the old row was already gone.
    async fn rotate(
        &self,
        user_id: DbId,
        old_hash: &str,
        next: &CreateSession,
    ) -> Result<Option<Session>, StoreError>;

    /// Remove expired rows, returning how many were removed.
    async fn delete_expired(&self) -> Result<u64, StoreError>;
}

/// Account lookups consumed by the authentication flow.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account. Duplicate emails are a conflict.
    async fn create(&self, input: &CreateUser) -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError>;
}
