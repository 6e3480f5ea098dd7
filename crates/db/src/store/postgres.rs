//! Postgres-backed stores delegating to the repositories.

use async_trait::async_trait;
use resumate_core::types::DbId;

use crate::models::session::{CreateSession, Session};
use crate::models::user::{CreateUser, User};
use crate::repositories::{SessionRepo, UserRepo};
use crate::store::{AccountStore, SessionStore, StoreError};
use crate::DbPool;

/// [`SessionStore`] over the `user_sessions` table.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: DbPool,
}

impl PgSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, input: &CreateSession) -> Result<Session, StoreError> {
        Ok(SessionRepo::create(&self.pool, input).await?)
    }

    async fn find_valid(
        &self,
        user_id: DbId,
        token_hash: &str,
    ) -> Result<Option<Session>, StoreError> {
        Ok(SessionRepo::find_valid(&self.pool, user_id, token_hash).await?)
    }

    async fn delete_by_hash(&self, user_id: DbId, token_hash: &str) -> Result<bool, StoreError> {
        Ok(SessionRepo::delete_by_hash(&self.pool, user_id, token_hash).await?)
    }

    async fn delete_all_for_user(&self, user_id: DbId) -> Result<u64, StoreError> {
        Ok(SessionRepo::delete_all_for_user(&self.pool, user_id).await?)
    }

    async fn rotate(
        &self,
        user_id: DbId,
        old_hash: &str,
        next: &CreateSession,
    ) -> Result<Option<Session>, StoreError> {
        Ok(SessionRepo::rotate(&self.pool, user_id, old_hash, next).await?)
    }

    async fn delete_expired(&self) -> Result<u64, StoreError> {
        Ok(SessionRepo::delete_expired(&self.pool).await?)
    }
}

/// [`AccountStore`] over the `users` table.
#[derive(Clone)]
pub struct PgAccountStore {
    pool: DbPool,
}

impl PgAccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(&self, input: &CreateUser) -> Result<User, StoreError> {
        Ok(UserRepo::create(&self.pool, input).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_email(&self.pool, email).await?)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }
}
