//! In-process stores used by the test suites.
//!
//! Each store keeps its rows behind a single [`Mutex`], so every trait method,
//! including [`SessionStore::rotate`], is atomic with respect to the others.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use resumate_core::types::DbId;
use tokio::sync::Mutex;

use crate::models::session::{CreateSession, Session};
use crate::models::user::{CreateUser, User};
use crate::store::{AccountStore, SessionStore, StoreError};

#[derive(Default)]
struct SessionTable {
    next_id: DbId,
    rows: HashMap<(DbId, String), Session>,
}

impl SessionTable {
    fn insert(&mut self, input: &CreateSession) -> Result<Session, StoreError> {
        let key = (input.user_id, input.token_hash.clone());
        if self.rows.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "session already exists for user {}",
                input.user_id
            )));
        }

        self.next_id += 1;
        let session = Session {
            id: self.next_id,
            user_id: input.user_id,
            token_hash: input.token_hash.clone(),
            expires_at: input.expires_at,
            created_at: Utc::now(),
        };
        self.rows.insert(key, session.clone());
        Ok(session)
    }
}

/// [`SessionStore`] held entirely in memory.
#[derive(Default)]
pub struct MemorySessionStore {
    table: Mutex<SessionTable>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held, expired ones included.
    pub async fn len(&self) -> usize {
        self.table.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, input: &CreateSession) -> Result<Session, StoreError> {
        self.table.lock().await.insert(input)
    }

    async fn find_valid(
        &self,
        user_id: DbId,
        token_hash: &str,
    ) -> Result<Option<Session>, StoreError> {
        let table = self.table.lock().await;
        let now = Utc::now();
        Ok(table
            .rows
            .get(&(user_id, token_hash.to_string()))
            .filter(|s| s.is_valid_at(now))
            .cloned())
    }

    async fn delete_by_hash(&self, user_id: DbId, token_hash: &str) -> Result<bool, StoreError> {
        let mut table = self.table.lock().await;
        Ok(table
            .rows
            .remove(&(user_id, token_hash.to_string()))
            .is_some())
    }

    async fn delete_all_for_user(&self, user_id: DbId) -> Result<u64, StoreError> {
        let mut table = self.table.lock().await;
        let before = table.rows.len();
        table.rows.retain(|(owner, _), _| *owner != user_id);
        Ok((before - table.rows.len()) as u64)
    }

    async fn rotate(
        &self,
        user_id: DbId,
        old_hash: &str,
        next: &CreateSession,
    ) -> Result<Option<Session>, StoreError> {
        let mut table = self.table.lock().await;
        let key = (user_id, old_hash.to_string());
        let now = Utc::now();

        match table.rows.get(&key) {
            Some(old) if old.is_valid_at(now) => {}
            _ => return Ok(None),
        }

        let next_key = (next.user_id, next.token_hash.clone());
        if next_key != key && table.rows.contains_key(&next_key) {
            return Err(StoreError::Conflict(format!(
                "session already exists for user {}",
                next.user_id
            )));
        }

        table.rows.remove(&key);
        table.insert(next).map(Some)
    }

    async fn delete_expired(&self) -> Result<u64, StoreError> {
        let mut table = self.table.lock().await;
        let now = Utc::now();
        let before = table.rows.len();
        table.rows.retain(|_, s| s.is_valid_at(now));
        Ok((before - table.rows.len()) as u64)
    }
}

#[derive(Default)]
struct AccountTable {
    next_id: DbId,
    rows: HashMap<DbId, User>,
}

/// [`AccountStore`] held entirely in memory.
#[derive(Default)]
pub struct MemoryAccountStore {
    table: Mutex<AccountTable>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(&self, input: &CreateUser) -> Result<User, StoreError> {
        let mut table = self.table.lock().await;
        if table.rows.values().any(|u| u.email == input.email) {
            return Err(StoreError::Conflict("Email already registered.".into()));
        }

        table.next_id += 1;
        let now = Utc::now();
        let user = User {
            id: table.next_id,
            email: input.email.clone(),
            name: input.name.clone(),
            password_hash: input.password_hash.clone(),
            role: input.role.clone(),
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let table = self.table.lock().await;
        Ok(table.rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<User>, StoreError> {
        Ok(self.table.lock().await.rows.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use chrono::Duration;

    use super::*;

    fn new_session(user_id: DbId, hash: &str) -> CreateSession {
        CreateSession {
            user_id,
            token_hash: hash.to_string(),
            expires_at: Utc::now() + Duration::days(30),
        }
    }

    fn expired_session(user_id: DbId, hash: &str) -> CreateSession {
        CreateSession {
            user_id,
            token_hash: hash.to_string(),
            expires_at: Utc::now() - Duration::minutes(1),
        }
    }

    #[tokio::test]
    async fn create_then_find_valid() {
        let store = MemorySessionStore::new();
        let created = store.create(&new_session(1, "aaa")).await.unwrap();

        let found = store.find_valid(1, "aaa").await.unwrap();
        assert_eq!(found.map(|s| s.id), Some(created.id));
    }

    #[tokio::test]
    async fn find_valid_is_scoped_to_user() {
        let store = MemorySessionStore::new();
        store.create(&new_session(1, "aaa")).await.unwrap();

        assert!(store.find_valid(2, "aaa").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_pair_is_a_conflict() {
        let store = MemorySessionStore::new();
        store.create(&new_session(1, "aaa")).await.unwrap();

        let result = store.create(&new_session(1, "aaa")).await;
        assert_matches!(result, Err(StoreError::Conflict(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn expired_rows_are_not_found() {
        let store = MemorySessionStore::new();
        store.create(&expired_session(1, "old")).await.unwrap();

        assert!(store.find_valid(1, "old").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_by_hash_is_idempotent() {
        let store = MemorySessionStore::new();
        store.create(&new_session(1, "aaa")).await.unwrap();

        assert!(store.delete_by_hash(1, "aaa").await.unwrap());
        assert!(!store.delete_by_hash(1, "aaa").await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn delete_all_for_user_leaves_other_users() {
        let store = MemorySessionStore::new();
        store.create(&new_session(1, "a1")).await.unwrap();
        store.create(&new_session(1, "a2")).await.unwrap();
        store.create(&new_session(2, "b1")).await.unwrap();

        assert_eq!(store.delete_all_for_user(1).await.unwrap(), 2);
        assert!(store.find_valid(2, "b1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn rotate_replaces_old_row() {
        let store = MemorySessionStore::new();
        store.create(&new_session(1, "old")).await.unwrap();

        let rotated = store.rotate(1, "old", &new_session(1, "new")).await.unwrap();
        assert!(rotated.is_some());
        assert!(store.find_valid(1, "old").await.unwrap().is_none());
        assert!(store.find_valid(1, "new").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn rotate_without_old_row_inserts_nothing() {
        let store = MemorySessionStore::new();

        let rotated = store.rotate(1, "gone", &new_session(1, "new")).await.unwrap();
        assert!(rotated.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn rotate_refuses_expired_old_row() {
        let store = MemorySessionStore::new();
        store.create(&expired_session(1, "old")).await.unwrap();

        let rotated = store.rotate(1, "old", &new_session(1, "new")).await.unwrap();
        assert!(rotated.is_none());
        assert!(store.find_valid(1, "new").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_rotations_of_one_lineage_have_one_winner() {
        let store = Arc::new(MemorySessionStore::new());
        store.create(&new_session(1, "old")).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .rotate(1, "old", &new_session(1, &format!("new-{i}")))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn delete_expired_keeps_live_rows() {
        let store = MemorySessionStore::new();
        store.create(&expired_session(1, "stale")).await.unwrap();
        store.create(&new_session(1, "live")).await.unwrap();

        assert_eq!(store.delete_expired().await.unwrap(), 1);
        assert!(store.find_valid(1, "live").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn accounts_reject_duplicate_email() {
        let store = MemoryAccountStore::new();
        let input = CreateUser {
            email: "jane@example.com".into(),
            name: Some("Jane".into()),
            password_hash: "$argon2id$placeholder".into(),
            role: "user".into(),
        };
        let user = store.create(&input).await.unwrap();

        assert_matches!(store.create(&input).await, Err(StoreError::Conflict(_)));
        let by_email = store.find_by_email("jane@example.com").await.unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(user.id));
        assert!(store.find_by_id(user.id + 1).await.unwrap().is_none());
    }
}
