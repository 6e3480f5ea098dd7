//! Repository for the `user_sessions` table.

use resumate_core::types::DbId;
use sqlx::PgPool;

use crate::models::session::{CreateSession, Session};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token_hash, expires_at, created_at";

/// Provides CRUD operations for refresh-token sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    ///
    /// A second row for the same `(user_id, token_hash)` violates
    /// `uq_user_sessions_user_token`; existing rows are never overwritten.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(input.user_id)
            .bind(&input.token_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find an unexpired session for the user by refresh token hash.
    pub async fn find_valid(
        pool: &PgPool,
        user_id: DbId,
        token_hash: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_sessions
             WHERE user_id = $1
               AND token_hash = $2
               AND expires_at > NOW()"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(user_id)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Delete one session by hash. Returns `true` if a row was deleted.
    pub async fn delete_by_hash(
        pool: &PgPool,
        user_id: DbId,
        token_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM user_sessions WHERE user_id = $1 AND token_hash = $2")
                .bind(user_id)
                .bind(token_hash)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every session for a user. Returns the count of deleted rows.
    pub async fn delete_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Replace the session holding `old_hash` with a new one in a single
    /// transaction.
    ///
    /// The old row is deleted only while it is still unexpired. When nothing
    /// was deleted (already rotated by a concurrent request, or expired) the
    /// transaction is rolled back and `None` is returned without inserting.
    /// The row lock taken by `DELETE` serializes racing rotations of the same
    /// lineage: the loser re-evaluates after the winner commits and sees zero
    /// rows.
    pub async fn rotate(
        pool: &PgPool,
        user_id: DbId,
        old_hash: &str,
        next: &CreateSession,
    ) -> Result<Option<Session>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let deleted = sqlx::query(
            "DELETE FROM user_sessions
             WHERE user_id = $1 AND token_hash = $2 AND expires_at > NOW()",
        )
        .bind(user_id)
        .bind(old_hash)
        .execute(&mut *tx)
        .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO user_sessions (user_id, token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, Session>(&query)
            .bind(next.user_id)
            .bind(&next.token_hash)
            .bind(next.expires_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(session))
    }

    /// Delete expired sessions. Returns the count of deleted rows.
    pub async fn delete_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
