//! Periodic deletion of expired refresh-token sessions.
//!
//! Expired rows are already unusable (`find_valid` ignores them); sweeping
//! them only keeps `user_sessions` small.

use std::sync::Arc;
use std::time::Duration;

use resumate_db::store::SessionStore;
use tokio_util::sync::CancellationToken;

/// Run the sweep loop until `cancel` is triggered.
///
/// The first sweep happens immediately.
pub async fn run(sessions: Arc<dyn SessionStore>, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Session cleanup job started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = interval.tick() => {
                sweep(sessions.as_ref()).await;
            }
        }
    }
}

/// Delete expired sessions once, logging the outcome. Returns rows deleted.
pub async fn sweep(sessions: &dyn SessionStore) -> u64 {
    match sessions.delete_expired().await {
        Ok(deleted) => {
            if deleted > 0 {
                tracing::info!(deleted, "Session cleanup: purged expired sessions");
            } else {
                tracing::debug!("Session cleanup: nothing to purge");
            }
            deleted
        }
        Err(e) => {
            tracing::error!(error = %e, "Session cleanup failed");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use resumate_db::models::session::CreateSession;
    use resumate_db::store::MemorySessionStore;

    use super::*;

    #[tokio::test]
    async fn sweep_removes_only_expired_rows() {
        let store = MemorySessionStore::new();
        store
            .create(&CreateSession {
                user_id: 1,
                token_hash: "stale".into(),
                expires_at: Utc::now() - chrono::Duration::seconds(1),
            })
            .await
            .unwrap();
        store
            .create(&CreateSession {
                user_id: 1,
                token_hash: "live".into(),
                expires_at: Utc::now() + chrono::Duration::days(1),
            })
            .await
            .unwrap();

        assert_eq!(sweep(&store).await, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn run_stops_when_cancelled() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(store, Duration::from_secs(3600), cancel.clone()));

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("cleanup loop should stop after cancellation")
            .unwrap();
    }
}
