use std::sync::Arc;

use resumate_db::store::AccountStore;

use crate::auth::rotation::SessionManager;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (cookie attributes, token lifetimes).
    pub config: Arc<ServerConfig>,
    /// Account lookups for sign-up, sign-in and `/me`.
    pub accounts: Arc<dyn AccountStore>,
    /// Session start / rotation / logout over the session store.
    pub auth: SessionManager,
}
