use std::sync::Arc;

use santa_core::draw::DrawSynchronizer;
use santa_core::store::EventStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Event storage (PostgreSQL or in-memory).
    pub store: Arc<dyn EventStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Draw synchronizer bound to this state's store and solver settings.
    pub fn synchronizer(&self) -> DrawSynchronizer<'_> {
        DrawSynchronizer::new(self.store.as_ref(), self.config.draw)
    }
}
