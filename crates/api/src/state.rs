use std::sync::Arc;

use shelf_core::service::ItemService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the service holds its store behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Item use-case service.
    pub items: ItemService,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(items: ItemService, config: ServerConfig) -> Self {
        Self {
            items,
            config: Arc::new(config),
        }
    }
}
