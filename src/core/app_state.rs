//! Application State Management
//!
//! AppState holds the services shared by every request handler. The store
//! inside starts closed; `main` connects it in the background so the server
//! can answer (with 503) while the backend is still coming up.

use std::sync::Arc;

use crate::core::config::Config;
use crate::storage::Store;
use crate::todo::TodoService;

/// Central application state holding all services and components
#[derive(Clone)]
pub struct AppState {
    /// Todo operations
    pub todos: Arc<TodoService>,

    /// Storage handle shared with the service
    pub store: Arc<Store>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the service onto an existing store
    pub fn new(store: Arc<Store>, config: Config) -> Self {
        let todos = Arc::new(TodoService::new(store.clone(), &config.ids));
        Self {
            todos,
            store,
            config: Arc::new(config),
        }
    }
}

/// Create AppState from configuration with a closed store
pub fn create_app_state(config: Config) -> AppState {
    tracing::info!("Creating AppState with storage type: {:?}", config.storage.storage_type);
    AppState::new(Arc::new(Store::new()), config)
}
