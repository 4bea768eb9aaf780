use std::sync::Arc;

use crate::config::Config;
use crate::services::CompletionBackend;

/// Shared, read-only application state.
///
/// The completion backend is constructed once at startup and reused across
/// requests; nothing mutates it afterwards, so concurrent reads need no
/// synchronization beyond the `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: Arc<dyn CompletionBackend>,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            config: Arc::new(config),
            backend,
        }
    }
}
