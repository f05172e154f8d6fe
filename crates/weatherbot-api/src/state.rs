//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use weatherbot_chat::SessionRegistry;
use weatherbot_core::WeatherbotConfig;

/// Shared application state.
///
/// Cloned into every handler; all fields are behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<WeatherbotConfig>,
    /// Every live chat session.
    pub registry: Arc<SessionRegistry>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: WeatherbotConfig, registry: SessionRegistry) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            start_time: Instant::now(),
        }
    }
}
