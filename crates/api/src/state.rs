use std::sync::Arc;

use haven_events::{EventBus, Mailer};

use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub pool: haven_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Handlers publish notification events here and return immediately.
    pub event_bus: Arc<EventBus>,
    /// Account emails (activation, password reset) are sent inline.
    pub mailer: Arc<dyn Mailer>,
}
