use std::sync::Arc;

use crate::config::Config;
use crate::engagement::EngagementStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Document store backing every engagement collection.
    /// PostgreSQL in production, in-memory for `STORE_BACKEND=memory` and tests.
    pub store: Arc<dyn EngagementStore>,
    pub config: Config,
}
