use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::middleware::rate_limit::RequestLimiter;
use crate::services::DocumentConverter;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub converter: DocumentConverter,
    pub limiter: Arc<RequestLimiter>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let converter = DocumentConverter::new(Duration::from_secs(config.request_timeout_seconds));
        let limiter = Arc::new(RequestLimiter::new(config.max_concurrent_requests));
        Self {
            config: Arc::new(config),
            converter,
            limiter,
            started_at: Instant::now(),
        }
    }
}
