use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::handlers::upload::PageError;
use crate::state::AppState;
use crate::ui::page::UPLOAD_PATH;

/// Bounds the number of conversions running at once.
pub struct RequestLimiter {
    semaphore: Semaphore,
    max_requests: usize,
    total_requests: AtomicU64,
    rejected_requests: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterMetrics {
    pub total_requests: u64,
    pub rejected_requests: u64,
    pub available_permits: usize,
    pub max_requests: usize,
}

impl RequestLimiter {
    pub fn new(max_requests: usize) -> Self {
        info!(max_concurrent_requests = max_requests, "Initializing request limiter");
        Self {
            semaphore: Semaphore::new(max_requests),
            max_requests,
            total_requests: AtomicU64::new(0),
            rejected_requests: AtomicU64::new(0),
        }
    }

    pub fn try_acquire(&self) -> AppResult<SemaphorePermit<'_>> {
        let total = self.total_requests.fetch_add(1, Ordering::Relaxed) + 1;

        self.semaphore.try_acquire().map_err(|_| {
            let rejected = self.rejected_requests.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(
                total_requests = total,
                rejected_requests = rejected,
                "Rate limit exceeded - too many concurrent requests"
            );
            AppError::RateLimitExceeded
        })
    }

    pub fn metrics(&self) -> LimiterMetrics {
        LimiterMetrics {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            rejected_requests: self.rejected_requests.load(Ordering::Relaxed),
            available_permits: self.semaphore.available_permits(),
            max_requests: self.max_requests,
        }
    }
}

/// Limits POST requests; page loads and health checks pass straight through.
///
/// Rejected form uploads get the upload page back with a flash banner, other
/// routes get the JSON error envelope.
pub async fn rate_limit_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if request.method() != Method::POST {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    let _permit = match state.limiter.try_acquire() {
        Ok(permit) => permit,
        Err(e) if path == UPLOAD_PATH => return PageError(e).into_response(),
        Err(e) => return e.into_response(),
    };

    debug!(
        path = %path,
        available_permits = state.limiter.metrics().available_permits,
        "Request permit acquired"
    );

    next.run(request).await
}
