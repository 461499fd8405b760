pub mod generate;
pub mod health;
pub mod pages;
pub mod upload;

pub use generate::*;
pub use health::*;
pub use pages::*;
pub use upload::*;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{logging_middleware, rate_limit_middleware};
use crate::state::AppState;
use crate::ui::controller::GENERATE_TEXT_FILES_PATH;
use crate::ui::page::UPLOAD_PATH;

/// Multipart framing on top of the file itself.
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_file_size_bytes() + BODY_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(index_handler))
        .route(UPLOAD_PATH, post(upload_handler))
        .route(GENERATE_TEXT_FILES_PATH, post(generate_text_files_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(logging_middleware))
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(axum::middleware::from_fn_with_state(state.clone(), rate_limit_middleware)),
        )
        .with_state(state)
}
