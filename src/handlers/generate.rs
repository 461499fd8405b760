use axum::extract::{multipart::MultipartRejection, Multipart, State};
use std::time::Instant;
use tracing::{error, info};

use crate::error::{AppError, AppResult};
use crate::handlers::upload::read_upload;
use crate::models::Download;
use crate::state::AppState;

/// `POST /generate-text-files`: returns the document's code blocks as a zip.
pub async fn generate_text_files_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Download> {
    let start = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string()[..8].to_string();

    info!(request_id = %request_id, "Starting text file generation request");

    let mut multipart = multipart.map_err(|rejection| AppError::validation(rejection.body_text()))?;
    let file = read_upload(&mut multipart, state.config.max_file_size_mb).await?;

    let download = match state.converter.to_text_files(file).await {
        Ok(download) => download,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Text file generation failed");
            return Err(e);
        }
    };

    info!(
        request_id = %request_id,
        bytes = download.content.len(),
        total_time_ms = start.elapsed().as_millis() as u64,
        "Text files generated"
    );
    Ok(download)
}
