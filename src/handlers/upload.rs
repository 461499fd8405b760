use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{is_valid_extension, UploadedFile};
use crate::state::AppState;
use crate::ui::controller::FILE_FIELD;
use crate::ui::page::{render_index, Flash};

/// Error rendered as the upload page with a flash banner.
pub struct PageError(pub AppError);

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        PageError(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        error!(
            error_code = self.0.error_code(),
            status_code = %status,
            error_message = %self.0,
            "Upload failed"
        );
        let flash = Flash::error(self.0.flash_message());
        (status, Html(render_index(Some(&flash)))).into_response()
    }
}

/// `POST /upload`: converts the document to a workbook download.
pub async fn upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, PageError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string()[..8].to_string();

    info!(request_id = %request_id, "Starting workbook conversion request");

    let mut multipart = multipart.map_err(|rejection| {
        warn!(request_id = %request_id, rejection = %rejection.body_text(), "Request is not a multipart upload");
        AppError::MissingFile
    })?;

    let file = read_upload(&mut multipart, state.config.max_file_size_mb).await?;
    info!(
        request_id = %request_id,
        file_name = %file.name,
        file_size = file.size,
        "File extracted from multipart form"
    );

    let download = state.converter.to_workbook(file).await?;

    info!(
        request_id = %request_id,
        download = %download.file_name,
        total_time_ms = start.elapsed().as_millis() as u64,
        "Request completed successfully"
    );
    Ok(download.into_response())
}

/// Reads the `file` field and applies the same checks as the upload page.
pub async fn read_upload(multipart: &mut Multipart, max_file_size_mb: usize) -> AppResult<UploadedFile> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::UploadTooLarge { limit: max_file_size_mb }
        } else {
            AppError::InvalidFile {
                message: format!("Failed to read multipart field: {}", e),
            }
        }
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("").to_string();
        if file_name.is_empty() {
            return Err(AppError::NoFileSelected);
        }
        if !is_valid_extension(&file_name) {
            return Err(AppError::InvalidFile {
                message: format!("{} is not a .docx document", file_name),
            });
        }

        let content_type = field.content_type().map(|ct| ct.to_string());

        let data = field.bytes().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::UploadTooLarge { limit: max_file_size_mb }
            } else {
                AppError::InvalidFile {
                    message: format!("Failed to read file data: {}", e),
                }
            }
        })?;

        // Extension is fine; the conversion is what cannot proceed.
        if data.is_empty() {
            return Err(AppError::document(format!("{} is empty", file_name)));
        }

        let max_size_bytes = max_file_size_mb * 1024 * 1024;
        if data.len() > max_size_bytes {
            return Err(AppError::FileTooLarge {
                size: data.len() / (1024 * 1024),
                limit: max_file_size_mb,
            });
        }

        let file = UploadedFile::new(file_name, data);

        debug!(
            "Extracted file: {} ({} bytes, type: {:?})",
            file.name,
            file.size,
            content_type
        );
        return Ok(file);
    }

    Err(AppError::MissingFile)
}
