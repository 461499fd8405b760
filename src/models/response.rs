use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

pub const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const ZIP_MIME_TYPE: &str = "application/zip";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
    pub uptime_seconds: Option<u64>,
    pub limits: LimitsInfo,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LimitsInfo {
    pub max_file_size_mb: usize,
    pub max_concurrent_requests: usize,
    pub available_permits: usize,
    pub total_requests: u64,
    pub rejected_requests: u64,
}

/// A generated file returned to the browser as an attachment.
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: String,
    pub mime_type: &'static str,
    pub content: Vec<u8>,
}

impl Download {
    pub fn new(file_name: impl Into<String>, mime_type: &'static str, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type,
            content,
        }
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }
}

impl IntoResponse for Download {
    fn into_response(self) -> Response {
        let disposition = self.content_disposition();
        (
            [
                (header::CONTENT_TYPE, self.mime_type.to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.content,
        )
            .into_response()
    }
}
