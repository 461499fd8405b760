use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::error::{AppError, AppResult};
use crate::models::{Download, UploadedFile, XLSX_MIME_TYPE, ZIP_MIME_TYPE};
use crate::services::docx_reader::DocxReader;
use crate::services::{exercise_parser, text_files, workbook};

/// Turns uploaded exercise documents into downloadable outputs.
#[derive(Debug, Clone)]
pub struct DocumentConverter {
    timeout: Duration,
}

impl DocumentConverter {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Converts the document into the `ex_data` / `qa_data` workbook.
    pub async fn to_workbook(&self, file: UploadedFile) -> AppResult<Download> {
        let file_name = format!("{}.xlsx", file.stem());
        tracing::info!(
            "Starting workbook conversion for file: {} ({} bytes)",
            file.name,
            file.size
        );

        let content = self
            .run_blocking(file, |paragraphs| {
                let exercises = exercise_parser::extract_exercises(paragraphs);
                let questions = exercise_parser::extract_questions(paragraphs);
                tracing::info!(
                    exercises = exercises.len(),
                    questions = questions.len(),
                    "Extraction summary"
                );
                workbook::build(&exercises, &questions)
            })
            .await?;

        Ok(Download::new(file_name, XLSX_MIME_TYPE, content))
    }

    /// Packs the document's code blocks into a zip of text files.
    pub async fn to_text_files(&self, file: UploadedFile) -> AppResult<Download> {
        tracing::info!(
            "Starting text file generation for file: {} ({} bytes)",
            file.name,
            file.size
        );

        let content = self
            .run_blocking(file, |paragraphs| {
                let blocks = exercise_parser::code_blocks(paragraphs);
                text_files::build_archive(&blocks)
            })
            .await?;

        Ok(Download::new(text_files::ARCHIVE_NAME, ZIP_MIME_TYPE, content))
    }

    async fn run_blocking<F>(&self, file: UploadedFile, work: F) -> AppResult<Vec<u8>>
    where
        F: FnOnce(&[String]) -> AppResult<Vec<u8>> + Send + 'static,
    {
        if !file.is_docx() {
            return Err(AppError::InvalidFile {
                message: format!("{} is not a .docx document", file.name),
            });
        }

        let start = Instant::now();
        let task = tokio::task::spawn_blocking(move || {
            let paragraphs = DocxReader::paragraphs(&file.content)?;
            work(paragraphs.as_slice())
        });

        let content = timeout(self.timeout, task).await???;

        tracing::info!(
            processing_time_ms = start.elapsed().as_millis() as u64,
            bytes = content.len(),
            "Conversion completed"
        );
        Ok(content)
    }
}

impl Default for DocumentConverter {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}
