//! Reads the body paragraphs of a `.docx` package.
//!
//! A `.docx` is a zip archive; the text lives in `word/document.xml` as
//! `w:p` paragraphs made of `w:r` runs holding `w:t` text nodes. Only
//! paragraphs that are direct children of the body are returned, so table
//! cell contents are skipped.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, info};
use zip::ZipArchive;

use crate::error::{AppError, AppResult};

const DOCUMENT_PART: &str = "word/document.xml";
const MAX_ZIP_ENTRIES: usize = 10_000;
const MAX_ENTRY_NAME_LENGTH: usize = 255;
const MAX_DOCUMENT_XML_SIZE: u64 = 64 * 1024 * 1024;

pub struct DocxReader;

impl DocxReader {
    /// Returns the text of every top-level body paragraph, in document order.
    pub fn paragraphs(content: &[u8]) -> AppResult<Vec<String>> {
        let mut archive = ZipArchive::new(Cursor::new(content))
            .map_err(|e| AppError::document(format!("not a valid .docx package: {}", e)))?;

        if archive.len() > MAX_ZIP_ENTRIES {
            return Err(AppError::document(format!(
                "archive contains too many entries ({}), maximum is {}",
                archive.len(),
                MAX_ZIP_ENTRIES
            )));
        }

        for i in 0..archive.len() {
            let entry = archive.by_index(i)?;
            validate_entry_name(entry.name())?;
        }

        let xml = {
            let part = archive
                .by_name(DOCUMENT_PART)
                .map_err(|_| AppError::document(format!("missing {}", DOCUMENT_PART)))?;
            read_limited(part, MAX_DOCUMENT_XML_SIZE)?
        };

        let paragraphs = parse_document_xml(&xml)?;
        info!(paragraphs = paragraphs.len(), "Read document paragraphs");
        Ok(paragraphs)
    }
}

fn validate_entry_name(name: &str) -> AppResult<()> {
    if name.len() > MAX_ENTRY_NAME_LENGTH {
        return Err(AppError::document(format!(
            "archive entry name too long ({} characters)",
            name.len()
        )));
    }
    if name.contains("..") || name.starts_with('/') || name.starts_with('\\') {
        return Err(AppError::document(format!(
            "archive entry has an unsafe path: '{}'",
            name
        )));
    }
    Ok(())
}

fn read_limited<R: Read>(reader: R, max_size: u64) -> AppResult<String> {
    let mut buffer = Vec::new();
    reader.take(max_size + 1).read_to_end(&mut buffer)?;

    if buffer.len() as u64 > max_size {
        return Err(AppError::document(format!(
            "{} exceeds the maximum size of {} MB",
            DOCUMENT_PART,
            max_size / (1024 * 1024)
        )));
    }

    String::from_utf8(buffer)
        .map_err(|e| AppError::document(format!("{} is not valid UTF-8: {}", DOCUMENT_PART, e)))
}

/// Walks `word/document.xml` and collects paragraph text.
pub fn parse_document_xml(xml: &str) -> AppResult<Vec<String>> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut table_depth = 0usize;
    let mut paragraph_depth = 0usize;
    let mut run_depth = 0usize;
    let mut in_text = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"tbl" => table_depth += 1,
                b"p" => {
                    if paragraph_depth == 0 {
                        current.clear();
                    }
                    paragraph_depth += 1;
                }
                b"r" => run_depth += 1,
                b"t" => in_text = true,
                _ => {}
            },
            // Only runs directly under the body paragraph count; text boxes
            // nest their own paragraphs inside a run.
            Event::Empty(ref e) => match e.local_name().as_ref() {
                b"tab" if run_depth > 0 && paragraph_depth == 1 => current.push('\t'),
                b"br" | b"cr" if run_depth > 0 && paragraph_depth == 1 => current.push('\n'),
                b"p" if paragraph_depth == 0 && table_depth == 0 => paragraphs.push(String::new()),
                _ => {}
            },
            Event::Text(e) => {
                if in_text && paragraph_depth == 1 {
                    current.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if in_text && paragraph_depth == 1 {
                    current.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                b"r" => run_depth = run_depth.saturating_sub(1),
                b"t" => in_text = false,
                b"p" => {
                    paragraph_depth = paragraph_depth.saturating_sub(1);
                    if paragraph_depth == 0 {
                        if table_depth == 0 {
                            paragraphs.push(std::mem::take(&mut current));
                        } else {
                            current.clear();
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    debug!(count = paragraphs.len(), "Parsed body paragraphs");
    Ok(paragraphs)
}
