use std::collections::HashSet;
use std::io::{Cursor, Write};

use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{AppError, AppResult};
use crate::models::{secure_filename, CodeBlock};

pub const ARCHIVE_NAME: &str = "code_files.zip";

/// Packs every code block into a zip archive, one text file per block.
pub fn build_archive(blocks: &[CodeBlock]) -> AppResult<Vec<u8>> {
    if blocks.is_empty() {
        return Err(AppError::validation("document contains no code blocks"));
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut used = HashSet::new();

    for block in blocks {
        let name = unique_entry_name(&block.qlocation, &mut used);
        debug!(entry = %name, bytes = block.code.len(), "Adding text file");
        zip.start_file(name.as_str(), options)
            .map_err(|e| AppError::processing(format!("Failed to add {} to archive: {}", name, e)))?;
        zip.write_all(block.code.as_bytes())?;
    }

    let bytes = zip
        .finish()
        .map_err(|e| AppError::processing(format!("Failed to finish archive: {}", e)))?
        .into_inner();
    info!(files = blocks.len(), bytes = bytes.len(), "Text file archive written");
    Ok(bytes)
}

/// Sanitizes `qlocation` and appends `_2`, `_3`... before the extension on clashes.
fn unique_entry_name(qlocation: &str, used: &mut HashSet<String>) -> String {
    let mut safe = secure_filename(qlocation);
    if safe.is_empty() || safe == "txt" {
        safe = "code.txt".to_string();
    }

    let (stem, extension) = match safe.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), format!(".{}", ext)),
        _ => (safe.clone(), String::new()),
    };

    let mut candidate = safe;
    let mut counter = 2;
    while used.contains(&candidate) {
        candidate = format!("{}_{}{}", stem, counter, extension);
        counter += 1;
    }
    used.insert(candidate.clone());
    candidate
}
