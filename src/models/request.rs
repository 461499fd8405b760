use bytes::Bytes;

/// The only extension the upload page and the server accept.
pub const ACCEPTED_EXTENSION: &str = "docx";

/// True iff `name` has a '.' and the lowercased text after the last one is `docx`.
pub fn is_valid_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, extension)) => extension.to_lowercase() == ACCEPTED_EXTENSION,
        None => false,
    }
}

/// Reduces a client-supplied file name to a safe ASCII name.
///
/// Path components are dropped, whitespace becomes `_`, anything outside
/// `[A-Za-z0-9._-]` is removed and leading dots or underscores are stripped.
/// May return an empty string.
pub fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");

    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    cleaned.trim_start_matches(['.', '_']).to_string()
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub size: usize,
    pub content: Bytes,
}

impl UploadedFile {
    pub fn new(name: String, content: Bytes) -> Self {
        let size = content.len();
        Self {
            name,
            size,
            content,
        }
    }

    pub fn is_docx(&self) -> bool {
        is_valid_extension(&self.name)
    }

    /// Sanitized file name without its extension, used for download names.
    pub fn stem(&self) -> String {
        let safe = secure_filename(&self.name);
        let stem = match safe.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => safe,
        };
        if stem.is_empty() {
            "document".to_string()
        } else {
            stem
        }
    }
}
