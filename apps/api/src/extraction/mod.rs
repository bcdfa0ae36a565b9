//! Plain-text extraction for raw resume and job-description files.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

pub const MAX_PDF_BYTES: u64 = 50 * 1024 * 1024;
pub const MAX_TEXT_BYTES: u64 = 10 * 1024 * 1024;

const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("{kind} file too large ({size} bytes, max {max})")]
    TooLarge { kind: FileKind, size: u64, max: u64 },

    #[error("Invalid PDF header")]
    InvalidPdf,

    #[error("Invalid JSON format: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("No text could be extracted from {0}")]
    EmptyText(String),

    #[error("Error reading file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Json,
    Txt,
}

impl FileKind {
    /// Classifies by extension, case-insensitively.
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Ok(FileKind::Pdf),
            "json" => Ok(FileKind::Json),
            "txt" => Ok(FileKind::Txt),
            _ if ext.is_empty() => Err(ExtractError::UnsupportedFileType("(none)".to_string())),
            _ => Err(ExtractError::UnsupportedFileType(format!(".{ext}"))),
        }
    }

    pub fn max_bytes(self) -> u64 {
        match self {
            FileKind::Pdf => MAX_PDF_BYTES,
            FileKind::Json | FileKind::Txt => MAX_TEXT_BYTES,
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FileKind::Pdf => "PDF",
            FileKind::Json => "JSON",
            FileKind::Txt => "TXT",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExtractionMetadata {
    pub file_name: String,
    pub file_size: u64,
    pub num_pages: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    pub metadata: ExtractionMetadata,
}

/// Size and format checks performed before any parsing.
pub fn validate_bytes(kind: FileKind, bytes: &[u8]) -> Result<(), ExtractError> {
    let size = bytes.len() as u64;
    if size > kind.max_bytes() {
        return Err(ExtractError::TooLarge {
            kind,
            size,
            max: kind.max_bytes(),
        });
    }
    match kind {
        FileKind::Pdf if !bytes.starts_with(PDF_MAGIC) => Err(ExtractError::InvalidPdf),
        FileKind::Json => {
            serde_json::from_slice::<serde_json::Value>(bytes)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

pub fn validate_file(path: &Path) -> Result<FileKind, ExtractError> {
    let kind = FileKind::from_path(path)?;
    let size = std::fs::metadata(path)?.len();
    if size > kind.max_bytes() {
        return Err(ExtractError::TooLarge {
            kind,
            size,
            max: kind.max_bytes(),
        });
    }
    validate_bytes(kind, &std::fs::read(path)?)?;
    Ok(kind)
}

/// Validates and extracts text from an in-memory file.
pub fn extract_from_bytes(
    kind: FileKind,
    file_name: &str,
    bytes: &[u8],
) -> Result<ExtractedText, ExtractError> {
    validate_bytes(kind, bytes)?;

    let (text, num_pages) = match kind {
        FileKind::Pdf => {
            let text = pdf_extract::extract_text_from_mem(bytes)
                .map_err(|e| ExtractError::Pdf(e.to_string()))?;
            let pages = text.split('\u{c}').filter(|p| !p.trim().is_empty()).count();
            (text, pages.max(1))
        }
        FileKind::Txt | FileKind::Json => (decode_text(bytes), 1),
    };

    if text.trim().is_empty() {
        return Err(ExtractError::EmptyText(file_name.to_string()));
    }

    tracing::debug!("Extracted {} characters from {file_name}", text.len());
    Ok(ExtractedText {
        text,
        metadata: ExtractionMetadata {
            file_name: file_name.to_string(),
            file_size: bytes.len() as u64,
            num_pages,
        },
    })
}

/// Reads and extracts text from a file on disk. Blocking.
pub fn extract_text(path: &Path) -> Result<ExtractedText, ExtractError> {
    let kind = FileKind::from_path(path)?;
    let size = std::fs::metadata(path)?.len();
    if size > kind.max_bytes() {
        return Err(ExtractError::TooLarge {
            kind,
            size,
            max: kind.max_bytes(),
        });
    }
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    extract_from_bytes(kind, &file_name, &bytes)
}

/// UTF-8, falling back to Latin-1 where every byte maps to one char.
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
