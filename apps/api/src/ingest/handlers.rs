use std::path::{Path, PathBuf};

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use super::ScanReport;
use crate::errors::AppError;
use crate::extraction::{validate_bytes, ExtractError, FileKind, MAX_PDF_BYTES};
use crate::state::AppState;

/// Request body limit for the upload routes. Several maximum-size PDFs fit.
pub const MAX_UPLOAD_BODY_BYTES: usize = 4 * MAX_PDF_BYTES as usize;

#[derive(Debug, Serialize)]
pub struct UploadedFile {
    pub filename: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
}

#[derive(Debug, Default, Serialize)]
pub struct UploadResponse {
    pub uploaded: usize,
    pub files: Vec<UploadedFile>,
    pub errors: Vec<String>,
}

/// POST /api/v1/ingest
/// Runs one scan pass over both raw directories.
pub async fn handle_ingest(State(state): State<AppState>) -> Result<Json<ScanReport>, AppError> {
    let mut scanner = state
        .scanner
        .try_lock()
        .map_err(|_| AppError::Conflict("An ingestion scan is already running".to_string()))?;
    Ok(Json(scanner.scan_all().await))
}

/// POST /api/v1/upload/resumes
/// Stores every valid file into the raw resume directory; invalid files are
/// reported per file. The next ingestion pass picks the new files up.
pub async fn handle_upload_resumes(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut response = UploadResponse::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("{name}: unreadable upload: {e}")))?;

        match store_upload(&state.config.resumes_raw_dir, &name, &bytes).await {
            Ok(file) => response.files.push(file),
            Err(e) => {
                tracing::warn!("Rejected resume upload {name}: {e}");
                response.errors.push(format!("{name}: {e}"));
            }
        }
    }

    response.uploaded = response.files.len();
    Ok(Json(response))
}

/// POST /api/v1/upload/job-description
/// Accepts exactly one file; an invalid file rejects the request.
pub async fn handle_upload_job_description(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadedFile>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("{name}: unreadable upload: {e}")))?;

        return store_upload(&state.config.jd_raw_dir, &name, &bytes)
            .await
            .map(Json)
            .map_err(|e| AppError::Validation(format!("{name}: {e}")));
    }
    Err(AppError::Validation("No file in upload".to_string()))
}

/// Validates an uploaded file and writes it under `dir` using only the final
/// component of the client-supplied name.
async fn store_upload(dir: &Path, name: &str, bytes: &[u8]) -> Result<UploadedFile, ExtractError> {
    let file_name = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ExtractError::UnsupportedFileType("(none)".to_string()))?;
    let kind = FileKind::from_path(Path::new(&file_name))?;
    validate_bytes(kind, bytes)?;

    let path: PathBuf = dir.join(&file_name);
    tokio::fs::write(&path, bytes).await?;
    tracing::info!("Stored upload {} ({} bytes)", path.display(), bytes.len());

    Ok(UploadedFile {
        filename: file_name,
        path: path.to_string_lossy().into_owned(),
        kind,
    })
}
