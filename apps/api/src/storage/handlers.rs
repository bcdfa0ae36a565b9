use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{RecordKind, SearchHit};
use crate::errors::AppError;
use crate::models::{StructuredJobDescription, StructuredResume};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub file_type: Option<RecordKind>,
}

#[derive(Deserialize)]
pub struct FileTypeQuery {
    pub file_type: RecordKind,
}

/// GET /api/v1/storage/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<StructuredResume>>, AppError> {
    Ok(Json(state.storage.list_resumes()?))
}

/// GET /api/v1/storage/job-descriptions
pub async fn handle_list_job_descriptions(
    State(state): State<AppState>,
) -> Result<Json<Vec<StructuredJobDescription>>, AppError> {
    Ok(Json(state.storage.list_job_descriptions()?))
}

/// GET /api/v1/storage/search?query=&file_type=
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<SearchHit>> {
    Json(state.storage.search(&params.query, params.file_type))
}

/// DELETE /api/v1/storage/:file_id?file_type=
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    Query(params): Query<FileTypeQuery>,
) -> Result<Json<Value>, AppError> {
    if !state.storage.delete(&file_id, params.file_type)? {
        return Err(AppError::NotFound(format!("File {file_id}")));
    }
    Ok(Json(json!({ "message": "File deleted successfully" })))
}
