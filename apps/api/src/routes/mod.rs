pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::ingest::handlers as ingest;
use crate::ranking::handlers as ranking;
use crate::state::AppState;
use crate::storage::handlers as storage;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Ingestion
        .route("/api/v1/ingest", post(ingest::handle_ingest))
        .route(
            "/api/v1/upload/resumes",
            post(ingest::handle_upload_resumes)
                .layer(DefaultBodyLimit::max(ingest::MAX_UPLOAD_BODY_BYTES)),
        )
        .route(
            "/api/v1/upload/job-description",
            post(ingest::handle_upload_job_description)
                .layer(DefaultBodyLimit::max(ingest::MAX_UPLOAD_BODY_BYTES)),
        )
        // Ranking
        .route("/api/v1/process/stored", post(ranking::handle_process_stored))
        .route("/api/v1/process/status", get(ranking::handle_process_status))
        .route("/api/v1/results", get(ranking::handle_get_results))
        .route(
            "/api/v1/results/:candidate_id",
            get(ranking::handle_get_candidate),
        )
        .route("/api/v1/export/csv", get(ranking::handle_export_csv))
        // Storage
        .route("/api/v1/storage/resumes", get(storage::handle_list_resumes))
        .route(
            "/api/v1/storage/job-descriptions",
            get(storage::handle_list_job_descriptions),
        )
        .route("/api/v1/storage/search", get(storage::handle_search))
        .route("/api/v1/storage/:file_id", delete(storage::handle_delete))
        .with_state(state)
}
