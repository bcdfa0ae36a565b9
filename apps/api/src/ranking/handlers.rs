use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::pipeline::{rank_candidates, RankedCandidate, RankingRun};
use super::results::{load_latest, save_latest};
use super::tracker::ProcessingSnapshot;
use crate::analysis::Analyzer;
use crate::errors::AppError;
use crate::export::export_results;
use crate::models::{StructuredJobDescription, StructuredResume};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ProcessStoredQuery {
    pub jd_id: String,
}

#[derive(Debug, Serialize)]
pub struct ProcessStartedResponse {
    pub status: &'static str,
    pub jd_id: String,
    pub total_resumes: usize,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub jd_id: String,
    pub jd_title: String,
    pub timestamp: DateTime<Utc>,
    pub total: usize,
    pub results: Vec<RankedCandidate>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CandidateDetails {
    #[serde(flatten)]
    pub candidate: RankedCandidate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_resume: Option<StructuredResume>,
}

/// POST /api/v1/process/stored?jd_id=
/// Starts ranking every stored resume against one stored job description.
pub async fn handle_process_stored(
    State(state): State<AppState>,
    Query(params): Query<ProcessStoredQuery>,
) -> Result<Json<ProcessStartedResponse>, AppError> {
    let analyzer = state.analyzer.clone().ok_or_else(|| {
        AppError::Validation("ANTHROPIC_API_KEY is not configured; ranking is unavailable".to_string())
    })?;
    let job_description = state.storage.get_job_description(&params.jd_id)?;
    let resume_ids = state.storage.resume_file_ids()?;
    if resume_ids.is_empty() {
        return Err(AppError::Validation("No stored resumes to process".to_string()));
    }

    state
        .tracker
        .try_start(&job_description.jd_id, resume_ids.len())
        .await?;

    let response = ProcessStartedResponse {
        status: "started",
        jd_id: job_description.jd_id.clone(),
        total_resumes: resume_ids.len(),
    };

    let tracker = state.tracker.clone();
    tokio::spawn(async move {
        let job = tokio::spawn(run_ranking(state, analyzer, job_description, resume_ids));
        if let Err(e) = job.await {
            error!("Ranking task aborted: {e}");
            tracker.fail(format!("Ranking task aborted: {e}")).await;
        }
    });

    Ok(Json(response))
}

async fn run_ranking(
    state: AppState,
    analyzer: Arc<dyn Analyzer>,
    job_description: StructuredJobDescription,
    resume_ids: Vec<String>,
) {
    let run = rank_candidates(
        &job_description,
        &resume_ids,
        state.storage.as_ref(),
        analyzer.as_ref(),
        &state.scorer,
        Some(&state.tracker),
    )
    .await;

    if let Err(e) = save_latest(&state.config.output_dir, &run) {
        error!("Failed to save ranking results: {e}");
    }
    state.tracker.complete(run).await;
}

/// GET /api/v1/process/status
pub async fn handle_process_status(State(state): State<AppState>) -> Json<ProcessingSnapshot> {
    Json(state.tracker.snapshot().await)
}

/// The completed run of this process, else the last run saved to disk.
async fn latest_run(state: &AppState) -> Result<RankingRun, AppError> {
    if let Some(run) = state.tracker.completed_run().await {
        return Ok(run);
    }
    load_latest(&state.config.output_dir)
        .ok_or_else(|| AppError::Validation("Processing not completed".to_string()))
}

/// GET /api/v1/results
pub async fn handle_get_results(State(state): State<AppState>) -> Result<Json<ResultsResponse>, AppError> {
    let run = latest_run(&state).await?;
    Ok(Json(ResultsResponse {
        total: run.results.len(),
        jd_id: run.jd_id,
        jd_title: run.jd_title,
        timestamp: run.timestamp,
        results: run.results,
        errors: run.errors,
    }))
}

/// GET /api/v1/results/:candidate_id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(candidate_id): Path<String>,
) -> Result<Json<CandidateDetails>, AppError> {
    let run = latest_run(&state).await?;
    let candidate = run
        .candidate(&candidate_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id}")))?;
    let full_resume = state.storage.get_resume(&candidate_id).ok();
    Ok(Json(CandidateDetails {
        candidate,
        full_resume,
    }))
}

/// GET /api/v1/export/csv
pub async fn handle_export_csv(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let run = latest_run(&state).await?;
    let path = export_results(&state.config.output_dir, &run.results)?;
    let body = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    ))
}
