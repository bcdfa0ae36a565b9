use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use super::pipeline::RankingRun;
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Idle,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessingSnapshot {
    pub status: ProcessingStatus,
    pub progress: usize,
    pub total: usize,
    pub jd_id: Option<String>,
    pub errors: Vec<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for ProcessingSnapshot {
    fn default() -> Self {
        Self {
            status: ProcessingStatus::Idle,
            progress: 0,
            total: 0,
            jd_id: None,
            errors: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    snapshot: ProcessingSnapshot,
    run: Option<RankingRun>,
}

/// Status of the single ranking job the process runs at a time.
///
/// `Idle -> Processing -> Completed | Failed`; a new job may start from any
/// state except `Processing`.
#[derive(Debug, Default)]
pub struct ProcessingTracker {
    state: RwLock<TrackerState>,
}

impl ProcessingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the job slot. Fails with `Conflict` while another job runs.
    pub async fn try_start(&self, jd_id: &str, total: usize) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        if state.snapshot.status == ProcessingStatus::Processing {
            return Err(AppError::Conflict("Processing already in progress".to_string()));
        }
        state.snapshot = ProcessingSnapshot {
            status: ProcessingStatus::Processing,
            total,
            jd_id: Some(jd_id.to_string()),
            started_at: Some(Utc::now()),
            ..Default::default()
        };
        state.run = None;
        Ok(())
    }

    pub async fn set_progress(&self, progress: usize) {
        self.state.write().await.snapshot.progress = progress;
    }

    pub async fn complete(&self, run: RankingRun) {
        let mut state = self.state.write().await;
        state.snapshot.status = ProcessingStatus::Completed;
        state.snapshot.errors = run.errors.clone();
        state.snapshot.finished_at = Some(Utc::now());
        state.run = Some(run);
    }

    pub async fn fail(&self, error: String) {
        let mut state = self.state.write().await;
        state.snapshot.status = ProcessingStatus::Failed;
        state.snapshot.errors.push(error);
        state.snapshot.finished_at = Some(Utc::now());
    }

    pub async fn snapshot(&self) -> ProcessingSnapshot {
        self.state.read().await.snapshot.clone()
    }

    /// The run from the last completed job of this process, if any.
    pub async fn completed_run(&self) -> Option<RankingRun> {
        let state = self.state.read().await;
        match state.snapshot.status {
            ProcessingStatus::Completed => state.run.clone(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run() -> RankingRun {
        RankingRun {
            jd_id: "jd".into(),
            jd_title: "t".into(),
            timestamp: Utc::now(),
            results: vec![],
            errors: vec!["resume_x.json: not found".into()],
            total_processed: 0,
            total_failed: 1,
        }
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let tracker = ProcessingTracker::new();
        assert_eq!(tracker.snapshot().await.status, ProcessingStatus::Idle);
        assert!(tracker.completed_run().await.is_none());

        tracker.try_start("jd", 3).await.unwrap();
        let snap = tracker.snapshot().await;
        assert_eq!(snap.status, ProcessingStatus::Processing);
        assert_eq!(snap.total, 3);

        tracker.set_progress(2).await;
        tracker.complete(run()).await;
        let snap = tracker.snapshot().await;
        assert_eq!(snap.status, ProcessingStatus::Completed);
        assert_eq!(snap.progress, 2);
        assert_eq!(snap.errors.len(), 1);
        assert!(tracker.completed_run().await.is_some());
    }

    #[tokio::test]
    async fn test_second_start_rejected_while_processing() {
        let tracker = ProcessingTracker::new();
        tracker.try_start("a", 1).await.unwrap();
        assert!(matches!(
            tracker.try_start("b", 1).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_restart_after_failure_clears_previous_run() {
        let tracker = ProcessingTracker::new();
        tracker.try_start("a", 1).await.unwrap();
        tracker.complete(run()).await;
        tracker.try_start("b", 2).await.unwrap();
        assert!(tracker.completed_run().await.is_none());
        tracker.fail("JD vanished".into()).await;

        let snap = tracker.snapshot().await;
        assert_eq!(snap.status, ProcessingStatus::Failed);
        assert_eq!(snap.errors, vec!["JD vanished"]);
        assert_eq!(snap.jd_id.as_deref(), Some("b"));
    }
}
