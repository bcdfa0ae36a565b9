use std::sync::Arc;

use tokio::sync::Mutex;

use crate::analysis::Analyzer;
use crate::config::Config;
use crate::ingest::IngestionScanner;
use crate::ranking::ProcessingTracker;
use crate::scoring::HybridScorer;
use crate::storage::RecordStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn RecordStore>,
    /// Held for the whole of a scan pass, so passes never overlap.
    pub scanner: Arc<Mutex<IngestionScanner>>,
    /// `None` without an API key; ranking requests are then rejected.
    pub analyzer: Option<Arc<dyn Analyzer>>,
    pub scorer: HybridScorer,
    pub tracker: Arc<ProcessingTracker>,
}

#[cfg(test)]
pub(crate) fn test_state(root: &std::path::Path, analyzer: Option<Arc<dyn Analyzer>>) -> AppState {
    use crate::ingest::{ProcessingLedger, RawFileHandler};
    use crate::parsing::{JobDescriptionParser, ParseStrategy, ResumeParser};
    use crate::storage::LocalStorage;

    let config = crate::config::test_config(root);
    config.ensure_directories().unwrap();

    let storage: Arc<dyn RecordStore> = Arc::new(LocalStorage::new(&config.storage_path).unwrap());
    let handler = Arc::new(RawFileHandler::new(
        ResumeParser::new(ParseStrategy::RuleBased),
        JobDescriptionParser::new(ParseStrategy::RuleBased),
    ));
    let scanner = IngestionScanner::new(
        ProcessingLedger::open_file(config.ledger_path()),
        handler,
        storage.clone(),
        config.resumes_raw_dir.clone(),
        config.jd_raw_dir.clone(),
    );

    AppState {
        scorer: HybridScorer::new(config.weights),
        config,
        storage,
        scanner: Arc::new(Mutex::new(scanner)),
        analyzer,
        tracker: Arc::new(ProcessingTracker::new()),
    }
}
