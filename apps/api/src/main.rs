mod analysis;
mod config;
mod errors;
mod export;
mod extraction;
mod ingest;
mod llm_client;
mod models;
mod parsing;
mod ranking;
mod routes;
mod scoring;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::{Analyzer, LlmAnalyzer};
use crate::config::Config;
use crate::ingest::{IngestionScanner, ProcessingLedger, RawFileHandler};
use crate::llm_client::LlmClient;
use crate::parsing::{JobDescriptionParser, ParseStrategy, ResumeParser};
use crate::ranking::ProcessingTracker;
use crate::routes::build_router;
use crate::scoring::HybridScorer;
use crate::state::AppState;
use crate::storage::{LocalStorage, RecordStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values or bad weights)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Talent API v{}", env!("CARGO_PKG_VERSION"));
    config.ensure_directories()?;

    // Initialize LLM client (optional)
    let llm = match &config.anthropic_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone(), config.anthropic_model.clone(), config.llm_timeout_secs)?
                .with_params(config.generation_params());
            info!(
                "LLM client initialized (model: {}, max_tokens: {}, temperature: {})",
                client.model(),
                config.llm_max_tokens,
                config.llm_temperature
            );
            Some(client)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set: ranking is disabled, parsing is rule-based");
            None
        }
    };

    let strategy = match (&llm, config.use_llm_parsing) {
        (Some(client), true) => ParseStrategy::Llm(client.clone()),
        _ => ParseStrategy::RuleBased,
    };
    info!("Parse strategy: {}", strategy.name());

    let analyzer: Option<Arc<dyn Analyzer>> =
        llm.map(|client| Arc::new(LlmAnalyzer::new(client)) as Arc<dyn Analyzer>);

    // Initialize storage and the ingestion scanner
    let storage: Arc<dyn RecordStore> = Arc::new(LocalStorage::new(&config.storage_path)?);
    info!("Record storage at {}", config.storage_path.display());

    let handler = Arc::new(RawFileHandler::new(
        ResumeParser::new(strategy.clone()),
        JobDescriptionParser::new(strategy),
    ));
    let ledger = ProcessingLedger::open_file(config.ledger_path());
    info!(
        "Processing ledger at {} ({} entries)",
        ledger.store().path().display(),
        ledger.len()
    );
    let scanner = Arc::new(Mutex::new(IngestionScanner::new(
        ledger,
        handler,
        storage.clone(),
        config.resumes_raw_dir.clone(),
        config.jd_raw_dir.clone(),
    )));

    // Initial ingestion pass runs in the background; the server starts immediately
    let startup_scanner = scanner.clone();
    tokio::spawn(async move {
        let mut scanner = startup_scanner.lock().await;
        let report = scanner.scan_all().await;
        info!(
            "Startup ingestion finished: {} new records, {} failures, ledger holds {} entries",
            report.total_processed(),
            report.resumes.failed + report.job_descriptions.failed,
            scanner.ledger().len()
        );
    });

    // Build app state
    let state = AppState {
        scorer: HybridScorer::new(config.weights),
        config: config.clone(),
        storage,
        scanner,
        analyzer,
        tracker: Arc::new(ProcessingTracker::new()),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
