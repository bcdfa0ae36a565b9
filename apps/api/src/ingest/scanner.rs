use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info, warn};

use super::ledger::{JsonFileLedger, LedgerStore, ProcessingLedger};
use crate::extraction::FileKind;
use crate::models::{StructuredJobDescription, StructuredResume};
use crate::storage::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Resumes,
    JobDescriptions,
}

impl Collection {
    pub fn label(self) -> &'static str {
        match self {
            Collection::Resumes => "resumes",
            Collection::JobDescriptions => "job descriptions",
        }
    }
}

#[derive(Debug, Clone)]
pub enum IngestedRecord {
    Resume(StructuredResume),
    JobDescription(StructuredJobDescription),
}

/// Turns one raw file into a structured record.
#[async_trait]
pub trait FileHandler: Send + Sync {
    async fn handle(&self, path: &Path, collection: Collection) -> anyhow::Result<IngestedRecord>;
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FailedFile {
    pub file: String,
    pub error: String,
}

/// Per-collection outcome. `processed + skipped + failed == total`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ScanStats {
    pub total: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<FailedFile>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ScanReport {
    pub resumes: ScanStats,
    pub job_descriptions: ScanStats,
}

impl ScanReport {
    pub fn total_processed(&self) -> usize {
        self.resumes.processed + self.job_descriptions.processed
    }
}

/// Recognised raw files directly inside `dir`, sorted by file name.
/// A missing directory yields an empty list.
pub fn list_raw_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && FileKind::from_path(&path).is_ok() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Runs scan passes over the raw resume and JD directories.
///
/// Holds the only ledger for the process; wrap it in a mutex to share it.
pub struct IngestionScanner<S: LedgerStore = JsonFileLedger> {
    ledger: ProcessingLedger<S>,
    handler: Arc<dyn FileHandler>,
    storage: Arc<dyn RecordStore>,
    resumes_dir: PathBuf,
    jd_dir: PathBuf,
}

impl<S: LedgerStore> IngestionScanner<S> {
    pub fn new(
        ledger: ProcessingLedger<S>,
        handler: Arc<dyn FileHandler>,
        storage: Arc<dyn RecordStore>,
        resumes_dir: PathBuf,
        jd_dir: PathBuf,
    ) -> Self {
        Self {
            ledger,
            handler,
            storage,
            resumes_dir,
            jd_dir,
        }
    }

    pub fn ledger(&self) -> &ProcessingLedger<S> {
        &self.ledger
    }

    fn dir_for(&self, collection: Collection) -> &Path {
        match collection {
            Collection::Resumes => &self.resumes_dir,
            Collection::JobDescriptions => &self.jd_dir,
        }
    }

    /// Resumes first, then job descriptions.
    pub async fn scan_all(&mut self) -> ScanReport {
        info!("Scanning raw files for new or changed content");
        let report = ScanReport {
            resumes: self.scan_collection(Collection::Resumes).await,
            job_descriptions: self.scan_collection(Collection::JobDescriptions).await,
        };
        info!(
            "Ingestion pass complete: processed={} skipped={} failed={}",
            report.total_processed(),
            report.resumes.skipped + report.job_descriptions.skipped,
            report.resumes.failed + report.job_descriptions.failed
        );
        report
    }

    /// Processes every new or changed file of one collection, then persists the ledger.
    pub async fn scan_collection(&mut self, collection: Collection) -> ScanStats {
        let dir = self.dir_for(collection).to_path_buf();
        let files = match list_raw_files(&dir) {
            Ok(files) => files,
            Err(e) => {
                error!("Could not list {} in {}: {e}", collection.label(), dir.display());
                return ScanStats::default();
            }
        };

        let mut stats = ScanStats {
            total: files.len(),
            ..Default::default()
        };

        for path in &files {
            let name = display_name(path);
            if self.ledger.is_processed(path) {
                info!("Skipping (already processed): {name}");
                stats.skipped += 1;
                continue;
            }

            match self.ingest_file(path, collection).await {
                Ok(location) => {
                    self.ledger.mark_processed(path);
                    stats.processed += 1;
                    info!("Processed {name} -> {location}");
                }
                Err(e) => {
                    error!("Failed to process {name}: {e:#}");
                    stats.failed += 1;
                    stats.failures.push(FailedFile {
                        file: name,
                        error: format!("{e:#}"),
                    });
                }
            }
        }

        if let Err(e) = self.ledger.persist() {
            warn!("Could not persist processing ledger: {e}");
        }

        info!(
            "{} scan: total={} processed={} skipped={} failed={}",
            collection.label(),
            stats.total,
            stats.processed,
            stats.skipped,
            stats.failed
        );
        stats
    }

    async fn ingest_file(&self, path: &Path, collection: Collection) -> anyhow::Result<String> {
        let record = self.handler.handle(path, collection).await?;
        let location = match record {
            IngestedRecord::Resume(resume) => self.storage.save_resume(resume)?,
            IngestedRecord::JobDescription(jd) => self.storage.save_job_description(jd)?,
        };
        Ok(location)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
