//! Incremental ingestion of raw resume and job-description files.
//!
//! A scan lists each raw directory, skips files whose content fingerprint is
//! already in the ledger, hands the rest to a [`FileHandler`], stores the
//! resulting records and persists the ledger once per collection.

pub mod fingerprint;
pub mod handler;
pub mod handlers;
pub mod ledger;
pub mod scanner;

pub use fingerprint::{fingerprint_bytes, fingerprint_file};
pub use handler::RawFileHandler;
pub use ledger::{JsonFileLedger, LedgerError, LedgerStore, ProcessingLedger};
pub use scanner::{Collection, FileHandler, IngestedRecord, IngestionScanner, ScanReport, ScanStats};
