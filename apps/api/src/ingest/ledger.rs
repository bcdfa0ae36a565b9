//! Persisted record of which raw-file contents have already been ingested.
//!
//! Keys are absolute file paths, values the content fingerprint of the last
//! successfully processed version. The on-disk form is one flat JSON object.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::fingerprint::fingerprint_file;
use crate::storage::write_json_atomic;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger file {0} does not exist")]
    NotFound(PathBuf),

    #[error("ledger I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger is not a JSON object of strings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value backend behind [`ProcessingLedger`].
pub trait LedgerStore: Send + Sync {
    fn get(&self, key: &str) -> Option<&str>;

    fn set(&mut self, key: String, fingerprint: String);

    /// Replaces in-memory state with the persisted state. On error the store
    /// must be left empty.
    fn load(&mut self) -> Result<usize, LedgerError>;

    fn persist(&self) -> Result<(), LedgerError>;

    fn len(&self) -> usize;
}

/// [`LedgerStore`] backed by a single JSON file, rewritten atomically.
#[derive(Debug, Clone)]
pub struct JsonFileLedger {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for JsonFileLedger {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    fn set(&mut self, key: String, fingerprint: String) {
        self.entries.insert(key, fingerprint);
    }

    fn load(&mut self) -> Result<usize, LedgerError> {
        self.entries.clear();
        if !self.path.exists() {
            return Err(LedgerError::NotFound(self.path.clone()));
        }
        let raw = std::fs::read_to_string(&self.path)?;
        self.entries = serde_json::from_str(&raw)?;
        Ok(self.entries.len())
    }

    fn persist(&self) -> Result<(), LedgerError> {
        write_json_atomic(&self.path, &self.entries)?;
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Decides whether a file needs processing and records what has been processed.
///
/// Not safe for concurrent scans; callers serialise access.
#[derive(Debug)]
pub struct ProcessingLedger<S: LedgerStore = JsonFileLedger> {
    store: S,
}

impl ProcessingLedger<JsonFileLedger> {
    pub fn open_file(path: impl Into<PathBuf>) -> Self {
        Self::open(JsonFileLedger::new(path))
    }
}

impl<S: LedgerStore> ProcessingLedger<S> {
    /// Loads `store`. A missing or corrupt ledger starts empty with a warning.
    pub fn open(mut store: S) -> Self {
        match store.load() {
            Ok(count) => tracing::info!("Loaded processing ledger with {count} entries"),
            Err(e) => tracing::warn!("Could not load processing ledger, starting empty: {e}"),
        }
        Self { store }
    }

    /// True iff `path` has an entry equal to its current fingerprint.
    pub fn is_processed(&self, path: &Path) -> bool {
        let Some(stored) = self.store.get(&ledger_key(path)) else {
            return false;
        };
        let current = fingerprint_file(path);
        !current.is_empty() && current == stored
    }

    /// Records the current fingerprint of `path`, replacing any previous entry.
    pub fn mark_processed(&mut self, path: &Path) {
        let fingerprint = fingerprint_file(path);
        if fingerprint.is_empty() {
            tracing::warn!("Not recording {}: content unreadable", path.display());
            return;
        }
        self.store.set(ledger_key(path), fingerprint);
    }

    pub fn persist(&self) -> Result<(), LedgerError> {
        self.store.persist()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn ledger_key(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    /// In-memory store that counts persists.
    #[derive(Default)]
    pub(crate) struct MemoryLedger {
        pub entries: BTreeMap<String, String>,
        pub persists: std::sync::atomic::AtomicUsize,
    }

    impl LedgerStore for MemoryLedger {
        fn get(&self, key: &str) -> Option<&str> {
            self.entries.get(key).map(String::as_str)
        }
        fn set(&mut self, key: String, fingerprint: String) {
            self.entries.insert(key, fingerprint);
        }
        fn load(&mut self) -> Result<usize, LedgerError> {
            Ok(self.entries.len())
        }
        fn persist(&self) -> Result<(), LedgerError> {
            self.persists
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
        fn len(&self) -> usize {
            self.entries.len()
        }
    }

    #[test]
    fn test_processed_lifecycle() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("cv.txt");
        std::fs::write(&file, "v1").unwrap();

        let mut ledger = ProcessingLedger::open(MemoryLedger::default());
        assert!(!ledger.is_processed(&file));

        ledger.mark_processed(&file);
        assert!(ledger.is_processed(&file));

        std::fs::write(&file, "v2").unwrap();
        assert!(!ledger.is_processed(&file));

        ledger.mark_processed(&file);
        assert!(ledger.is_processed(&file));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_unreadable_file_never_recorded() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone.pdf");
        let mut ledger = ProcessingLedger::open(MemoryLedger::default());
        ledger.mark_processed(&missing);
        assert!(ledger.is_empty());
        assert!(!ledger.is_processed(&missing));
    }

    #[test]
    fn test_persist_and_reload() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("jd.json");
        std::fs::write(&file, "{}").unwrap();
        let ledger_path = dir.path().join("cache/nested/processed_files.json");

        let mut ledger = ProcessingLedger::open_file(&ledger_path);
        ledger.mark_processed(&file);
        ledger.persist().unwrap();

        let on_disk: BTreeMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(&ledger_path).unwrap()).unwrap();
        let key = ledger_key(&file);
        assert!(Path::new(&key).is_absolute());
        assert_eq!(on_disk.get(&key).map(String::len), Some(64));

        let reopened = ProcessingLedger::open_file(&ledger_path);
        assert!(reopened.is_processed(&file));
    }

    #[test]
    fn test_corrupt_ledger_starts_empty() {
        let dir = TempDir::new().unwrap();
        let ledger_path = dir.path().join("processed_files.json");
        std::fs::write(&ledger_path, "{not json").unwrap();
        let ledger = ProcessingLedger::open_file(&ledger_path);
        assert!(ledger.is_empty());

        std::fs::write(&ledger_path, r#"{"a": 1}"#).unwrap();
        let ledger = ProcessingLedger::open_file(&ledger_path);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_missing_ledger_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("none.json");

        let mut store = JsonFileLedger::new(&path);
        assert!(matches!(store.load(), Err(LedgerError::NotFound(p)) if p == path));
        assert_eq!(store.len(), 0);

        let ledger = ProcessingLedger::open_file(&path);
        assert!(ledger.is_empty());
        ledger.persist().unwrap();
        assert!(matches!(JsonFileLedger::new(&path).load(), Ok(0)));
    }

    #[test]
    fn test_relative_and_absolute_paths_share_key() {
        let file = Path::new("Cargo.toml");
        let abs = std::env::current_dir().unwrap().join(file);
        assert_eq!(ledger_key(file), ledger_key(&abs));
    }
}
