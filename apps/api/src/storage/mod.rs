//! Persistence for structured resumes and job descriptions.
//!
//! Records live as pretty-printed JSON files, one per record, under
//! `<STORAGE_PATH>/resumes` and `<STORAGE_PATH>/job_descriptions`.

pub mod handlers;
pub mod local;

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{StructuredJobDescription, StructuredResume};

pub use local::LocalStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid record JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Resume,
    Jd,
}

/// Lightweight match returned by [`RecordStore::search`].
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchHit {
    pub file_id: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub record_id: String,
    pub label: String,
}

/// Storage collaborator used by ingestion and ranking.
///
/// Ids accepted by the getters are either a stored file name
/// (`resume_<id>.json`) or the record's own identifier.
pub trait RecordStore: Send + Sync {
    /// Persists a resume and returns its location.
    fn save_resume(&self, resume: StructuredResume) -> Result<String, StorageError>;

    fn save_job_description(&self, jd: StructuredJobDescription) -> Result<String, StorageError>;

    fn get_resume(&self, id: &str) -> Result<StructuredResume, StorageError>;

    fn get_job_description(&self, id: &str) -> Result<StructuredJobDescription, StorageError>;

    /// File ids of every stored resume, sorted by name.
    fn resume_file_ids(&self) -> Result<Vec<String>, StorageError>;

    /// All resumes, newest first.
    fn list_resumes(&self) -> Result<Vec<StructuredResume>, StorageError>;

    /// All job descriptions, newest first.
    fn list_job_descriptions(&self) -> Result<Vec<StructuredJobDescription>, StorageError>;

    fn search(&self, query: &str, kind: Option<RecordKind>) -> Vec<SearchHit>;

    /// Returns `false` when nothing was stored under `file_id`.
    fn delete(&self, file_id: &str, kind: RecordKind) -> Result<bool, StorageError>;
}

/// Serializes `value` next to `path` and renames it into place, so readers
/// see either the previous file or the complete new one.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_write_json_atomic_creates_parents_and_replaces() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/file.json");

        let mut first = BTreeMap::new();
        first.insert("a", "1");
        write_json_atomic(&path, &first).unwrap();

        let mut second = BTreeMap::new();
        second.insert("b", "2");
        write_json_atomic(&path, &second).unwrap();

        let read: BTreeMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read.get("b").map(String::as_str), Some("2"));
        assert!(!read.contains_key("a"));

        // No temp files left behind.
        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_record_kind_query_names() {
        let kind: RecordKind = serde_json::from_str(r#""jd""#).unwrap();
        assert_eq!(kind, RecordKind::Jd);
        let kind: RecordKind = serde_json::from_str(r#""resume""#).unwrap();
        assert_eq!(kind, RecordKind::Resume);
    }
}
