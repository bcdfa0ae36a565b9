use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use super::{write_json_atomic, RecordKind, RecordStore, SearchHit, StorageError};
use crate::models::{RecordMetadata, StructuredJobDescription, StructuredResume};

/// Glue that lets one set of file routines handle both record types.
trait StoredRecord: Serialize + DeserializeOwned {
    const PREFIX: &'static str;
    const LABEL: &'static str;

    fn record_id(&self) -> &str;
    fn set_record_id(&mut self, id: String);
    fn metadata_mut(&mut self) -> &mut Option<RecordMetadata>;
    fn metadata(&self) -> Option<&RecordMetadata>;
    fn display_label(&self) -> &str;
    fn searchable_text(&self) -> String;
}

impl StoredRecord for StructuredResume {
    const PREFIX: &'static str = "resume";
    const LABEL: &'static str = "Resume";

    fn record_id(&self) -> &str {
        &self.candidate_id
    }
    fn set_record_id(&mut self, id: String) {
        self.candidate_id = id;
    }
    fn metadata_mut(&mut self) -> &mut Option<RecordMetadata> {
        &mut self.metadata
    }
    fn metadata(&self) -> Option<&RecordMetadata> {
        self.metadata.as_ref()
    }
    fn display_label(&self) -> &str {
        &self.name
    }
    fn searchable_text(&self) -> String {
        format!("{} {}", self.name, self.raw_text).to_lowercase()
    }
}

impl StoredRecord for StructuredJobDescription {
    const PREFIX: &'static str = "jd";
    const LABEL: &'static str = "Job description";

    fn record_id(&self) -> &str {
        &self.jd_id
    }
    fn set_record_id(&mut self, id: String) {
        self.jd_id = id;
    }
    fn metadata_mut(&mut self) -> &mut Option<RecordMetadata> {
        &mut self.metadata
    }
    fn metadata(&self) -> Option<&RecordMetadata> {
        self.metadata.as_ref()
    }
    fn display_label(&self) -> &str {
        &self.title
    }
    fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.description).to_lowercase()
    }
}

/// Filesystem-backed [`RecordStore`].
#[derive(Debug, Clone)]
pub struct LocalStorage {
    resumes_dir: PathBuf,
    jds_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let base = base_path.as_ref();
        let storage = Self {
            resumes_dir: base.join("resumes"),
            jds_dir: base.join("job_descriptions"),
        };
        std::fs::create_dir_all(&storage.resumes_dir)?;
        std::fs::create_dir_all(&storage.jds_dir)?;
        Ok(storage)
    }

    fn dir_for(&self, kind: RecordKind) -> &Path {
        match kind {
            RecordKind::Resume => &self.resumes_dir,
            RecordKind::Jd => &self.jds_dir,
        }
    }

    fn save<R: StoredRecord>(&self, dir: &Path, mut record: R) -> Result<String, StorageError> {
        if record.record_id().trim().is_empty() {
            record.set_record_id(Uuid::new_v4().to_string());
        }
        let filename = format!("{}_{}.json", R::PREFIX, safe_file_stem(record.record_id()));
        *record.metadata_mut() = Some(RecordMetadata {
            saved_at: Utc::now(),
            filename: filename.clone(),
        });

        let path = dir.join(&filename);
        write_json_atomic(&path, &record)?;
        tracing::info!("Saved {} to {}", R::LABEL.to_lowercase(), path.display());
        Ok(path.to_string_lossy().into_owned())
    }

    fn get<R: StoredRecord>(&self, dir: &Path, id: &str) -> Result<R, StorageError> {
        let not_found = || StorageError::NotFound(format!("{} {id}", R::LABEL));

        if is_plain_file_name(id) {
            let path = dir.join(id);
            if path.is_file() {
                return read_record(&path);
            }
        }

        // Fall back to matching the record's own identifier.
        self.read_all::<R>(dir)?
            .into_iter()
            .map(|(_, record)| record)
            .find(|record| record.record_id() == id)
            .ok_or_else(not_found)
    }

    /// Every readable record in `dir`, sorted by file name. Unreadable files are skipped.
    fn read_all<R: StoredRecord>(&self, dir: &Path) -> Result<Vec<(String, R)>, StorageError> {
        let mut records = Vec::new();
        for name in json_file_names(dir)? {
            match read_record::<R>(&dir.join(&name)) {
                Ok(record) => records.push((name, record)),
                Err(e) => tracing::warn!("Skipping unreadable {} {name}: {e}", R::LABEL.to_lowercase()),
            }
        }
        Ok(records)
    }

    fn list<R: StoredRecord>(&self, dir: &Path) -> Result<Vec<R>, StorageError> {
        let mut records: Vec<R> = self.read_all(dir)?.into_iter().map(|(_, r)| r).collect();
        records.sort_by(|a, b| {
            let a = a.metadata().map(|m| m.saved_at);
            let b = b.metadata().map(|m| m.saved_at);
            b.cmp(&a)
        });
        Ok(records)
    }

    fn search_dir<R: StoredRecord>(&self, kind: RecordKind, query: &str, hits: &mut Vec<SearchHit>) {
        let records = match self.read_all::<R>(self.dir_for(kind)) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Search skipped {kind:?} records: {e}");
                return;
            }
        };
        for (file_id, record) in records {
            if record.searchable_text().contains(query) {
                hits.push(SearchHit {
                    file_id,
                    kind,
                    record_id: record.record_id().to_string(),
                    label: record.display_label().to_string(),
                });
            }
        }
    }
}

impl RecordStore for LocalStorage {
    fn save_resume(&self, resume: StructuredResume) -> Result<String, StorageError> {
        self.save(&self.resumes_dir, resume)
    }

    fn save_job_description(&self, jd: StructuredJobDescription) -> Result<String, StorageError> {
        self.save(&self.jds_dir, jd)
    }

    fn get_resume(&self, id: &str) -> Result<StructuredResume, StorageError> {
        self.get(&self.resumes_dir, id)
    }

    fn get_job_description(&self, id: &str) -> Result<StructuredJobDescription, StorageError> {
        self.get(&self.jds_dir, id)
    }

    fn resume_file_ids(&self) -> Result<Vec<String>, StorageError> {
        json_file_names(&self.resumes_dir)
    }

    fn list_resumes(&self) -> Result<Vec<StructuredResume>, StorageError> {
        self.list(&self.resumes_dir)
    }

    fn list_job_descriptions(&self) -> Result<Vec<StructuredJobDescription>, StorageError> {
        self.list(&self.jds_dir)
    }

    fn search(&self, query: &str, kind: Option<RecordKind>) -> Vec<SearchHit> {
        let query = query.to_lowercase();
        let mut hits = Vec::new();
        if kind.map_or(true, |k| k == RecordKind::Resume) {
            self.search_dir::<StructuredResume>(RecordKind::Resume, &query, &mut hits);
        }
        if kind.map_or(true, |k| k == RecordKind::Jd) {
            self.search_dir::<StructuredJobDescription>(RecordKind::Jd, &query, &mut hits);
        }
        hits
    }

    fn delete(&self, file_id: &str, kind: RecordKind) -> Result<bool, StorageError> {
        if !is_plain_file_name(file_id) {
            return Ok(false);
        }
        let path = self.dir_for(kind).join(file_id);
        if !path.is_file() {
            return Ok(false);
        }
        std::fs::remove_file(&path)?;
        tracing::info!("Deleted {kind:?} {file_id}");
        Ok(true)
    }
}

fn read_record<R: DeserializeOwned>(path: &Path) -> Result<R, StorageError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn json_file_names(dir: &Path) -> Result<Vec<String>, StorageError> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".json") {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Rejects anything that could escape the storage directory.
fn is_plain_file_name(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\']) && !id.contains('\0')
}

fn safe_file_stem(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn resume(id: &str, name: &str, raw_text: &str) -> StructuredResume {
        StructuredResume {
            candidate_id: id.to_string(),
            name: name.to_string(),
            skills: vec!["Rust".to_string()],
            experience: vec![],
            education: vec![],
            raw_text: raw_text.to_string(),
            metadata: None,
        }
    }

    fn jd(id: &str, title: &str) -> StructuredJobDescription {
        StructuredJobDescription {
            jd_id: id.to_string(),
            title: title.to_string(),
            must_have_requirements: vec!["Rust".to_string()],
            nice_to_have: vec![],
            description: "Build services in Rust".to_string(),
            experience_years_required: 3,
            raw_text: String::new(),
            metadata: None,
        }
    }

    #[test]
    fn test_save_and_get_by_file_name_and_id() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path()).unwrap();

        let location = storage.save_resume(resume("abc", "Ada", "text")).unwrap();
        assert!(location.ends_with("resume_abc.json"));

        let by_file = storage.get_resume("resume_abc.json").unwrap();
        let by_id = storage.get_resume("abc").unwrap();
        assert_eq!(by_file, by_id);
        let meta = by_id.metadata.unwrap();
        assert_eq!(meta.filename, "resume_abc.json");
    }

    #[test]
    fn test_missing_record_is_not_found() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path()).unwrap();
        assert!(matches!(
            storage.get_job_description("nope"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_empty_id_gets_generated() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path()).unwrap();
        storage.save_job_description(jd("", "Engineer")).unwrap();
        let all = storage.list_job_descriptions().unwrap();
        assert_eq!(all.len(), 1);
        assert!(Uuid::parse_str(&all[0].jd_id).is_ok());
    }

    #[test]
    fn test_list_newest_first() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path()).unwrap();
        storage.save_resume(resume("z-first", "First", "")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        storage.save_resume(resume("a-second", "Second", "")).unwrap();

        let names: Vec<_> = storage
            .list_resumes()
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Second", "First"]);
    }

    #[test]
    fn test_search_is_case_insensitive_and_filtered() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path()).unwrap();
        storage.save_resume(resume("r1", "Ada", "Kubernetes operator")).unwrap();
        storage.save_job_description(jd("j1", "Platform Engineer")).unwrap();

        let hits = storage.search("KUBERNETES", None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file_id, "resume_r1.json");

        assert_eq!(storage.search("rust", Some(RecordKind::Jd)).len(), 1);
        assert!(storage.search("rust", Some(RecordKind::Resume)).is_empty());
    }

    #[test]
    fn test_delete_and_traversal_rejected() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path()).unwrap();
        storage.save_resume(resume("r1", "Ada", "")).unwrap();

        assert!(!storage.delete("../job_descriptions", RecordKind::Resume).unwrap());
        assert!(storage.delete("resume_r1.json", RecordKind::Resume).unwrap());
        assert!(!storage.delete("resume_r1.json", RecordKind::Resume).unwrap());
        assert!(storage.resume_file_ids().unwrap().is_empty());
    }

    #[test]
    fn test_unsafe_ids_sanitized_in_file_name() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path()).unwrap();
        storage.save_resume(resume("../evil", "X", "")).unwrap();
        assert_eq!(storage.resume_file_ids().unwrap(), vec!["resume____evil.json"]);
        assert_eq!(storage.get_resume("../evil").unwrap().name, "X");
    }
}
