use std::path::{Path, PathBuf};

use super::pipeline::RankingRun;
use crate::storage::write_json_atomic;

pub const LATEST_RESULTS_FILE: &str = "latest_results.json";

pub fn latest_results_path(output_dir: &Path) -> PathBuf {
    output_dir.join(LATEST_RESULTS_FILE)
}

pub fn save_latest(output_dir: &Path, run: &RankingRun) -> std::io::Result<PathBuf> {
    let path = latest_results_path(output_dir);
    write_json_atomic(&path, run)?;
    tracing::info!("Results saved to {}", path.display());
    Ok(path)
}

/// `None` when no results were saved yet or the file is unreadable.
pub fn load_latest(output_dir: &Path) -> Option<RankingRun> {
    let path = latest_results_path(output_dir);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::error!("Could not read {}: {e}", path.display());
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(run) => Some(run),
        Err(e) => {
            tracing::error!("Ignoring unreadable results file {}: {e}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        assert!(load_latest(dir.path()).is_none());

        let run = RankingRun {
            jd_id: "jd-1".into(),
            jd_title: "Engineer".into(),
            timestamp: Utc::now(),
            results: vec![],
            errors: vec![],
            total_processed: 0,
            total_failed: 0,
        };
        let path = save_latest(dir.path(), &run).unwrap();
        assert!(path.ends_with(LATEST_RESULTS_FILE));
        assert_eq!(load_latest(dir.path()).unwrap(), run);
    }

    #[test]
    fn test_corrupt_results_ignored() {
        let dir = TempDir::new().unwrap();
        std::fs::write(latest_results_path(dir.path()), "{").unwrap();
        assert!(load_latest(dir.path()).is_none());
    }
}
