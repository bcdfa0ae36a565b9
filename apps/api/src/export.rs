//! CSV export of a ranking run.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;

use crate::ranking::RankedCandidate;

const HEADERS: [&str; 9] = [
    "rank",
    "candidate_id",
    "name",
    "overall_score",
    "similarity_score",
    "must_have_hits",
    "recency_boost",
    "reason_codes",
    "matched_requirements",
];

/// Writes a header row plus one row per candidate, in rank order as given.
pub fn write_csv<W: Write>(writer: W, results: &[RankedCandidate]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADERS)?;
    for c in results {
        wtr.write_record([
            c.rank.to_string(),
            c.candidate_id.clone(),
            c.name.clone(),
            format!("{:.2}", c.final_score),
            format!("{:.2}", c.similarity_score),
            c.must_have_matches.len().to_string(),
            format!("{:.2}", c.recency_boost),
            c.reason_codes.join("; "),
            c.must_have_matches.join("; "),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `ranked_candidates_<timestamp>.csv` under `output_dir` and
/// returns its path.
pub fn export_results(output_dir: &Path, results: &[RankedCandidate]) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let path = output_dir.join(format!(
        "ranked_candidates_{}.csv",
        Utc::now().format("%Y%m%d_%H%M%S")
    ));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, results)?;
    tracing::info!("Exported {} candidates to {}", results.len(), path.display());
    Ok(path)
}
