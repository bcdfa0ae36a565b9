use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::tracker::ProcessingTracker;
use crate::analysis::explain::{format_reason_codes, generate_reason_codes, map_hits_to_sections};
use crate::analysis::Analyzer;
use crate::models::{LlmAnalysis, StructuredJobDescription, StructuredResume};
use crate::scoring::{HybridScorer, ScoreBreakdown};
use crate::storage::RecordStore;

/// One row of a ranking, with everything needed to explain it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedCandidate {
    pub rank: usize,
    pub candidate_id: String,
    pub name: String,
    pub final_score: f64,
    pub similarity_score: f64,
    pub must_have_boost: f64,
    pub recency_boost: f64,
    pub score_breakdown: ScoreBreakdown,
    pub must_have_matches: Vec<String>,
    pub reason_codes: Vec<String>,
    pub hit_mappings: BTreeMap<String, String>,
}

/// A finished ranking. Persisted as `latest_results.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankingRun {
    pub jd_id: String,
    pub jd_title: String,
    pub timestamp: DateTime<Utc>,
    pub results: Vec<RankedCandidate>,
    pub errors: Vec<String>,
    pub total_processed: usize,
    pub total_failed: usize,
}

impl RankingRun {
    pub fn candidate(&self, candidate_id: &str) -> Option<&RankedCandidate> {
        self.results.iter().find(|c| c.candidate_id == candidate_id)
    }
}

/// Scores one analyzed candidate. Rank is assigned later.
pub fn score_candidate(
    resume: &StructuredResume,
    job_description: &StructuredJobDescription,
    analysis: &LlmAnalysis,
    scorer: &HybridScorer,
) -> RankedCandidate {
    let score = scorer.calculate_final_score(analysis.similarity_score, resume, job_description, analysis);
    let reason_codes = format_reason_codes(&generate_reason_codes(analysis, resume));

    RankedCandidate {
        rank: 0,
        candidate_id: resume.candidate_id.clone(),
        name: if resume.name.is_empty() {
            "Unknown".to_string()
        } else {
            resume.name.clone()
        },
        final_score: score.final_score,
        similarity_score: score.similarity_score,
        must_have_boost: score.must_have_boost,
        recency_boost: score.recency_boost,
        score_breakdown: score.score_breakdown,
        must_have_matches: analysis.must_have_matches.clone(),
        reason_codes,
        hit_mappings: map_hits_to_sections(analysis, resume),
    }
}

/// Sorts by final score, highest first, and numbers ranks from 1.
/// Ties keep their input order.
pub fn assign_ranks(results: &mut [RankedCandidate]) {
    results.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
    for (i, candidate) in results.iter_mut().enumerate() {
        candidate.rank = i + 1;
    }
}

/// Analyzes and scores every stored resume in `resume_ids` against `job_description`.
///
/// A resume that cannot be loaded is recorded in `errors`; the rest of the
/// batch still runs.
pub async fn rank_candidates(
    job_description: &StructuredJobDescription,
    resume_ids: &[String],
    storage: &dyn RecordStore,
    analyzer: &dyn Analyzer,
    scorer: &HybridScorer,
    tracker: Option<&ProcessingTracker>,
) -> RankingRun {
    let mut results = Vec::with_capacity(resume_ids.len());
    let mut errors = Vec::new();

    for (i, resume_id) in resume_ids.iter().enumerate() {
        info!("Ranking resume {}/{}: {resume_id}", i + 1, resume_ids.len());
        match storage.get_resume(resume_id) {
            Ok(resume) => {
                let analysis = analyzer.analyze(&resume, job_description).await;
                results.push(score_candidate(&resume, job_description, &analysis, scorer));
            }
            Err(e) => {
                error!("Could not load resume {resume_id}: {e}");
                errors.push(format!("{resume_id}: {e}"));
            }
        }
        if let Some(tracker) = tracker {
            tracker.set_progress(i + 1).await;
        }
    }

    assign_ranks(&mut results);
    info!(
        "Ranked {} candidates for JD {} ({} failed)",
        results.len(),
        job_description.jd_id,
        errors.len()
    );

    RankingRun {
        jd_id: job_description.jd_id.clone(),
        jd_title: job_description.title.clone(),
        timestamp: Utc::now(),
        total_processed: results.len(),
        total_failed: errors.len(),
        results,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Similarity taken from the number of skills; "Rust" counts as a must-have match.
    struct SkillCountAnalyzer;

    #[async_trait]
    impl Analyzer for SkillCountAnalyzer {
        async fn analyze(&self, resume: &StructuredResume, _: &StructuredJobDescription) -> LlmAnalysis {
            LlmAnalysis {
                overall_score: 0.0,
                similarity_score: (resume.skills.len() as f64 * 25.0).min(100.0),
                must_have_matches: resume
                    .skills
                    .iter()
                    .filter(|s| s.as_str() == "Rust")
                    .cloned()
                    .collect(),
                ..Default::default()
            }
        }
    }

    fn resume(id: &str, skills: &[&str]) -> StructuredResume {
        StructuredResume {
            candidate_id: id.to_string(),
            name: format!("Candidate {id}"),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            experience: vec![],
            education: vec![],
            raw_text: String::new(),
            metadata: None,
        }
    }

    fn jd() -> StructuredJobDescription {
        StructuredJobDescription {
            jd_id: "jd-1".into(),
            title: "Rust Engineer".into(),
            must_have_requirements: vec!["Rust".into()],
            nice_to_have: vec![],
            description: "Rust services".into(),
            experience_years_required: 0,
            raw_text: String::new(),
            metadata: None,
        }
    }

    #[tokio::test]
    async fn test_ranked_descending_with_partial_failures() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path()).unwrap();
        storage.save_resume(resume("low", &["Go"])).unwrap();
        storage.save_resume(resume("high", &["Rust", "Go", "SQL"])).unwrap();
        storage.save_resume(resume("mid", &["Rust"])).unwrap();

        let mut ids = storage.resume_file_ids().unwrap();
        ids.push("resume_missing.json".to_string());

        let tracker = ProcessingTracker::new();
        tracker.try_start("jd-1", ids.len()).await.unwrap();
        let run = rank_candidates(
            &jd(),
            &ids,
            &storage,
            &SkillCountAnalyzer,
            &HybridScorer::default(),
            Some(&tracker),
        )
        .await;

        let order: Vec<_> = run.results.iter().map(|c| c.candidate_id.as_str()).collect();
        assert_eq!(order, vec!["high", "mid", "low"]);
        let ranks: Vec<_> = run.results.iter().map(|c| c.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(run.total_processed, 3);
        assert_eq!(run.total_failed, 1);
        assert!(run.errors[0].starts_with("resume_missing.json"));
        assert_eq!(tracker.snapshot().await.progress, 4);
    }

    #[test]
    fn test_score_candidate_explains() {
        let analysis = LlmAnalysis {
            similarity_score: 80.0,
            must_have_matches: vec!["Rust".into()],
            ..Default::default()
        };
        let candidate = score_candidate(&resume("c", &["Rust"]), &jd(), &analysis, &HybridScorer::default());
        // 0.8*0.6 + 1.0*0.3 + 0.0*0.1
        assert_eq!(candidate.final_score, 78.0);
        assert_eq!(candidate.must_have_boost, 100.0);
        assert_eq!(candidate.hit_mappings["Rust"], "Skills: Rust");
        assert_eq!(candidate.reason_codes, vec!["MUST_HAVE_MATCH: 1 requirements met"]);
    }

    #[test]
    fn test_assign_ranks_stable_ties() {
        let analysis = LlmAnalysis::default();
        let scorer = HybridScorer::default();
        let mut results = vec![
            score_candidate(&resume("a", &[]), &jd(), &analysis, &scorer),
            score_candidate(&resume("b", &[]), &jd(), &analysis, &scorer),
        ];
        assign_ranks(&mut results);
        assert_eq!(results[0].candidate_id, "a");
        assert_eq!(results[1].rank, 2);
    }
}
