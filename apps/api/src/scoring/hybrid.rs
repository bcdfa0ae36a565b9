use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{LlmAnalysis, StructuredJobDescription, StructuredResume};
use crate::scoring::recency::compute_recency_boost;
use crate::scoring::requirements::compute_requirement_coverage;

/// Allowed deviation of the weight sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub similarity: f64,
    pub must_have: f64,
    pub recency: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            similarity: 0.6,
            must_have: 0.3,
            recency: 0.1,
        }
    }
}

impl ScoringWeights {
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, w) in [
            ("SIMILARITY_WEIGHT", self.similarity),
            ("MUST_HAVE_BOOST_WEIGHT", self.must_have),
            ("RECENCY_BOOST_WEIGHT", self.recency),
        ] {
            if !(0.0..=1.0).contains(&w) {
                anyhow::bail!("{name} must be in [0.0, 1.0], got {w}");
            }
        }
        let total = self.similarity + self.must_have + self.recency;
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            anyhow::bail!("Scoring weights must sum to 1.0, got {total}");
        }
        Ok(())
    }
}

/// Each weighted component on a 0–100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub similarity_weighted: f64,
    pub must_have_weighted: f64,
    pub recency_weighted: f64,
}

/// Final hybrid score plus everything needed to explain it. All values 0–100,
/// rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub final_score: f64,
    pub similarity_score: f64,
    pub must_have_boost: f64,
    pub recency_boost: f64,
    pub score_breakdown: ScoreBreakdown,
}

/// Combines the LLM similarity score with the must-have and recency boosts.
///
/// Weights are trusted as given; `Config` validates them at startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct HybridScorer {
    weights: ScoringWeights,
}

impl HybridScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Scores a candidate using the current calendar year for recency.
    pub fn calculate_final_score(
        &self,
        similarity_score: f64,
        resume: &StructuredResume,
        job_description: &StructuredJobDescription,
        llm_analysis: &LlmAnalysis,
    ) -> ScoreResult {
        self.calculate_final_score_at(
            similarity_score,
            resume,
            job_description,
            llm_analysis,
            Utc::now().year(),
        )
    }

    pub fn calculate_final_score_at(
        &self,
        similarity_score: f64,
        resume: &StructuredResume,
        job_description: &StructuredJobDescription,
        llm_analysis: &LlmAnalysis,
        current_year: i32,
    ) -> ScoreResult {
        let must_have_boost = compute_requirement_coverage(
            &job_description.must_have_requirements,
            &llm_analysis.must_have_matches,
            &resume.skills,
            &resume.raw_text,
        );
        let recency_boost = compute_recency_boost(&resume.experience, current_year);

        let result = self.combine(similarity_score, must_have_boost, recency_boost);
        tracing::debug!(
            "Score for {}: similarity={:.2} must_have={:.2} recency={:.2} final={:.2}",
            resume.candidate_id,
            similarity_score,
            must_have_boost,
            recency_boost,
            result.final_score
        );
        result
    }

    /// Weighted merge of a 0–100 similarity score with two 0–1 boosts.
    pub fn combine(&self, similarity_score: f64, must_have_boost: f64, recency_boost: f64) -> ScoreResult {
        let similarity_normalized = similarity_score / 100.0;

        let weighted_similarity = similarity_normalized * self.weights.similarity;
        let weighted_must_have = must_have_boost * self.weights.must_have;
        let weighted_recency = recency_boost * self.weights.recency;

        let final_score =
            ((weighted_similarity + weighted_must_have + weighted_recency) * 100.0).clamp(0.0, 100.0);

        ScoreResult {
            final_score: round2(final_score),
            similarity_score: round2(similarity_score),
            must_have_boost: round2(must_have_boost * 100.0),
            recency_boost: round2(recency_boost * 100.0),
            score_breakdown: ScoreBreakdown {
                similarity_weighted: round2(weighted_similarity * 100.0),
                must_have_weighted: round2(weighted_must_have * 100.0),
                recency_weighted: round2(weighted_recency * 100.0),
            },
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExperienceEntry;

    fn resume(skills: &[&str], raw_text: &str, end_date: &str) -> StructuredResume {
        StructuredResume {
            candidate_id: "c-1".to_string(),
            name: "Test Candidate".to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            experience: vec![ExperienceEntry {
                company: "Acme".to_string(),
                position: "Engineer".to_string(),
                start_date: "2018".to_string(),
                end_date: end_date.to_string(),
                description: String::new(),
            }],
            education: vec![],
            raw_text: raw_text.to_string(),
            metadata: None,
        }
    }

    fn jd(must_haves: &[&str]) -> StructuredJobDescription {
        StructuredJobDescription {
            jd_id: "jd-1".to_string(),
            title: "Engineer".to_string(),
            must_have_requirements: must_haves.iter().map(|s| s.to_string()).collect(),
            nice_to_have: vec![],
            description: String::new(),
            experience_years_required: 0,
            raw_text: String::new(),
            metadata: None,
        }
    }

    #[test]
    fn test_default_weights_valid() {
        assert!(ScoringWeights::default().validate().is_ok());
    }

    #[test]
    fn test_weight_sum_within_tolerance_accepted() {
        let w = ScoringWeights {
            similarity: 0.605,
            must_have: 0.3,
            recency: 0.1,
        };
        assert!(w.validate().is_ok());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let w = ScoringWeights {
            similarity: 1.2,
            must_have: -0.2,
            recency: 0.0,
        };
        assert!(w.validate().is_err());
    }

    #[test]
    fn test_all_maxed_is_one_hundred() {
        let result = HybridScorer::default().combine(100.0, 1.0, 1.0);
        assert_eq!(result.final_score, 100.0);
        assert_eq!(result.score_breakdown.similarity_weighted, 60.0);
        assert_eq!(result.score_breakdown.must_have_weighted, 30.0);
        assert_eq!(result.score_breakdown.recency_weighted, 10.0);
    }

    #[test]
    fn test_similarity_eighty_with_full_boosts() {
        // 0.8*0.6 + 1.0*0.3 + 1.0*0.1 = 0.88
        let result = HybridScorer::default().combine(80.0, 1.0, 1.0);
        assert_eq!(result.final_score, 88.0);
        assert_eq!(result.similarity_score, 80.0);
        assert_eq!(result.must_have_boost, 100.0);
        assert_eq!(result.recency_boost, 100.0);
    }

    #[test]
    fn test_final_score_clamped() {
        let result = HybridScorer::default().combine(250.0, 1.0, 1.0);
        assert_eq!(result.final_score, 100.0);
        assert_eq!(result.similarity_score, 250.0);
        let result = HybridScorer::default().combine(-500.0, 0.0, 0.0);
        assert_eq!(result.final_score, 0.0);
    }

    #[test]
    fn test_monotonic_in_each_input() {
        let scorer = HybridScorer::default();
        let steps = [0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 1.0];
        for pair in steps.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            assert!(scorer.combine(lo * 100.0, 0.5, 0.5).final_score <= scorer.combine(hi * 100.0, 0.5, 0.5).final_score);
            assert!(scorer.combine(50.0, lo, 0.5).final_score <= scorer.combine(50.0, hi, 0.5).final_score);
            assert!(scorer.combine(50.0, 0.5, lo).final_score <= scorer.combine(50.0, 0.5, hi).final_score);
        }
    }

    #[test]
    fn test_two_decimal_rounding() {
        let result = HybridScorer::default().combine(33.333, 1.0 / 3.0, 0.0);
        assert_eq!(result.similarity_score, 33.33);
        assert_eq!(result.must_have_boost, 33.33);
        assert_eq!(result.final_score, 30.0);
    }

    #[test]
    fn test_full_pipeline_score() {
        let scorer = HybridScorer::default();
        let analysis = LlmAnalysis {
            similarity_score: 70.0,
            must_have_matches: vec!["Strong Rust background".to_string()],
            ..Default::default()
        };
        let result = scorer.calculate_final_score_at(
            analysis.similarity_score,
            &resume(&["python"], "Rust and Python", "2024"),
            &jd(&["Rust", "Python", "Haskell"]),
            &analysis,
            2025,
        );
        // coverage 2/3, recency 0.7 (1 year ago)
        assert_eq!(result.must_have_boost, 66.67);
        assert_eq!(result.recency_boost, 70.0);
        assert_eq!(result.score_breakdown.similarity_weighted, 42.0);
        assert_eq!(result.score_breakdown.must_have_weighted, 20.0);
        assert_eq!(result.score_breakdown.recency_weighted, 7.0);
        assert_eq!(result.final_score, 69.0);
    }

    #[test]
    fn test_no_requirements_no_boost() {
        let result = HybridScorer::default().calculate_final_score_at(
            50.0,
            &resume(&["rust"], "rust", "2025"),
            &jd(&[]),
            &LlmAnalysis::default(),
            2025,
        );
        assert_eq!(result.must_have_boost, 0.0);
        assert_eq!(result.final_score, 40.0);
    }
}
