use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reason code attached to the zeroed analysis returned when the LLM call fails.
pub const ANALYSIS_FAILED_REASON: &str = "ERROR: Analysis failed";

/// Per (resume, JD) judgment produced by the LLM. Consumed immediately by the scorer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LlmAnalysis {
    #[serde(default)]
    pub overall_score: f64,
    #[serde(default)]
    pub similarity_score: f64,
    #[serde(default)]
    pub must_have_matches: Vec<String>,
    #[serde(default)]
    pub reason_codes: Vec<String>,
    /// Requirement text -> resume section reference.
    #[serde(default)]
    pub matched_sections: BTreeMap<String, String>,
}

impl LlmAnalysis {
    /// The zeroed analysis substituted for any analyzer failure.
    pub fn failed() -> Self {
        Self {
            reason_codes: vec![ANALYSIS_FAILED_REASON.to_string()],
            ..Self::default()
        }
    }

    /// Clamps both scores into [0, 100]; non-finite values become 0.
    pub fn sanitized(mut self) -> Self {
        self.overall_score = clamp_score(self.overall_score);
        self.similarity_score = clamp_score(self.similarity_score);
        self
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
