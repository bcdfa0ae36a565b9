//! Candidate analysis: the LLM judgment of one resume against one job description.
//!
//! [`LlmAnalyzer::try_analyze`] reports failures as [`AnalysisError`]. The
//! [`Analyzer`] impl is the only place those errors become the zeroed
//! [`LlmAnalysis::failed`] record, so callers always receive a usable analysis.

pub mod explain;
pub mod prompts;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::llm_client::{LlmClient, LlmError};
use crate::models::{LlmAnalysis, StructuredJobDescription, StructuredResume};
use prompts::{SCORING_PROMPT_TEMPLATE, SCORING_SYSTEM};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("analysis response is not a JSON object")]
    NotAnObject,

    #[error("analysis response has the wrong shape: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Never fails: any internal error yields [`LlmAnalysis::failed`].
    async fn analyze(
        &self,
        resume: &StructuredResume,
        job_description: &StructuredJobDescription,
    ) -> LlmAnalysis;
}

/// Converts an analysis outcome into the record the scorer consumes.
pub fn analysis_or_failed(result: Result<LlmAnalysis, AnalysisError>, candidate_id: &str) -> LlmAnalysis {
    match result {
        Ok(analysis) => analysis,
        Err(e) => {
            error!("Analysis failed for candidate {candidate_id}: {e}");
            LlmAnalysis::failed()
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmAnalyzer {
    client: LlmClient,
}

impl LlmAnalyzer {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    pub async fn try_analyze(
        &self,
        resume: &StructuredResume,
        job_description: &StructuredJobDescription,
    ) -> Result<LlmAnalysis, AnalysisError> {
        info!(
            "Analyzing candidate {} against JD {}",
            resume.candidate_id, job_description.jd_id
        );
        let prompt = build_scoring_prompt(resume, job_description);
        let raw: serde_json::Value = self.client.call_json(&prompt, SCORING_SYSTEM).await?;
        let analysis = parse_analysis(raw)?;
        info!(
            "Analysis complete for {}: overall={:.1} similarity={:.1}",
            resume.candidate_id, analysis.overall_score, analysis.similarity_score
        );
        Ok(analysis)
    }
}

#[async_trait]
impl Analyzer for LlmAnalyzer {
    async fn analyze(
        &self,
        resume: &StructuredResume,
        job_description: &StructuredJobDescription,
    ) -> LlmAnalysis {
        analysis_or_failed(
            self.try_analyze(resume, job_description).await,
            &resume.candidate_id,
        )
    }
}

const SCORE_FIELDS: [&str; 2] = ["overall_score", "similarity_score"];

/// Fills the scoring template in a single pass, so placeholder-like text
/// inside resume or JD content is never substituted again.
pub fn build_scoring_prompt(resume: &StructuredResume, jd: &StructuredJobDescription) -> String {
    let name = if resume.name.trim().is_empty() {
        "Unknown"
    } else {
        resume.name.as_str()
    };
    let skills = resume.skills.join(", ");
    let requirements = jd.must_have_requirements.join("\n");

    let mut prompt = String::with_capacity(
        SCORING_PROMPT_TEMPLATE.len() + resume.raw_text.len() + jd.description.len(),
    );
    let mut rest = SCORING_PROMPT_TEMPLATE;
    while let Some(open) = rest.find('{') {
        prompt.push_str(&rest[..open]);
        let tail = &rest[open..];
        let value = tail.find('}').and_then(|close| {
            let text = match &tail[1..close] {
                "candidate_name" => name,
                "candidate_skills" => skills.as_str(),
                "must_have_requirements" => requirements.as_str(),
                "job_description" => jd.description.as_str(),
                "resume_text" => resume.raw_text.as_str(),
                _ => return None,
            };
            Some((text, close))
        });
        match value {
            Some((text, close)) => {
                prompt.push_str(text);
                rest = &tail[close + 1..];
            }
            None => {
                prompt.push('{');
                rest = &tail[1..];
            }
        }
    }
    prompt.push_str(rest);
    prompt
}

/// Validates a raw model response. Missing fields default, a missing or
/// non-numeric score reads as 0, and scores are clamped into [0, 100].
/// Only a non-object or a wrongly typed list/map field is rejected.
pub fn parse_analysis(mut raw: serde_json::Value) -> Result<LlmAnalysis, AnalysisError> {
    let object = raw.as_object_mut().ok_or(AnalysisError::NotAnObject)?;
    for field in SCORE_FIELDS {
        match object.get(field) {
            Some(value) if value.is_number() => {}
            Some(value) => {
                warn!("Analysis field {field} is not numeric ({value}); using 0");
                object.insert(field.to_string(), serde_json::Value::from(0.0));
            }
            None => warn!("Analysis response has no {field}; using 0"),
        }
    }
    let analysis: LlmAnalysis = serde_json::from_value(raw)?;
    Ok(analysis.sanitized())
}
