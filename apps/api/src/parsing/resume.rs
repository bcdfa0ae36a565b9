use std::path::Path;

use chrono::{Datelike, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use super::prompts::RESUME_PARSE_PROMPT_TEMPLATE;
use super::{find_keywords, read_structured, ParseError, ParseStrategy};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::{EducationEntry, ExperienceEntry, StructuredResume};
use crate::scoring::recency::extract_years;

const SKILL_KEYWORDS: &[&str] = &[
    "python", "javascript", "java", "react", "node", "sql", "aws", "docker", "kubernetes", "git",
    "linux", "mongodb", "postgresql", "typescript", "angular", "vue", "django", "flask", "fastapi",
];

const EDUCATION_KEYWORDS: &[&str] = &["university", "college", "degree", "bachelor", "master", "phd"];
const ONGOING_KEYWORDS: &[&str] = &["present", "current", "now"];

const NAME_SCAN_LINES: usize = 10;
const MAX_NAME_WORDS: usize = 4;
const MAX_EXPERIENCE: usize = 5;
const MAX_EDUCATION: usize = 3;

#[derive(Debug, Clone)]
pub struct ResumeParser {
    strategy: ParseStrategy,
}

impl ResumeParser {
    pub fn new(strategy: ParseStrategy) -> Self {
        Self { strategy }
    }

    /// Parses raw resume text. Text that already is a structured resume is
    /// returned as-is; otherwise a new random id is assigned unless one is given.
    pub async fn parse_from_text(&self, text: &str, candidate_id: Option<String>) -> StructuredResume {
        if let Ok(resume) = serde_json::from_str::<StructuredResume>(text) {
            return resume;
        }

        let candidate_id = candidate_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        match &self.strategy {
            ParseStrategy::RuleBased => parse_rule_based(text, candidate_id, Utc::now().year()),
            ParseStrategy::Llm(client) => match parse_with_llm(client, text, &candidate_id).await {
                Ok(resume) => {
                    info!("Parsed resume {candidate_id} with LLM");
                    resume
                }
                Err(e) => {
                    warn!("LLM resume parsing failed, falling back to rule-based: {e}");
                    parse_rule_based(text, candidate_id, Utc::now().year())
                }
            },
        }
    }

    /// Loads an already-structured resume. Every schema field must be present.
    pub fn parse_from_json(&self, path: &Path) -> Result<StructuredResume, ParseError> {
        read_structured(path, "resume")
    }
}

async fn parse_with_llm(
    client: &LlmClient,
    text: &str,
    candidate_id: &str,
) -> Result<StructuredResume, LlmError> {
    let prompt = RESUME_PARSE_PROMPT_TEMPLATE
        .replace("{candidate_id}", candidate_id)
        .replace("{no_fabrication}", NO_FABRICATION_INSTRUCTION)
        .replace("{resume_text}", text);

    let mut resume: StructuredResume = client.call_json(&prompt, JSON_ONLY_SYSTEM).await?;
    if resume.candidate_id.trim().is_empty() {
        resume.candidate_id = candidate_id.to_string();
    }
    if resume.raw_text.trim().is_empty() {
        resume.raw_text = text.to_string();
    }
    resume.metadata = None;
    Ok(resume)
}

/// Keyword and line heuristics. Deterministic for a given `current_year`.
pub fn parse_rule_based(text: &str, candidate_id: String, current_year: i32) -> StructuredResume {
    StructuredResume {
        candidate_id,
        name: extract_name(text),
        skills: find_keywords(text, SKILL_KEYWORDS),
        experience: extract_experience(text, current_year),
        education: extract_education(text),
        raw_text: text.to_string(),
        metadata: None,
    }
}

fn extract_name(text: &str) -> String {
    text.lines()
        .take(NAME_SCAN_LINES)
        .map(str::trim)
        .find(|line| {
            !line.is_empty()
                && line.split_whitespace().count() <= MAX_NAME_WORDS
                && line.chars().next().is_some_and(char::is_uppercase)
        })
        .map(str::to_string)
        .unwrap_or_else(|| "Unknown".to_string())
}

fn is_education_line(lower: &str) -> bool {
    EDUCATION_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Dated, non-education lines become entries. The first year on a line is the
/// start; the last year (or the current year for ongoing roles) is the end.
fn extract_experience(text: &str, current_year: i32) -> Vec<ExperienceEntry> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let lower = line.to_lowercase();
            if is_education_line(&lower) {
                return None;
            }
            let years = extract_years(line);
            let first = *years.first()?;
            let ongoing = ONGOING_KEYWORDS
                .iter()
                .any(|k| lower.split(|c: char| !c.is_alphanumeric()).any(|w| w == *k));
            let end = if ongoing {
                current_year.to_string()
            } else if years.len() > 1 {
                years[years.len() - 1].to_string()
            } else {
                String::new()
            };
            Some(ExperienceEntry {
                company: "Unknown".to_string(),
                position: line.to_string(),
                start_date: first.to_string(),
                end_date: end,
                description: String::new(),
            })
        })
        .take(MAX_EXPERIENCE)
        .collect()
}

fn extract_education(text: &str) -> Vec<EducationEntry> {
    text.lines()
        .map(str::trim)
        .filter(|line| is_education_line(&line.to_lowercase()))
        .take(MAX_EDUCATION)
        .map(|line| EducationEntry {
            institution: line.to_string(),
            year: extract_years(line).last().map(|y| serde_json::Value::from(*y)),
            ..Default::default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Ada Lovelace
ada@example.com

Senior Engineer, Analytical Engines 2019 - Present
Backend Developer at Difference Corp 2015 - 2019
Intern 2014

Skills: Python, Docker, Kubernetes and PostgreSQL
B.Sc. Mathematics, University of London 2013
";

    #[test]
    fn test_rule_based_fields() {
        let resume = parse_rule_based(SAMPLE, "c-1".to_string(), 2025);
        assert_eq!(resume.candidate_id, "c-1");
        assert_eq!(resume.name, "Ada Lovelace");
        assert_eq!(resume.skills, vec!["Python", "Sql", "Docker", "Kubernetes", "Postgresql"]);
        assert_eq!(resume.raw_text, SAMPLE);

        assert_eq!(resume.experience.len(), 3);
        assert_eq!(resume.experience[0].start_date, "2019");
        assert_eq!(resume.experience[0].end_date, "2025");
        assert_eq!(resume.experience[1].end_date, "2019");
        assert_eq!(resume.experience[2].start_date, "2014");
        assert_eq!(resume.experience[2].end_date, "");

        assert_eq!(resume.education.len(), 1);
        assert_eq!(resume.education[0].year, Some(serde_json::json!(2013)));
    }

    #[test]
    fn test_unknown_name_when_no_candidate_line() {
        let resume = parse_rule_based("lowercase start\n\n", "x".into(), 2025);
        assert_eq!(resume.name, "Unknown");
        assert!(resume.experience.is_empty());
    }

    #[test]
    fn test_experience_capped_at_five() {
        let text = (2010..2020).map(|y| format!("Job {y}")).collect::<Vec<_>>().join("\n");
        let resume = parse_rule_based(&text, "x".into(), 2025);
        assert_eq!(resume.experience.len(), MAX_EXPERIENCE);
    }

    #[tokio::test]
    async fn test_new_id_assigned_each_parse() {
        let parser = ResumeParser::new(ParseStrategy::RuleBased);
        let a = parser.parse_from_text(SAMPLE, None).await;
        let b = parser.parse_from_text(SAMPLE, None).await;
        assert_ne!(a.candidate_id, b.candidate_id);
        assert!(Uuid::parse_str(&a.candidate_id).is_ok());

        let kept = parser.parse_from_text(SAMPLE, Some("fixed".into())).await;
        assert_eq!(kept.candidate_id, "fixed");
    }

    #[tokio::test]
    async fn test_structured_text_passes_through() {
        let json = r#"{"candidate_id": "c-9", "name": "Grace", "skills": ["COBOL"],
                       "experience": [], "education": [], "raw_text": "Grace"}"#;
        let parser = ResumeParser::new(ParseStrategy::RuleBased);
        let resume = parser.parse_from_text(json, None).await;
        assert_eq!(resume.candidate_id, "c-9");
        assert_eq!(resume.skills, vec!["COBOL"]);
    }

    #[test]
    fn test_parse_from_json_requires_schema() {
        let dir = tempfile::TempDir::new().unwrap();
        let good = dir.path().join("good.json");
        std::fs::write(
            &good,
            r#"{"candidate_id": "c", "name": "n", "skills": [], "experience": [],
                "education": [], "raw_text": ""}"#,
        )
        .unwrap();
        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"{"name": "n"}"#).unwrap();

        let parser = ResumeParser::new(ParseStrategy::RuleBased);
        assert_eq!(parser.parse_from_json(&good).unwrap().candidate_id, "c");
        assert!(matches!(
            parser.parse_from_json(&bad),
            Err(ParseError::InvalidStructure { .. })
        ));
    }
}
