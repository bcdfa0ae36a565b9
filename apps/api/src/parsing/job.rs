use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use super::prompts::JD_PARSE_PROMPT_TEMPLATE;
use super::{bullet_text, find_keywords, read_structured, ParseError, ParseStrategy};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::StructuredJobDescription;

const TITLE_KEYWORDS: &[&str] = &["developer", "engineer", "manager", "analyst", "specialist"];
const MUST_HAVE_HEADERS: &[&str] = &["must have", "required", "essential", "mandatory"];
const MUST_HAVE_END: &[&str] = &["nice to have", "preferred"];
const NICE_TO_HAVE_HEADERS: &[&str] = &["nice to have", "preferred", "bonus", "plus"];
const REQUIREMENT_KEYWORDS: &[&str] = &[
    "python", "javascript", "java", "react", "node", "sql", "aws", "docker", "kubernetes", "git",
    "linux", "mongodb", "postgresql",
];

const TITLE_SCAN_LINES: usize = 5;
const MAX_TITLE_CHARS: usize = 100;
const MAX_REQUIREMENTS: usize = 10;

fn years_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"(\d+)\+?\s*years?\s*(?:of\s*)?experience").expect("valid regex"),
            Regex::new(r"(\d+)\+?\s*years?\s*(?:of\s*)?exp").expect("valid regex"),
            Regex::new(r"minimum\s*(\d+)\s*years").expect("valid regex"),
        ]
    })
}

#[derive(Debug, Clone)]
pub struct JobDescriptionParser {
    strategy: ParseStrategy,
}

impl JobDescriptionParser {
    pub fn new(strategy: ParseStrategy) -> Self {
        Self { strategy }
    }

    /// Parses raw JD text; see [`super::ResumeParser::parse_from_text`] for id rules.
    pub async fn parse_from_text(&self, text: &str, jd_id: Option<String>) -> StructuredJobDescription {
        if let Ok(jd) = serde_json::from_str::<StructuredJobDescription>(text) {
            return jd;
        }

        let jd_id = jd_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        match &self.strategy {
            ParseStrategy::RuleBased => parse_rule_based(text, jd_id),
            ParseStrategy::Llm(client) => match parse_with_llm(client, text, &jd_id).await {
                Ok(jd) => {
                    info!("Parsed job description {jd_id} with LLM");
                    jd
                }
                Err(e) => {
                    warn!("LLM job description parsing failed, falling back to rule-based: {e}");
                    parse_rule_based(text, jd_id)
                }
            },
        }
    }

    pub fn parse_from_json(&self, path: &Path) -> Result<StructuredJobDescription, ParseError> {
        read_structured(path, "job description")
    }
}

async fn parse_with_llm(
    client: &LlmClient,
    text: &str,
    jd_id: &str,
) -> Result<StructuredJobDescription, LlmError> {
    let prompt = JD_PARSE_PROMPT_TEMPLATE
        .replace("{jd_id}", jd_id)
        .replace("{no_fabrication}", NO_FABRICATION_INSTRUCTION)
        .replace("{jd_text}", text);

    let mut jd: StructuredJobDescription = client.call_json(&prompt, JSON_ONLY_SYSTEM).await?;
    if jd.jd_id.trim().is_empty() {
        jd.jd_id = jd_id.to_string();
    }
    if jd.raw_text.trim().is_empty() {
        jd.raw_text = text.to_string();
    }
    jd.metadata = None;
    Ok(jd)
}

pub fn parse_rule_based(text: &str, jd_id: String) -> StructuredJobDescription {
    StructuredJobDescription {
        jd_id,
        title: extract_title(text),
        must_have_requirements: extract_must_have(text),
        nice_to_have: extract_nice_to_have(text),
        description: text.to_string(),
        experience_years_required: extract_years_required(text),
        raw_text: text.to_string(),
        metadata: None,
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn extract_title(text: &str) -> String {
    text.lines()
        .take(TITLE_SCAN_LINES)
        .map(str::trim)
        .find(|line| {
            !line.is_empty()
                && line.chars().count() < MAX_TITLE_CHARS
                && contains_any(&line.to_lowercase(), TITLE_KEYWORDS)
        })
        .map(str::to_string)
        .unwrap_or_else(|| "Job Title".to_string())
}

/// Bullets under a must-have header, up to the nice-to-have section. Falls back
/// to known technology keywords when the text has no such section.
fn extract_must_have(text: &str) -> Vec<String> {
    let mut requirements = Vec::new();
    let mut in_section = false;

    for line in text.lines() {
        let lower = line.to_lowercase();
        if contains_any(&lower, MUST_HAVE_HEADERS) {
            in_section = true;
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some(item) = bullet_text(line) {
            requirements.push(item.to_string());
        } else if contains_any(&lower, MUST_HAVE_END) {
            break;
        }
    }

    if requirements.is_empty() {
        requirements = find_keywords(text, REQUIREMENT_KEYWORDS);
    }
    requirements.truncate(MAX_REQUIREMENTS);
    requirements
}

fn extract_nice_to_have(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut in_section = false;

    for line in text.lines() {
        if contains_any(&line.to_lowercase(), NICE_TO_HAVE_HEADERS) {
            in_section = true;
            continue;
        }
        if in_section {
            if let Some(item) = bullet_text(line) {
                items.push(item.to_string());
            }
        }
    }

    items.truncate(MAX_REQUIREMENTS);
    items
}

fn extract_years_required(text: &str) -> u32 {
    let lower = text.to_lowercase();
    years_patterns()
        .iter()
        .find_map(|re| re.captures(&lower))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
