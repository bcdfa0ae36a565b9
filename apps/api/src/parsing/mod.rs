//! Raw text to structured records.
//!
//! Both parsers carry a [`ParseStrategy`] chosen once at construction. The
//! LLM strategy falls back to the rule-based one on any failure, so parsing
//! text never fails.

pub mod job;
pub mod prompts;
pub mod resume;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::llm_client::LlmClient;

pub use job::JobDescriptionParser;
pub use resume::ResumeParser;

#[derive(Debug, Clone)]
pub enum ParseStrategy {
    RuleBased,
    Llm(LlmClient),
}

impl ParseStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            ParseStrategy::RuleBased => "rule-based",
            ParseStrategy::Llm(_) => "llm",
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid {kind} JSON structure in {path}: {source}")]
    InvalidStructure {
        kind: &'static str,
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Reads a structured record from disk, requiring every schema field.
fn read_structured<T: serde::de::DeserializeOwned>(
    path: &Path,
    kind: &'static str,
) -> Result<T, ParseError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ParseError::InvalidStructure {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

/// Title-cased keywords found anywhere in `text`, in keyword order.
fn find_keywords(text: &str, keywords: &[&str]) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut found: Vec<String> = Vec::new();
    for keyword in keywords {
        if lower.contains(keyword) {
            let titled = title_case(keyword);
            if !found.contains(&titled) {
                found.push(titled);
            }
        }
    }
    found
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Returns the bullet text for `- item`, `* item` or `• item` lines.
fn bullet_text(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let rest = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('•'))
        .or_else(|| trimmed.strip_prefix('*'))?;
    let rest = rest.trim_start_matches(['-', '•', '*']).trim();
    (!rest.is_empty()).then_some(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_keywords_dedup_and_title_case() {
        let found = find_keywords("Python, PYTHON and Docker", &["python", "docker", "rust"]);
        assert_eq!(found, vec!["Python", "Docker"]);
    }

    #[test]
    fn test_bullet_text() {
        assert_eq!(bullet_text("  - Rust"), Some("Rust"));
        assert_eq!(bullet_text("• Go"), Some("Go"));
        assert_eq!(bullet_text("* SQL"), Some("SQL"));
        assert_eq!(bullet_text("Rust"), None);
        assert_eq!(bullet_text("-   "), None);
    }
}
