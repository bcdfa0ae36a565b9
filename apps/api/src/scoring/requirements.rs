//! Must-have requirement coverage.
//!
//! A requirement is satisfied when its text appears (case-insensitively) in one
//! of three evidence sources, checked in priority order:
//! 1. a match string the LLM declared
//! 2. a skill from the candidate's skill list
//! 3. the candidate's raw resume text

use serde::Serialize;

/// Where the evidence for a satisfied requirement was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    LlmMatch,
    Skill,
    RawText,
}

/// Returns the first evidence source containing `requirement`, if any.
pub fn match_requirement(
    requirement: &str,
    llm_matches: &[String],
    skills: &[String],
    raw_text: &str,
) -> Option<EvidenceSource> {
    let needle = requirement.to_lowercase();

    if llm_matches
        .iter()
        .any(|m| m.to_lowercase().contains(&needle))
    {
        return Some(EvidenceSource::LlmMatch);
    }

    if skills.iter().any(|s| s.to_lowercase().contains(&needle)) {
        return Some(EvidenceSource::Skill);
    }

    if raw_text.to_lowercase().contains(&needle) {
        return Some(EvidenceSource::RawText);
    }

    None
}

/// Fraction of `requirements` with evidence in any source, in [0, 1].
///
/// No requirements means no boost (0.0), not a perfect score.
pub fn compute_requirement_coverage(
    requirements: &[String],
    llm_matches: &[String],
    skills: &[String],
    raw_text: &str,
) -> f64 {
    if requirements.is_empty() {
        return 0.0;
    }

    let matched = requirements
        .iter()
        .filter(|req| match_requirement(req, llm_matches, skills, raw_text).is_some())
        .count();

    let coverage = matched as f64 / requirements.len() as f64;
    tracing::debug!(
        "Must-have coverage: {matched}/{} = {coverage:.2}",
        requirements.len()
    );
    coverage.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_requirements_is_zero() {
        assert_eq!(
            compute_requirement_coverage(&[], &strings(&["Rust"]), &strings(&["rust"]), "rust"),
            0.0
        );
    }

    #[test]
    fn test_llm_match_substring_counts() {
        let coverage = compute_requirement_coverage(
            &strings(&["Python"]),
            &strings(&["Python expert"]),
            &[],
            "",
        );
        assert_eq!(coverage, 1.0);
    }

    #[test]
    fn test_half_covered_by_skills() {
        let coverage =
            compute_requirement_coverage(&strings(&["Python", "Rust"]), &[], &strings(&["python"]), "");
        assert_eq!(coverage, 0.5);
    }

    #[test]
    fn test_raw_text_is_last_resort() {
        let coverage = compute_requirement_coverage(
            &strings(&["Kubernetes"]),
            &[],
            &[],
            "Operated KUBERNETES clusters in production",
        );
        assert_eq!(coverage, 1.0);
    }

    #[test]
    fn test_requirement_must_be_substring_of_evidence_not_reverse() {
        // "Rust" in a match string satisfies "Rust", but "Rust" does not satisfy "Rust and Go".
        let coverage =
            compute_requirement_coverage(&strings(&["Rust and Go"]), &strings(&["Rust"]), &[], "");
        assert_eq!(coverage, 0.0);
    }

    #[test]
    fn test_evidence_priority_order() {
        let llm = strings(&["Senior Python developer"]);
        let skills = strings(&["python"]);
        assert_eq!(
            match_requirement("Python", &llm, &skills, "python"),
            Some(EvidenceSource::LlmMatch)
        );
        assert_eq!(
            match_requirement("Python", &[], &skills, "python"),
            Some(EvidenceSource::Skill)
        );
        assert_eq!(
            match_requirement("Python", &[], &[], "python"),
            Some(EvidenceSource::RawText)
        );
        assert_eq!(match_requirement("Python", &[], &[], ""), None);
    }

    #[test]
    fn test_each_requirement_counted_once() {
        let coverage = compute_requirement_coverage(
            &strings(&["SQL"]),
            &strings(&["SQL", "PostgreSQL"]),
            &strings(&["sql"]),
            "sql sql sql",
        );
        assert_eq!(coverage, 1.0);
    }
}
