//! Human-readable explanations attached to each ranked candidate.

use std::collections::BTreeMap;

use crate::models::{LlmAnalysis, StructuredResume};

/// Known bare reason codes and their descriptions.
pub const REASON_CODE_TYPES: &[(&str, &str)] = &[
    ("SKILL_MATCH", "Skills matching the job description"),
    ("EXPERIENCE_MATCH", "Relevant experience found"),
    ("MUST_HAVE_MATCH", "Must-have requirements met"),
    ("RECENT_EXP", "Recent experience (last 2 years)"),
    ("EDUCATION_MATCH", "Relevant education"),
    ("MISSING_REQUIREMENT", "Missing requirements"),
];

fn describe(code: &str) -> Option<&'static str> {
    REASON_CODE_TYPES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, description)| *description)
}

/// Codes from the analysis followed by codes derived from the resume itself.
pub fn generate_reason_codes(analysis: &LlmAnalysis, resume: &StructuredResume) -> Vec<String> {
    let mut codes = analysis.reason_codes.clone();

    if !analysis.must_have_matches.is_empty() {
        codes.push(format!(
            "MUST_HAVE_MATCH: {} requirements met",
            analysis.must_have_matches.len()
        ));
    }
    if !resume.experience.is_empty() {
        codes.push("EXPERIENCE_MATCH: Work experience found".to_string());
    }
    if !resume.education.is_empty() {
        codes.push("EDUCATION_MATCH: Relevant education found".to_string());
    }
    codes
}

/// Expands bare codes (`"SKILL_MATCH"`) to `"CODE: description"`. Codes that
/// already carry detail, or are unknown, pass through unchanged.
pub fn format_reason_codes(codes: &[String]) -> Vec<String> {
    codes
        .iter()
        .map(|code| {
            if code.contains(':') {
                return code.clone();
            }
            match describe(code.trim()) {
                Some(description) => format!("{}: {description}", code.trim()),
                None => code.clone(),
            }
        })
        .collect()
}

/// Requirement -> resume section. Starts from the sections the analysis
/// reported and adds a located section for every declared must-have match.
pub fn map_hits_to_sections(analysis: &LlmAnalysis, resume: &StructuredResume) -> BTreeMap<String, String> {
    let mut mappings = analysis.matched_sections.clone();
    for hit in &analysis.must_have_matches {
        if let Some(section) = find_section_for_match(hit, resume) {
            mappings.insert(hit.clone(), section);
        }
    }
    mappings
}

/// First section mentioning `hit`: skills, then experience, then education,
/// then the raw text.
pub fn find_section_for_match(hit: &str, resume: &StructuredResume) -> Option<String> {
    let needle = hit.to_lowercase();
    if needle.is_empty() {
        return None;
    }

    if let Some(skill) = resume.skills.iter().find(|s| s.to_lowercase().contains(&needle)) {
        return Some(format!("Skills: {skill}"));
    }

    for exp in &resume.experience {
        if exp.company.to_lowercase().contains(&needle) || exp.position.to_lowercase().contains(&needle) {
            return Some(format!("Experience > {} > {}", exp.company, exp.position));
        }
        if exp.description.to_lowercase().contains(&needle) {
            return Some(format!("Experience > {} > {} > Description", exp.company, exp.position));
        }
    }

    if let Some(edu) = resume
        .education
        .iter()
        .find(|e| e.institution.to_lowercase().contains(&needle))
    {
        return Some(format!("Education > {}", edu.institution));
    }

    resume
        .raw_text
        .to_lowercase()
        .contains(&needle)
        .then(|| "Resume Text".to_string())
}
