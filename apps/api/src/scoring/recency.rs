//! Experience recency boost.
//!
//! Decay by years since the most recent dated experience:
//! - `<= 0` years: 1.0
//! - `1..=2` years: 1.0 - 0.3 per year (0.7, 0.4)
//! - `> 2` years: 0.4 - 0.1 per year beyond 2, floored at 0.0
//!
//! Computed in integer tenths so the boundary values come out exact.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::ExperienceEntry;

fn year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("valid year regex"))
}

/// First four-digit 19xx/20xx year in `date`, if any.
pub fn extract_year(date: &str) -> Option<i32> {
    year_pattern()
        .find(date)
        .and_then(|m| m.as_str().parse().ok())
}

/// Every 19xx/20xx year in `text`, in order of appearance.
pub fn extract_years(text: &str) -> Vec<i32> {
    year_pattern()
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// Latest year across all entries, preferring each entry's end date and
/// falling back to its start date when the end date has no year.
pub fn most_recent_year(entries: &[ExperienceEntry]) -> Option<i32> {
    entries
        .iter()
        .filter_map(|e| extract_year(&e.end_date).or_else(|| extract_year(&e.start_date)))
        .max()
}

/// Boost for experience that ended `years_ago` years before the current year.
/// Negative values (future dates) score as current.
pub fn recency_boost_for_years_ago(years_ago: i32) -> f64 {
    let tenths: i64 = if years_ago <= 0 {
        10
    } else if years_ago <= 2 {
        10 - 3 * years_ago as i64
    } else {
        (4 - (years_ago as i64 - 2)).max(0)
    };
    (tenths as f64 / 10.0).clamp(0.0, 1.0)
}

/// Recency boost in [0, 1]; 0.0 when no entry carries a recognizable year.
pub fn compute_recency_boost(entries: &[ExperienceEntry], current_year: i32) -> f64 {
    let Some(latest) = most_recent_year(entries) else {
        return 0.0;
    };
    let years_ago = current_year - latest;
    let boost = recency_boost_for_years_ago(years_ago);
    tracing::debug!("Recency boost: {latest} ({years_ago} years ago) = {boost:.2}");
    boost
}
