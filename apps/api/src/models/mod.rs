//! Structured records exchanged between ingestion, storage, analysis and scoring.

pub mod analysis;
pub mod job;
pub mod resume;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub use analysis::{LlmAnalysis, ANALYSIS_FAILED_REASON};
pub use job::StructuredJobDescription;
pub use resume::{EducationEntry, ExperienceEntry, StructuredResume};

/// Storage metadata attached when a record is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordMetadata {
    pub saved_at: DateTime<Utc>,
    pub filename: String,
}

/// Treats an explicit JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `5`, `5.0`, `"5"`, `"5+"` or garbage; anything unparseable becomes 0.
pub(crate) fn lenient_years<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .map(|n| n.min(u32::MAX as u64) as u32)
            .unwrap_or(0),
        Some(serde_json::Value::String(s)) => {
            let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().unwrap_or(0)
        }
        _ => 0,
    })
}
