use serde::{Deserialize, Serialize};

use super::{lenient_years, null_as_default, RecordMetadata};

/// A job description in the fixed schema consumed by analysis and scoring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StructuredJobDescription {
    #[serde(deserialize_with = "null_as_default")]
    pub jd_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub must_have_requirements: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nice_to_have: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    /// Minimum years of experience; 0 when absent or unparseable.
    #[serde(default, deserialize_with = "lenient_years")]
    pub experience_years_required: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub raw_text: String,
    #[serde(rename = "_metadata", default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RecordMetadata>,
}
