use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{null_as_default, RecordMetadata};

/// One work-history entry. Dates are free text ("Jan 2021", "Present", "2019-06").
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExperienceEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub position: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EducationEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub institution: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub degree: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub field: String,
    /// Number or string depending on who produced the record.
    #[serde(default)]
    pub year: Option<Value>,
}

/// A candidate resume in the fixed schema every downstream stage consumes.
///
/// The top-level fields are required: a JSON file missing any of them is not a
/// structured resume. `null` collections are accepted and read as empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StructuredResume {
    #[serde(deserialize_with = "null_as_default")]
    pub candidate_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub education: Vec<EducationEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub raw_text: String,
    #[serde(rename = "_metadata", default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RecordMetadata>,
}
