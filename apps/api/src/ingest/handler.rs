use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;

use super::scanner::{Collection, FileHandler, IngestedRecord};
use crate::extraction::{self, FileKind};
use crate::parsing::{JobDescriptionParser, ResumeParser};

/// Production [`FileHandler`]: JSON files are structured passthrough, PDF and
/// TXT files go through text extraction and then the configured parser.
#[derive(Debug, Clone)]
pub struct RawFileHandler {
    resume_parser: ResumeParser,
    jd_parser: JobDescriptionParser,
}

impl RawFileHandler {
    pub fn new(resume_parser: ResumeParser, jd_parser: JobDescriptionParser) -> Self {
        Self {
            resume_parser,
            jd_parser,
        }
    }
}

#[async_trait]
impl FileHandler for RawFileHandler {
    async fn handle(&self, path: &Path, collection: Collection) -> anyhow::Result<IngestedRecord> {
        let kind = FileKind::from_path(path)?;
        let owned = path.to_path_buf();

        if kind == FileKind::Json {
            tokio::task::spawn_blocking(move || extraction::validate_file(&owned))
                .await
                .context("validation task panicked")??;
            return Ok(match collection {
                Collection::Resumes => IngestedRecord::Resume(self.resume_parser.parse_from_json(path)?),
                Collection::JobDescriptions => {
                    IngestedRecord::JobDescription(self.jd_parser.parse_from_json(path)?)
                }
            });
        }

        let extracted = tokio::task::spawn_blocking(move || extraction::extract_text(&owned))
            .await
            .context("extraction task panicked")??;
        tracing::debug!(
            "Extracted {} ({} bytes, {} pages)",
            extracted.metadata.file_name,
            extracted.metadata.file_size,
            extracted.metadata.num_pages
        );

        Ok(match collection {
            Collection::Resumes => {
                IngestedRecord::Resume(self.resume_parser.parse_from_text(&extracted.text, None).await)
            }
            Collection::JobDescriptions => IngestedRecord::JobDescription(
                self.jd_parser.parse_from_text(&extracted.text, None).await,
            ),
        })
    }
}
