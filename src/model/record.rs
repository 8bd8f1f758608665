//! Summary outcomes and the persisted per-email record.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::extraction::ExtractionResult;
use super::mail::EmailMetadata;

/// Outcome of the summarization call for one email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SummaryResult {
    Success { summary: String, model: String },
    Failed { error: String },
}

impl SummaryResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// The payload handed to the summarization collaborator.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SummaryRequest<'a> {
    pub email: &'a EmailMetadata,
    pub body: &'a str,
    pub attachments: &'a [ExtractionResult],
}

/// The unit persisted to `<output_dir>/<id>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedRecord {
    #[serde(rename = "processing_timestamp")]
    pub timestamp: DateTime<Local>,
    #[serde(rename = "email")]
    pub metadata: EmailMetadata,
    pub body: String,
    /// One entry per raw attachment, in the same order.
    pub attachments: Vec<ExtractionResult>,
    pub summary: SummaryResult,
    pub source_file: String,
}
