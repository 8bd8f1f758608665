//! Per-email summarization through a chat-completions backend.

pub mod openai;
pub mod prompt;
pub mod throttle;

use thiserror::Error;
use tracing::warn;

use crate::model::record::{SummaryRequest, SummaryResult};

pub use openai::OpenAiSummarizer;

/// Errors from the summarization backend.
#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("{0} environment variable not set")]
    MissingApiKey(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Backend returned {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Failed to parse backend response: {0}")]
    ResponseParsing(String),

    #[error("Backend returned no summary text")]
    EmptyResponse,
}

/// A generated summary and the model that wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub text: String,
    pub model: String,
}

/// Produces a free-text summary of one email.
///
/// Implementations are interchangeable; the orchestrator only sees this
/// trait.
pub trait Summarizer {
    fn summarize(&self, request: &SummaryRequest<'_>) -> Result<Summary, SummaryError>;
}

/// Call `summarizer`, folding any failure into [`SummaryResult::Failed`].
pub fn summarize_or_fail(summarizer: &dyn Summarizer, request: &SummaryRequest<'_>) -> SummaryResult {
    match summarizer.summarize(request) {
        Ok(summary) => SummaryResult::Success {
            summary: summary.text,
            model: summary.model,
        },
        Err(e) => {
            warn!(error = %e, "Summary generation failed");
            SummaryResult::Failed {
                error: e.to_string(),
            }
        }
    }
}
