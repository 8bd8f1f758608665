//! Single-message orchestration: validate, extract, summarize, persist.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{error, info, warn};

use crate::error::catch_panic;
use crate::extract::AttachmentPipeline;
use crate::model::extraction::ExtractionResult;
use crate::model::mail::ParsedEmail;
use crate::model::record::{ProcessedRecord, SummaryRequest, SummaryResult};
use crate::parser::MailEnvelope;
use crate::store::ResultStore;
use crate::summarize::{summarize_or_fail, Summarizer};

/// What happened to one message.
#[derive(Debug)]
pub enum MessageOutcome {
    /// A record was produced. `output` is `None` when persisting it failed.
    Processed {
        record: Box<ProcessedRecord>,
        output: Option<PathBuf>,
    },
    /// The message could not be parsed or lacked a required field.
    Skipped { reason: String },
}

impl MessageOutcome {
    /// `true` when the record reached the result store.
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Processed { output: Some(_), .. })
    }
}

/// Drives one message through the attachment pipeline, the summarizer and
/// the result store.
pub struct MessageProcessor {
    envelope: Box<dyn MailEnvelope>,
    pipeline: AttachmentPipeline,
    summarizer: Box<dyn Summarizer>,
    store: ResultStore,
}

impl MessageProcessor {
    pub fn new(
        envelope: Box<dyn MailEnvelope>,
        pipeline: AttachmentPipeline,
        summarizer: Box<dyn Summarizer>,
        store: ResultStore,
    ) -> Self {
        Self {
            envelope,
            pipeline,
            summarizer,
            store,
        }
    }

    /// Parse `path` with the envelope reader, then [`process`](Self::process) it.
    pub fn process_file(&self, path: &Path) -> MessageOutcome {
        match self.envelope.parse(path) {
            Ok(parsed) => self.process(parsed),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to parse message");
                MessageOutcome::Skipped {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn process(&self, parsed: ParsedEmail) -> MessageOutcome {
        let source_file = parsed.source_file.clone();
        let email = match parsed.into_record() {
            Ok(email) => email,
            Err(e) => {
                error!(file = %source_file, error = %e, "Skipping message");
                return MessageOutcome::Skipped {
                    reason: e.to_string(),
                };
            }
        };

        info!(file = %email.source_file, attachments = email.attachments.len(), "Processing");

        let attachments: Vec<ExtractionResult> = email
            .attachments
            .iter()
            .map(|att| {
                catch_panic(|| self.pipeline.process(att)).unwrap_or_else(|msg| {
                    warn!(file = %email.source_file, filename = %att.filename, error = %msg, "Failed to process attachment");
                    ExtractionResult::error(&att.filename, msg)
                })
            })
            .collect();

        let request = SummaryRequest {
            email: &email.metadata,
            body: &email.body,
            attachments: &attachments,
        };
        let summary = catch_panic(|| summarize_or_fail(self.summarizer.as_ref(), &request))
            .unwrap_or_else(|msg| {
                error!(file = %email.source_file, error = %msg, "Summary failed");
                SummaryResult::Failed { error: msg }
            });

        let record = ProcessedRecord {
            timestamp: Local::now(),
            metadata: email.metadata,
            body: email.body,
            attachments,
            summary,
            source_file: email.source_file,
        };

        let output = match self.store.save(&email.id, &record) {
            Ok(path) => Some(path),
            Err(e) => {
                error!(id = %email.id, error = %e, "Failed to save result");
                None
            }
        };

        MessageOutcome::Processed {
            record: Box::new(record),
            output,
        }
    }
}
