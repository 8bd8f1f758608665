//! Email envelope types: header metadata, loosely-populated parser output,
//! and the validated record the orchestrator works with.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::attachment::RawAttachment;
use crate::error::{MailbriefError, Result};

/// The four headers carried into every processed record.
///
/// Values are unfolded and RFC 2047-decoded. A header absent from the
/// message is `None` and serializes as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMetadata {
    pub from: Option<String>,
    pub to: Option<String>,
    pub subject: Option<String>,
    pub date: Option<String>,
}

impl EmailMetadata {
    /// `true` when none of the four headers was found.
    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none() && self.subject.is_none() && self.date.is_none()
    }
}

/// Output of the mail-envelope collaborator.
///
/// Any of the three content fields may be missing; presence is checked
/// exactly once, by [`ParsedEmail::into_record`].
#[derive(Debug, Clone, Default)]
pub struct ParsedEmail {
    pub metadata: Option<EmailMetadata>,
    pub body: Option<String>,
    pub attachments: Option<Vec<RawAttachment>>,
    /// Source filename (e.g. `"invoice.eml"`).
    pub source_file: String,
    /// Filename stem, used as the key of the persisted result.
    pub id: String,
}

impl ParsedEmail {
    /// An empty parse result named after `path`.
    pub fn for_path(path: &Path) -> Self {
        Self {
            source_file: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            id: email_id(path),
            ..Self::default()
        }
    }

    /// Validate field presence and produce an [`EmailRecord`].
    pub fn into_record(self) -> Result<EmailRecord> {
        let metadata = self
            .metadata
            .ok_or(MailbriefError::MissingField("metadata"))?;
        let body = self.body.ok_or(MailbriefError::MissingField("body"))?;
        let attachments = self
            .attachments
            .ok_or(MailbriefError::MissingField("attachments"))?;

        Ok(EmailRecord {
            metadata,
            body,
            attachments,
            source_file: self.source_file,
            id: self.id,
        })
    }
}

/// A fully-populated email, ready for attachment extraction and
/// summarization.
#[derive(Debug, Clone)]
pub struct EmailRecord {
    pub metadata: EmailMetadata,
    /// First `text/plain` part, `""` when the message has none.
    pub body: String,
    /// Attachments in MIME-walk discovery order.
    pub attachments: Vec<RawAttachment>,
    pub source_file: String,
    pub id: String,
}

/// Derive the email id (filename stem) from a path.
pub fn email_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string())
}
