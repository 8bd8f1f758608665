//! Parser for individual `.eml` files (RFC 5322 messages without MBOX framing).

use std::path::Path;

use tracing::debug;

use super::mime::{skip_from_line, walk_message};
use super::MailEnvelope;
use crate::error::{MailbriefError, Result};
use crate::model::mail::ParsedEmail;

/// Reads `.eml` files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmlEnvelope;

impl MailEnvelope for EmlEnvelope {
    fn parse(&self, path: &Path) -> Result<ParsedEmail> {
        let data = std::fs::read(path).map_err(|e| MailbriefError::io(path, e))?;
        parse_eml_bytes(path, &data)
    }
}

/// Parse the bytes of a single `.eml` file named `path`.
///
/// `metadata` is left unset when the header block holds none of
/// `From`/`To`/`Subject`/`Date`, so the orchestrator skips the message.
pub fn parse_eml_bytes(path: &Path, data: &[u8]) -> Result<ParsedEmail> {
    let data = skip_from_line(data);
    if data.iter().all(u8::is_ascii_whitespace) {
        return Err(MailbriefError::ParseError {
            path: path.to_path_buf(),
            reason: "empty message".into(),
        });
    }

    let content = walk_message(data).ok_or_else(|| MailbriefError::ParseError {
        path: path.to_path_buf(),
        reason: "not a MIME message".into(),
    })?;

    debug!(
        path = %path.display(),
        attachments = content.attachments.len(),
        body_len = content.body.len(),
        "Parsed message"
    );

    let mut parsed = ParsedEmail::for_path(path);
    parsed.metadata = (!content.metadata.is_empty()).then_some(content.metadata);
    parsed.body = Some(content.body);
    parsed.attachments = Some(content.attachments);
    Ok(parsed)
}
