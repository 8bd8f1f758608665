//! Email parsing: EML envelope reader, header decoding, and MIME walk.

pub mod eml;
pub mod header;
pub mod mime;

use std::path::Path;

use crate::error::Result;
use crate::model::mail::ParsedEmail;

/// Turns a source message on disk into header metadata, body and raw
/// attachments.
pub trait MailEnvelope {
    fn parse(&self, path: &Path) -> Result<ParsedEmail>;
}
