//! MIME walk: first plain-text body plus every part that carries a filename.

use mail_parser::{MessageParser, MessagePart, MimeHeaders, PartType};

use super::header::metadata_from_message;
use crate::model::attachment::RawAttachment;
use crate::model::mail::EmailMetadata;

/// Headers, body and attachments found by walking a message's MIME tree.
#[derive(Debug, Clone, Default)]
pub struct MimeContent {
    /// Envelope fields of the outermost message.
    pub metadata: EmailMetadata,
    /// First `text/plain` part without a filename, charset-decoded.
    /// Empty when the message has none.
    pub body: String,
    /// Every part carrying a filename, in discovery order. Parts of
    /// forwarded (`message/rfc822`) messages are included.
    pub attachments: Vec<RawAttachment>,
}

/// Walk a complete raw message (headers + body).
///
/// Returns `None` when `mail-parser` cannot make sense of the bytes.
pub fn walk_message(message_bytes: &[u8]) -> Option<MimeContent> {
    let msg = MessageParser::default().parse(message_bytes)?;

    let mut body: Option<String> = None;
    let mut attachments = Vec::new();
    collect_parts(&msg.parts, &mut body, &mut attachments);

    Some(MimeContent {
        metadata: metadata_from_message(&msg),
        body: body.unwrap_or_default(),
        attachments,
    })
}

/// Depth-first over a flattened part list, descending into embedded
/// messages where they appear.
fn collect_parts(
    parts: &[MessagePart<'_>],
    body: &mut Option<String>,
    attachments: &mut Vec<RawAttachment>,
) {
    for part in parts {
        let content_type = part_content_type(part);

        match &part.body {
            PartType::Multipart(_) => continue,
            PartType::Message(inner) => {
                if let Some(name) = part.attachment_name() {
                    attachments.push(RawAttachment::new(
                        name,
                        content_type.unwrap_or_else(|| "message/rfc822".to_string()),
                        part.contents(),
                    ));
                }
                collect_parts(&inner.parts, body, attachments);
                continue;
            }
            _ => {}
        }

        if let Some(name) = part.attachment_name() {
            attachments.push(RawAttachment::new(
                name,
                content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
                part.contents(),
            ));
            continue;
        }

        // A part without Content-Type defaults to text/plain (RFC 2045 §5.2)
        let is_plain = content_type.map_or(true, |ct| ct == "text/plain");
        if is_plain && body.is_none() {
            let text = match part.text_contents() {
                Some(text) => text.to_string(),
                None => String::from_utf8_lossy(part.contents()).into_owned(),
            };
            *body = Some(text);
        }
    }
}

/// `type/subtype`, lower-cased, if the part declares a content type.
fn part_content_type(part: &MessagePart<'_>) -> Option<String> {
    part.content_type().map(|ct: &mail_parser::ContentType| {
        let main = ct.ctype();
        match ct.subtype() {
            Some(sub) => format!("{main}/{sub}").to_lowercase(),
            None => main.to_lowercase(),
        }
    })
}

/// Skip a leading BOM and the `From ` separator line left by MBOX exports.
pub fn skip_from_line(data: &[u8]) -> &[u8] {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);

    if data.starts_with(b"From ") {
        if let Some(pos) = data.iter().position(|&b| b == b'\n') {
            return &data[pos + 1..];
        }
    }
    data
}
