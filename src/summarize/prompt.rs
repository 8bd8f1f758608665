//! Prompt construction for the summarization call.

use crate::model::record::SummaryRequest;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes emails concisely.";

/// Render the user prompt for one email.
///
/// The body is cut to `body_char_limit` characters; attachment results are
/// embedded as JSON so that error-tagged entries stay distinguishable from
/// empty ones.
pub fn build_prompt(request: &SummaryRequest<'_>, body_char_limit: usize) -> String {
    let email = request.email;
    let body = truncate_chars(request.body, body_char_limit);
    let attachments =
        serde_json::to_string_pretty(request.attachments).unwrap_or_else(|_| "[]".to_string());

    format!(
        "Summarize this email concisely (100 words max):

From: {from}
Subject: {subject}
Date: {date}

Body:
{body}


Attachments:
{attachments}

Key points to extract:
1. Main purpose
2. Action items
3. Important details
4. Numerical data
5. Summary of attachments (if any)",
        from = email.from.as_deref().unwrap_or(""),
        subject = email.subject.as_deref().unwrap_or(""),
        date = email.date.as_deref().unwrap_or(""),
    )
}

/// The first `limit` characters of `s`.
fn truncate_chars(s: &str, limit: usize) -> &str {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
