//! Envelope metadata (`From`, `To`, `Subject`, `Date`) read from the
//! top-level headers of a parsed message.

use mail_parser::{Addr, Address, HeaderName, Message};

use crate::model::mail::EmailMetadata;

/// Decoded envelope fields; absent headers stay `None`.
///
/// Addresses are rendered as `Name <addr>` and joined with `", "`. The
/// date is the header text as written, not reformatted.
pub fn metadata_from_message(msg: &Message<'_>) -> EmailMetadata {
    EmailMetadata {
        from: address_header(msg.from(), msg.header_raw(HeaderName::From)),
        to: address_header(msg.to(), msg.header_raw(HeaderName::To)),
        subject: msg.subject().map(str::to_string),
        date: msg.header_raw(HeaderName::Date).map(unfold),
    }
}

/// Formatted address list, or the unfolded raw value when the header is
/// present but holds nothing address-like.
fn address_header(parsed: Option<&Address<'_>>, raw: Option<&str>) -> Option<String> {
    let formatted = parsed.map(format_address_list).filter(|s| !s.is_empty());
    formatted.or_else(|| raw.map(unfold))
}

fn format_address_list(address: &Address<'_>) -> String {
    address
        .iter()
        .filter_map(format_addr)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_addr(addr: &Addr<'_>) -> Option<String> {
    let name = addr.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let email = addr.address.as_deref().map(str::trim).filter(|a| !a.is_empty());
    match (name, email) {
        (Some(name), Some(email)) if name.contains([',', ';', '"']) => {
            Some(format!("\"{}\" <{email}>", name.replace('"', "\\\"")))
        }
        (Some(name), Some(email)) => Some(format!("{name} <{email}>")),
        (None, Some(email)) => Some(email.to_string()),
        (Some(name), None) => Some(name.to_string()),
        (None, None) => None,
    }
}

/// Join folded continuation lines and trim the value.
fn unfold(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
