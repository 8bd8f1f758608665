//! Format detection cascade: filename extension, then magic bytes, then a
//! speculative image decode.

/// Which extractor applies to an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatTag {
    Pdf,
    Docx,
    Image,
    Unknown,
}

impl FormatTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Image => "image",
            Self::Unknown => "unknown",
        }
    }
}

/// One step of the detection cascade.
pub struct Rule {
    pub name: &'static str,
    pub tag: FormatTag,
    /// Receives the lower-cased filename and the payload.
    pub matches: fn(&str, &[u8]) -> bool,
}

pub const PDF_MAGIC: &[u8] = b"%PDF";

const PDF_EXTENSIONS: &[&str] = &["pdf"];
const DOCX_EXTENSIONS: &[&str] = &["docx", "doc"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tiff"];

/// Cheap rules, evaluated in order; first match wins. The speculative
/// image decode runs only when none of these match.
pub const RULES: &[Rule] = &[
    Rule {
        name: "pdf extension",
        tag: FormatTag::Pdf,
        matches: pdf_extension,
    },
    Rule {
        name: "word extension",
        tag: FormatTag::Docx,
        matches: docx_extension,
    },
    Rule {
        name: "image extension",
        tag: FormatTag::Image,
        matches: image_extension,
    },
    Rule {
        name: "pdf magic bytes",
        tag: FormatTag::Pdf,
        matches: pdf_magic,
    },
];

fn pdf_extension(name: &str, _: &[u8]) -> bool {
    has_extension(name, PDF_EXTENSIONS)
}

fn docx_extension(name: &str, _: &[u8]) -> bool {
    has_extension(name, DOCX_EXTENSIONS)
}

fn image_extension(name: &str, _: &[u8]) -> bool {
    has_extension(name, IMAGE_EXTENSIONS)
}

fn pdf_magic(_: &str, payload: &[u8]) -> bool {
    payload.starts_with(PDF_MAGIC)
}

fn has_extension(lower_name: &str, extensions: &[&str]) -> bool {
    lower_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| extensions.contains(&ext))
}

/// First cheap rule matching a lower-cased filename and payload.
pub fn match_rule(lower_name: &str, payload: &[u8]) -> Option<&'static Rule> {
    RULES.iter().find(|rule| (rule.matches)(lower_name, payload))
}

/// Decide which extractor applies to `(filename, payload)`.
///
/// Pure: the speculative decode only inspects the bytes.
pub fn classify(filename: &str, payload: &[u8]) -> FormatTag {
    if let Some(rule) = match_rule(&filename.to_lowercase(), payload) {
        return rule.tag;
    }
    if ::image::load_from_memory(payload).is_ok() {
        FormatTag::Image
    } else {
        FormatTag::Unknown
    }
}
