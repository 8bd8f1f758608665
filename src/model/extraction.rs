//! Per-attachment extraction outcomes.

use serde::{Deserialize, Serialize};

/// Basic facts about a decoded image, recorded whether or not OCR succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Container format (`"PNG"`, `"JPEG"`, …).
    pub format: String,
    /// `"{width}x{height}"`.
    pub dimensions: String,
    /// Color mode after normalization (`"RGB"`, `"L"`, …).
    pub mode: String,
}

/// The always-present result of attempting to extract text from one
/// attachment.
///
/// Serialized with a `type` tag so that consumers can tell an empty result
/// from a failed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExtractionResult {
    Pdf {
        filename: String,
        text: String,
        pages: usize,
    },
    PdfError {
        filename: String,
        text: String,
    },
    Docx {
        filename: String,
        text: String,
    },
    DocxError {
        filename: String,
        text: String,
    },
    /// Decoding succeeded. `error` is set when recognition failed.
    Image {
        filename: String,
        text: String,
        info: ImageInfo,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    ImageError {
        filename: String,
        text: String,
    },
    Unknown {
        filename: String,
        text: String,
        error: String,
    },
    /// A failure that escaped an extractor.
    Error {
        filename: String,
        text: String,
    },
}

impl ExtractionResult {
    /// The serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pdf { .. } => "pdf",
            Self::PdfError { .. } => "pdf_error",
            Self::Docx { .. } => "docx",
            Self::DocxError { .. } => "docx_error",
            Self::Image { .. } => "image",
            Self::ImageError { .. } => "image_error",
            Self::Unknown { .. } => "unknown",
            Self::Error { .. } => "error",
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            Self::Pdf { filename, .. }
            | Self::PdfError { filename, .. }
            | Self::Docx { filename, .. }
            | Self::DocxError { filename, .. }
            | Self::Image { filename, .. }
            | Self::ImageError { filename, .. }
            | Self::Unknown { filename, .. }
            | Self::Error { filename, .. } => filename,
        }
    }

    /// Extracted text, or the failure description for error kinds.
    pub fn text(&self) -> &str {
        match self {
            Self::Pdf { text, .. }
            | Self::PdfError { text, .. }
            | Self::Docx { text, .. }
            | Self::DocxError { text, .. }
            | Self::Image { text, .. }
            | Self::ImageError { text, .. }
            | Self::Unknown { text, .. }
            | Self::Error { text, .. } => text,
        }
    }

    /// `true` when no usable text was produced because something failed.
    ///
    /// An image whose OCR failed counts as a failure even though its kind
    /// is `image`.
    pub fn is_failure(&self) -> bool {
        match self {
            Self::Pdf { .. } | Self::Docx { .. } => false,
            Self::Image { error, .. } => error.is_some(),
            _ => true,
        }
    }

    pub fn error(filename: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Error {
            filename: filename.into(),
            text: format!("Processing failed: {message}"),
        }
    }

    pub fn unknown(filename: impl Into<String>) -> Self {
        Self::Unknown {
            filename: filename.into(),
            text: String::new(),
            error: "Could not determine file type".to_string(),
        }
    }
}
