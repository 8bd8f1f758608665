//! Attachment text extraction: format classification, per-format
//! extractors, and the pipeline that ties them together.
//!
//! Every extractor converts its own failures into an error-tagged
//! [`ExtractionResult`]; nothing here returns `Err` to the caller.

pub mod classify;
pub mod docx;
pub mod image;
pub mod ocr;
pub mod pdf;
pub mod pipeline;

use thiserror::Error;

use crate::model::extraction::ExtractionResult;

pub use classify::{classify, FormatTag};
pub use pipeline::AttachmentPipeline;

/// Converts the raw bytes of one recognized format into text.
pub trait Extractor {
    /// Never fails: library errors become the matching `*_error` kind.
    fn extract(&self, filename: &str, payload: &[u8]) -> ExtractionResult;
}

/// Library failures raised inside an extractor, before they are folded
/// into an [`ExtractionResult`].
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("{0}")]
    Pdf(#[from] lopdf::Error),

    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
