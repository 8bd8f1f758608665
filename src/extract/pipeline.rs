//! Routes each raw attachment to its extractor.

use tracing::{debug, warn};

use super::classify::{match_rule, FormatTag};
use super::docx::DocxExtractor;
use super::image::ImageExtractor;
use super::ocr::{engine_from_config, OcrEngine};
use super::pdf::PdfExtractor;
use super::Extractor;
use crate::config::OcrConfig;
use crate::error::catch_panic;
use crate::model::attachment::RawAttachment;
use crate::model::extraction::ExtractionResult;

/// Classifies and extracts attachments, one at a time.
///
/// [`process`](Self::process) always returns a result; panics raised by a
/// decoder are contained and reported as kind `error`.
pub struct AttachmentPipeline {
    pdf: PdfExtractor,
    docx: DocxExtractor,
    image: ImageExtractor,
}

impl AttachmentPipeline {
    pub fn new(ocr: Box<dyn OcrEngine>) -> Self {
        Self {
            pdf: PdfExtractor,
            docx: DocxExtractor,
            image: ImageExtractor::new(ocr),
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(engine_from_config(config))
    }

    pub fn process(&self, attachment: &RawAttachment) -> ExtractionResult {
        let filename = attachment.filename.as_str();
        debug!(filename, size = attachment.size(), "Extracting attachment");
        match catch_panic(|| self.detect_and_extract(filename, &attachment.payload)) {
            Ok(result) => result,
            Err(msg) => {
                warn!(filename, error = %msg, "Extractor panicked");
                ExtractionResult::error(filename, msg)
            }
        }
    }

    fn detect_and_extract(&self, filename: &str, payload: &[u8]) -> ExtractionResult {
        let lower = filename.to_lowercase();

        if let Some(rule) = match_rule(&lower, payload) {
            debug!(
                filename,
                rule = rule.name,
                format = rule.tag.as_str(),
                "Classified attachment"
            );
            return match rule.tag {
                FormatTag::Pdf => self.pdf.extract(filename, payload),
                FormatTag::Docx => self.docx.extract(filename, payload),
                FormatTag::Image => self.image.extract(filename, payload),
                FormatTag::Unknown => ExtractionResult::unknown(filename),
            };
        }

        // Last resort: anything the image decoders accept is an image. The
        // decode and the extraction share one pass.
        match self.image.extract(filename, payload) {
            ExtractionResult::ImageError { .. } => {
                debug!(filename, "Unrecognized attachment");
                ExtractionResult::unknown(filename)
            }
            result => {
                debug!(filename, rule = "image decode", "Classified attachment");
                result
            }
        }
    }
}
