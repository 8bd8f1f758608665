//! PDF text extraction via `lopdf`.

use tracing::debug;

use super::{ExtractError, Extractor};
use crate::model::extraction::ExtractionResult;

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl Extractor for PdfExtractor {
    fn extract(&self, filename: &str, payload: &[u8]) -> ExtractionResult {
        match extract_pdf_text(payload) {
            Ok((text, pages)) => ExtractionResult::Pdf {
                filename: filename.to_string(),
                text,
                pages,
            },
            Err(e) => ExtractionResult::PdfError {
                filename: filename.to_string(),
                text: format!("PDF processing failed: {e}"),
            },
        }
    }
}

/// Page texts joined by newlines (trimmed), and the page count.
///
/// A page whose text cannot be extracted contributes an empty string.
pub fn extract_pdf_text(payload: &[u8]) -> Result<(String, usize), ExtractError> {
    let doc = lopdf::Document::load_mem(payload)?;

    // get_pages() is keyed by page number, so iteration is in page order
    let pages = doc.get_pages();
    let texts: Vec<String> = pages
        .keys()
        .map(|&page| doc.extract_text(&[page]).unwrap_or_default())
        .collect();

    debug!(pages = pages.len(), "Extracted PDF text");

    Ok((texts.join("\n").trim().to_string(), pages.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Document, Object, Stream};

    /// Build a PDF with one page per entry of `page_texts`.
    fn create_pdf(page_texts: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.4");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::new();
        for text in page_texts {
            let content = format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET");
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => resources_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_texts.len() as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_extract_single_page() {
        let result = PdfExtractor.extract("memo.pdf", &create_pdf(&["Hello World"]));
        match result {
            ExtractionResult::Pdf {
                filename,
                text,
                pages,
            } => {
                assert_eq!(filename, "memo.pdf");
                assert_eq!(pages, 1);
                assert!(text.contains("Hello"), "got: {text:?}");
                assert_eq!(text, text.trim());
            }
            other => panic!("expected pdf, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_multipage_in_order() {
        let (text, pages) = extract_pdf_text(&create_pdf(&["Alpha", "Bravo", "Charlie"])).unwrap();
        assert_eq!(pages, 3);
        let a = text.find("Alpha").expect("Alpha");
        let b = text.find("Bravo").expect("Bravo");
        let c = text.find("Charlie").expect("Charlie");
        assert!(a < b && b < c);
    }

    #[test]
    fn test_corrupt_pdf_with_magic() {
        let result = PdfExtractor.extract("broken.pdf", b"%PDF-1.4\nthis is not a pdf body");
        assert_eq!(result.kind(), "pdf_error");
        assert!(result.text().starts_with("PDF processing failed: "));
    }

    #[test]
    fn test_empty_payload() {
        let result = PdfExtractor.extract("empty.pdf", b"");
        assert_eq!(result.kind(), "pdf_error");
    }
}
