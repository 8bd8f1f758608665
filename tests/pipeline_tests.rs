//! Integration tests for attachment classification, extraction and the
//! pipeline's failure isolation.

mod common;

use common::{capture_logs, docx_bytes, pdf_bytes, png_bytes, FixedOcr, PanickingOcr};
use mailbrief::extract::ocr::DisabledOcr;
use mailbrief::extract::{classify, AttachmentPipeline, FormatTag};
use mailbrief::model::attachment::RawAttachment;
use mailbrief::model::extraction::ExtractionResult;

fn pipeline() -> AttachmentPipeline {
    AttachmentPipeline::new(Box::new(FixedOcr("RECEIPT TOTAL 12.50")))
}

fn attachment(filename: &str, payload: Vec<u8>) -> RawAttachment {
    RawAttachment::new(filename, "application/octet-stream", payload)
}

// ─── Classification ─────────────────────────────────────────────────

#[test]
fn test_classify_generated_fixtures() {
    assert_eq!(classify("memo.pdf", &pdf_bytes(&["x"])), FormatTag::Pdf);
    assert_eq!(classify("minutes.docx", &docx_bytes(&["x"])), FormatTag::Docx);
    assert_eq!(classify("logo.png", &png_bytes(2, 2)), FormatTag::Image);
    assert_eq!(classify("unnamed", &pdf_bytes(&["x"])), FormatTag::Pdf);
    assert_eq!(classify("unnamed", &png_bytes(2, 2)), FormatTag::Image);
    // A Word file without its extension is just a zip
    assert_eq!(classify("unnamed", &docx_bytes(&["x"])), FormatTag::Unknown);
}

// ─── Extraction ─────────────────────────────────────────────────────

#[test]
fn test_pdf_text_and_page_count() {
    let result = pipeline().process(&attachment("Quarterly.PDF", pdf_bytes(&["Revenue", "Costs"])));
    match result {
        ExtractionResult::Pdf {
            filename,
            text,
            pages,
        } => {
            assert_eq!(filename, "Quarterly.PDF");
            assert_eq!(pages, 2);
            assert!(text.contains("Revenue") && text.contains("Costs"), "got {text:?}");
        }
        other => panic!("expected pdf, got {other:?}"),
    }
}

#[test]
fn test_docx_paragraphs() {
    let result = pipeline().process(&attachment("notes.docx", docx_bytes(&["One", "Two", "Three"])));
    assert_eq!(result.kind(), "docx");
    assert_eq!(result.text(), "One\nTwo\nThree");
}

#[test]
fn test_image_metadata_and_ocr() {
    let result = pipeline().process(&attachment("receipt.png", png_bytes(40, 30)));
    match result {
        ExtractionResult::Image {
            text, info, error, ..
        } => {
            assert_eq!(text, "RECEIPT TOTAL 12.50");
            assert_eq!(info.format, "PNG");
            assert_eq!(info.dimensions, "40x30");
            assert_eq!(info.mode, "RGB");
            assert!(error.is_none());
        }
        other => panic!("expected image, got {other:?}"),
    }
}

#[test]
fn test_ocr_failure_keeps_image_kind() {
    let pipeline = AttachmentPipeline::new(Box::new(DisabledOcr));
    let result = pipeline.process(&attachment("receipt.png", png_bytes(4, 4)));
    assert_eq!(result.kind(), "image");
    assert_eq!(result.text(), "");
    assert!(result.is_failure());
}

// ─── Failure isolation ──────────────────────────────────────────────

#[test]
fn test_degenerate_inputs_always_yield_one_result() {
    let inputs = vec![
        attachment("", vec![]),
        attachment("empty.pdf", vec![]),
        attachment("trunc", b"%PD".to_vec()),
        attachment("trunc.pdf", b"%PDF".to_vec()),
        attachment("blank.docx", vec![]),
        attachment("blank.png", vec![]),
        attachment("noise.bin", (0..=255u8).collect()),
    ];
    let pipeline = pipeline();
    let kinds: Vec<&'static str> = inputs.iter().map(|a| pipeline.process(a).kind()).collect();
    assert_eq!(
        kinds,
        [
            "unknown",
            "pdf_error",
            "unknown",
            "pdf_error",
            "docx_error",
            "image_error",
            "unknown"
        ]
    );
}

#[test]
fn test_corrupt_pdf_magic_is_pdf_error() {
    let mut payload = pdf_bytes(&["Hello"]);
    payload.truncate(40);
    let result = pipeline().process(&attachment("scan", payload));
    assert_eq!(result.kind(), "pdf_error");
    assert!(result.text().starts_with("PDF processing failed: "));
}

#[test]
fn test_zip_is_unknown() {
    let result = pipeline().process(&attachment("archive.zip", docx_bytes(&["inside"])));
    match result {
        ExtractionResult::Unknown { text, error, .. } => {
            assert!(text.is_empty());
            assert_eq!(error, "Could not determine file type");
        }
        other => panic!("expected unknown, got {other:?}"),
    }
}

#[test]
fn test_panicking_engine_becomes_error_result() {
    let pipeline = AttachmentPipeline::new(Box::new(PanickingOcr));
    let result = pipeline.process(&attachment("photo.jpg", png_bytes(3, 3)));
    assert_eq!(result.kind(), "error");
    assert_eq!(result.filename(), "photo.jpg");
    assert_eq!(result.text(), "Processing failed: native OCR library aborted");

    // The pipeline stays usable afterwards
    let next = pipeline.process(&attachment("memo.pdf", pdf_bytes(&["ok"])));
    assert_eq!(next.kind(), "pdf");
}

#[test]
fn test_classification_is_logged_with_size_and_format() {
    let payload = pdf_bytes(&["Logged"]);
    let size = payload.len();
    let (result, logs) = capture_logs(|| pipeline().process(&attachment("memo.pdf", payload)));
    assert_eq!(result.kind(), "pdf");

    let extracting = logs
        .lines()
        .find(|line| line.contains("Extracting attachment"))
        .unwrap_or_else(|| panic!("logs:\n{logs}"));
    assert!(extracting.contains(&format!("size={size}")), "{extracting}");

    let classified = logs
        .lines()
        .find(|line| line.contains("Classified attachment"))
        .unwrap_or_else(|| panic!("logs:\n{logs}"));
    assert!(classified.contains("format=\"pdf\"") || classified.contains("format=pdf"));
}
