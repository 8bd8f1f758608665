//! Word (OOXML) text extraction: paragraphs of `word/document.xml`.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::{ExtractError, Extractor};
use crate::model::extraction::ExtractionResult;

const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Clone, Copy, Default)]
pub struct DocxExtractor;

impl Extractor for DocxExtractor {
    fn extract(&self, filename: &str, payload: &[u8]) -> ExtractionResult {
        match extract_docx_text(payload) {
            Ok(text) => ExtractionResult::Docx {
                filename: filename.to_string(),
                text,
            },
            Err(e) => ExtractionResult::DocxError {
                filename: filename.to_string(),
                text: format!("DOCX processing failed: {e}"),
            },
        }
    }
}

/// Top-level body paragraphs joined by newlines. Not trimmed.
pub fn extract_docx_text(payload: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(payload))?;
    let mut xml = String::new();
    archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;
    paragraphs_from_xml(&xml)
}

/// Walk `document.xml` and collect the text of each paragraph that is a
/// direct child of `w:body` (table cell paragraphs are not included).
///
/// Only runs owned by the paragraph itself or by one of its hyperlinks
/// count, so text boxes and other drawing content stay out.
fn paragraphs_from_xml(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);

    // Names of the open elements, outermost first
    let mut open: Vec<Vec<u8>> = Vec::new();
    // (stack index of the open top-level paragraph, its text)
    let mut current: Option<(usize, String)> = None;
    let mut paragraphs: Vec<String> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                if name == b"w:p" && current.is_none() && is_body_child(&open) {
                    current = Some((open.len(), String::new()));
                }
                open.push(name);
            }
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" if current.is_none() && is_body_child(&open) => {
                    paragraphs.push(String::new());
                }
                tag @ (b"w:tab" | b"w:br" | b"w:cr") => {
                    if let Some((para, text)) = current.as_mut() {
                        if in_paragraph_run(&open, *para) {
                            text.push(if tag == b"w:tab" { '\t' } else { '\n' });
                        }
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                let Some((para, text)) = current.as_mut() else {
                    continue;
                };
                if let Some((last, parents)) = open.split_last() {
                    if last == b"w:t" && in_paragraph_run(parents, *para) {
                        text.push_str(&t.unescape().map_err(quick_xml::Error::from)?);
                    }
                }
            }
            Event::End(_) => {
                open.pop();
                if current.as_ref().is_some_and(|(para, _)| *para == open.len()) {
                    if let Some((_, text)) = current.take() {
                        paragraphs.push(text);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}

fn is_body_child(open: &[Vec<u8>]) -> bool {
    open.last().is_some_and(|name| name == b"w:body")
}

/// `open` ends in a `w:r` held by the paragraph at index `para`, either
/// directly or through a `w:hyperlink`.
fn in_paragraph_run(open: &[Vec<u8>], para: usize) -> bool {
    match open.get(para + 1..) {
        Some([run]) => run == b"w:r",
        Some([link, run]) => link == b"w:hyperlink" && run == b"w:r",
        _ => false,
    }
}
