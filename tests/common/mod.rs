//! Shared fixtures: generated attachments, MIME messages, and mock
//! collaborators.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::DynamicImage;
use lopdf::{dictionary, Document, Object, Stream};

use mailbrief::extract::ocr::{OcrEngine, OcrError};
use mailbrief::extract::AttachmentPipeline;
use mailbrief::model::record::SummaryRequest;
use mailbrief::parser::eml::EmlEnvelope;
use mailbrief::process::MessageProcessor;
use mailbrief::store::ResultStore;
use mailbrief::summarize::{Summarizer, Summary, SummaryError};

// ─── Attachment payloads ────────────────────────────────────────────

/// A PDF with one Helvetica text line per page.
pub fn pdf_bytes(page_texts: &[&str]) -> Vec<u8> {
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
        let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
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

/// A minimal Word document with one run per paragraph.
pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(image::RgbaImage::new(width, height))
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

// ─── Messages ───────────────────────────────────────────────────────

/// One attachment of a generated message.
pub struct Part<'a> {
    pub filename: &'a str,
    pub content_type: &'a str,
    pub payload: &'a [u8],
}

/// A `multipart/mixed` message with a plain-text body and base64
/// attachments.
pub fn eml(subject: &str, body: &str, parts: &[Part<'_>]) -> String {
    let mut out = format!(
        "From: Sender <sender@example.com>\r\n\
         To: team@example.com\r\n\
         Subject: {subject}\r\n\
         Date: Tue, 7 Oct 2025 10:15:00 +0200\r\n\
         MIME-Version: 1.0\r\n\
         Content-Type: multipart/mixed; boundary=\"BOUNDARY\"\r\n\
         \r\n\
         --BOUNDARY\r\n\
         Content-Type: text/plain; charset=utf-8\r\n\
         \r\n\
         {body}\r\n"
    );
    for part in parts {
        out.push_str(&format!(
            "--BOUNDARY\r\n\
             Content-Type: {ct}; name=\"{name}\"\r\n\
             Content-Disposition: attachment; filename=\"{name}\"\r\n\
             Content-Transfer-Encoding: base64\r\n\
             \r\n\
             {data}\r\n",
            ct = part.content_type,
            name = part.filename,
            data = base64_lines(part.payload),
        ));
    }
    out.push_str("--BOUNDARY--\r\n");
    out
}

pub fn write_eml(dir: &Path, id: &str, contents: &str) {
    std::fs::write(dir.join(format!("{id}.eml")), contents).unwrap();
}

/// Standard base64 wrapped at 76 columns.
fn base64_lines(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    encoded
        .as_bytes()
        .chunks(76)
        .map(|line| String::from_utf8_lossy(line).into_owned())
        .collect::<Vec<_>>()
        .join("\r\n")
}

// ─── Log capture ────────────────────────────────────────────────────

/// In-memory log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a plain-text subscriber and return its result plus
/// everything that was logged.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let value = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (value, logs)
}

// ─── Mock collaborators ─────────────────────────────────────────────

/// Describes the request instead of calling a backend.
pub struct StubSummarizer;

impl Summarizer for StubSummarizer {
    fn summarize(&self, request: &SummaryRequest<'_>) -> Result<Summary, SummaryError> {
        Ok(Summary {
            text: format!(
                "{} with {} attachment(s)",
                request.email.subject.as_deref().unwrap_or("(no subject)"),
                request.attachments.len()
            ),
            model: "stub".to_string(),
        })
    }
}

/// Always fails as an unreachable backend would.
pub struct OfflineSummarizer;

impl Summarizer for OfflineSummarizer {
    fn summarize(&self, _request: &SummaryRequest<'_>) -> Result<Summary, SummaryError> {
        Err(SummaryError::Http("connection refused".to_string()))
    }
}

/// Recognizes every image as the same text.
pub struct FixedOcr(pub &'static str);

impl OcrEngine for FixedOcr {
    fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
        Ok(self.0.to_string())
    }
}

/// Crashes on every image.
pub struct PanickingOcr;

impl OcrEngine for PanickingOcr {
    fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
        panic!("native OCR library aborted")
    }
}

pub fn processor(
    output_dir: &Path,
    summarizer: impl Summarizer + 'static,
    ocr: impl OcrEngine + 'static,
) -> MessageProcessor {
    MessageProcessor::new(
        Box::new(EmlEnvelope),
        AttachmentPipeline::new(Box::new(ocr)),
        Box::new(summarizer),
        ResultStore::create(output_dir).unwrap(),
    )
}
