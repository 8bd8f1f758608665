//! Image decoding plus OCR.
//!
//! Decoding failures are hard (`image_error`); recognition failures are
//! soft: the result keeps kind `image` with its metadata, empty text, and
//! an `error` field.

use image::{ColorType, DynamicImage, ImageError, ImageFormat};
use tracing::{debug, warn};

use super::ocr::OcrEngine;
use super::Extractor;
use crate::model::extraction::{ExtractionResult, ImageInfo};

pub struct ImageExtractor {
    ocr: Box<dyn OcrEngine>,
}

impl ImageExtractor {
    pub fn new(ocr: Box<dyn OcrEngine>) -> Self {
        Self { ocr }
    }
}

impl Extractor for ImageExtractor {
    fn extract(&self, filename: &str, payload: &[u8]) -> ExtractionResult {
        let (image, info) = match decode_image(payload) {
            Ok(decoded) => decoded,
            Err(e) => {
                return ExtractionResult::ImageError {
                    filename: filename.to_string(),
                    text: describe_decode_error(&e),
                }
            }
        };

        match self.ocr.recognize(&image) {
            Ok(text) => {
                debug!(filename, chars = text.len(), "OCR complete");
                ExtractionResult::Image {
                    filename: filename.to_string(),
                    text: text.trim().to_string(),
                    info,
                    error: None,
                }
            }
            Err(e) => {
                warn!(filename, error = %e, "OCR failed");
                ExtractionResult::Image {
                    filename: filename.to_string(),
                    text: String::new(),
                    info,
                    error: Some(format!("OCR failed: {e}")),
                }
            }
        }
    }
}

/// Decode, normalize alpha images to RGB, and describe the result.
pub fn decode_image(payload: &[u8]) -> Result<(DynamicImage, ImageInfo), ImageError> {
    let format = image::guess_format(payload)?;
    let image = normalize(image::load_from_memory_with_format(payload, format)?);

    let info = ImageInfo {
        format: format_name(format),
        dimensions: format!("{}x{}", image.width(), image.height()),
        mode: mode_name(image.color()),
    };
    Ok((image, info))
}

/// OCR engines misread alpha channels; flatten those to 3-channel RGB.
///
/// Palette images are already expanded by the decoders.
fn normalize(image: DynamicImage) -> DynamicImage {
    if image.color().has_alpha() {
        DynamicImage::ImageRgb8(image.to_rgb8())
    } else {
        image
    }
}

fn describe_decode_error(error: &ImageError) -> String {
    match error {
        ImageError::Unsupported(_) => "Unrecognized image format".to_string(),
        other => format!("Image processing failed: {other}"),
    }
}

fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Png => "PNG".to_string(),
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::Gif => "GIF".to_string(),
        ImageFormat::Bmp => "BMP".to_string(),
        ImageFormat::Tiff => "TIFF".to_string(),
        other => format!("{other:?}").to_uppercase(),
    }
}

/// Conventional short mode names (`L`, `RGB`, …). Deep-color variants
/// share the 8-bit name; floating-point images are `F`.
fn mode_name(color: ColorType) -> String {
    let name = match color {
        ColorType::L8 => "L",
        ColorType::L16 => "I;16",
        ColorType::La8 | ColorType::La16 => "LA",
        ColorType::Rgb8 | ColorType::Rgb16 => "RGB",
        ColorType::Rgba8 | ColorType::Rgba16 => "RGBA",
        ColorType::Rgb32F | ColorType::Rgba32F => "F",
        other => match other.channel_count() {
            1 => "L",
            2 => "LA",
            3 => "RGB",
            _ => "RGBA",
        },
    };
    name.to_string()
}
