//! Text recognition engines for image attachments.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use image::{DynamicImage, ImageFormat};
use thiserror::Error;
use tracing::debug;

use crate::config::OcrConfig;

/// Engine-level recognition failures. These never turn a decoded image
/// into an extraction error; they are reported alongside it.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("could not start '{}': {source}", command.display())]
    Spawn {
        command: PathBuf,
        source: std::io::Error,
    },

    #[error("tesseract exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("could not hand image to engine: {0}")]
    Encode(#[from] image::ImageError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("OCR disabled in configuration")]
    Disabled,
}

/// Recognizes text in an already-decoded, normalized image.
pub trait OcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Runs the `tesseract` command-line program, streaming a PNG through
/// stdin and reading the text from stdout.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: PathBuf,
    languages: String,
}

impl TesseractCli {
    pub fn new(command: impl AsRef<Path>, languages: &str) -> Self {
        Self {
            command: command.as_ref().to_path_buf(),
            languages: languages.to_string(),
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(&config.tesseract_cmd, &config.languages)
    }

    /// First line of `tesseract --version`, used by the connectivity check.
    pub fn version(&self) -> Result<String, OcrError> {
        let output = Command::new(&self.command)
            .arg("--version")
            .output()
            .map_err(|source| self.spawn_error(source))?;
        // Older releases print the banner on stderr
        let banner = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        Ok(String::from_utf8_lossy(&banner)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string())
    }

    fn spawn_error(&self, source: std::io::Error) -> OcrError {
        OcrError::Spawn {
            command: self.command.clone(),
            source,
        }
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", self.languages.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| self.spawn_error(source))?;

        // A child that dies early breaks the pipe; its exit status says why
        let write_result = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&png),
            None => Ok(()),
        };
        let output = child.wait_with_output()?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        write_result?;

        debug!(
            bytes_in = png.len(),
            chars_out = output.stdout.len(),
            "Tesseract finished"
        );
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Engine used when OCR is switched off: every image reports why it has
/// no text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledOcr;

impl OcrEngine for DisabledOcr {
    fn recognize(&self, _image: &DynamicImage) -> Result<String, OcrError> {
        Err(OcrError::Disabled)
    }
}

/// Build the engine selected by the configuration.
pub fn engine_from_config(config: &OcrConfig) -> Box<dyn OcrEngine> {
    if config.enabled {
        Box::new(TesseractCli::from_config(config))
    } else {
        Box::new(DisabledOcr)
    }
}
