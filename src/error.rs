//! Centralized error types for mailbrief.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mailbrief library.
#[derive(Error, Debug)]
pub enum MailbriefError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file or directory does not exist.
    #[error("Not found: {0}")]
    FileNotFound(PathBuf),

    /// The message could not be parsed as RFC 5322 / MIME.
    #[error("Failed to parse '{path}': {reason}")]
    ParseError { path: PathBuf, reason: String },

    /// The parsed email lacks a required field.
    #[error("Invalid email data structure: missing {0}")]
    MissingField(&'static str),

    /// Missing credential or unusable configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading or writing a persisted result failed.
    #[error("Result store error for '{path}': {reason}")]
    Store { path: PathBuf, reason: String },

    /// The summarization backend could not be set up or reached.
    #[error("Summarizer error: {0}")]
    Summarizer(#[from] crate::summarize::SummaryError),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, MailbriefError>`.
pub type Result<T> = std::result::Result<T, MailbriefError>;

impl MailbriefError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::FileNotFound(path);
        }
        Self::Io { path, source }
    }
}

/// Run `f`, turning an unwinding panic into its message.
///
/// Used at every isolation boundary so one bad attachment or message cannot
/// take down its caller.
pub fn catch_panic<T>(f: impl FnOnce() -> T) -> std::result::Result<T, String> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).map_err(|payload| {
        if let Some(msg) = payload.downcast_ref::<&str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        }
    })
}
