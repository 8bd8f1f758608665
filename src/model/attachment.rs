//! Raw attachment payloads as discovered during the MIME walk.

/// An undecoded attachment: the transfer-decoded bytes plus the naming
/// information found in its MIME headers.
///
/// Created fresh for every processing run and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttachment {
    /// Filename from `Content-Disposition` / `Content-Type; name=`.
    pub filename: String,

    /// MIME content type (e.g. `"image/jpeg"`, `"application/pdf"`).
    pub content_type: String,

    /// Transfer-decoded payload. May be empty.
    pub payload: Vec<u8>,
}

impl RawAttachment {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            payload: payload.into(),
        }
    }

    /// Decoded size in bytes.
    pub fn size(&self) -> u64 {
        self.payload.len() as u64
    }
}
