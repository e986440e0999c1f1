//! Image inputs accepted by the service

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt;
use std::path::PathBuf;

/// Where the image to process comes from
#[derive(Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Local file, uploaded as a binary part
    File(PathBuf),
    /// Publicly reachable URL, fetched by the service
    Url(String),
    /// Base64-encoded image data
    Base64(String),
}

impl ImageSource {
    /// Local file source
    pub fn file<P: Into<PathBuf>>(path: P) -> Self {
        Self::File(path.into())
    }

    /// Remote URL source
    pub fn url<S: Into<String>>(url: S) -> Self {
        Self::Url(url.into())
    }

    /// Already encoded base64 payload
    pub fn base64<S: Into<String>>(payload: S) -> Self {
        Self::Base64(payload.into())
    }

    /// Encode raw image bytes into a base64 source
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::Base64(STANDARD.encode(bytes))
    }

    /// Short label for logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Url(_) => "url",
            Self::Base64(_) => "base64",
        }
    }
}

// Payloads can be megabytes of base64; keep them out of logs
impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Self::Base64(payload) => write!(f, "Base64(<{} chars>)", payload.len()),
        }
    }
}
