//! Content-type sniffing by magic number.
//!
//! The store never trusts filenames: every MIME type is derived from the
//! leading bytes of the payload. Sniffing sits behind [`MimeSniffer`] so the
//! detection backend can be swapped (tests use a fixed fake).

use image::ImageFormat;
use infer::Infer;

use crate::error::{Error, Result};

/// Reported for listed entries whose content matches no signature.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Derives a MIME type from raw bytes.
pub trait MimeSniffer: Send + Sync {
    /// Inspect `data` and return its MIME type, or [`Error::UnknownFormat`].
    fn sniff(&self, data: &[u8]) -> Result<String>;
}

/// [`MimeSniffer`] backed by the `infer` crate's signature tables.
pub struct InferSniffer {
    infer: Infer,
}

impl InferSniffer {
    pub fn new() -> Self {
        Self {
            infer: Infer::new(),
        }
    }
}

impl Default for InferSniffer {
    fn default() -> Self {
        Self::new()
    }
}

impl MimeSniffer for InferSniffer {
    fn sniff(&self, data: &[u8]) -> Result<String> {
        self.infer
            .get(data)
            .map(|kind| kind.mime_type().to_string())
            .ok_or(Error::UnknownFormat { len: data.len() })
    }
}

/// Uppercase subtype token of a MIME type: `image/png` -> `PNG`.
pub fn format_token(mime: &str) -> String {
    mime.split_once('/')
        .map(|(_, subtype)| subtype)
        .unwrap_or(mime)
        .to_uppercase()
}

/// The `image` crate format matching `mime`, if it has one.
pub fn image_format(mime: &str) -> Option<ImageFormat> {
    ImageFormat::from_mime_type(mime)
}
