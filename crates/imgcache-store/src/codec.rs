//! Base64 wire representation of image payloads.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{Error, Result};

/// Encode raw bytes as standard, padded base64.
pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode standard base64.
///
/// ASCII whitespace anywhere in the input is ignored, so line-wrapped output
/// from tools like `base64` decodes as-is.
pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    let compact: Vec<u8> = encoded
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(compact)
        .map_err(|e| Error::Decode(format!("invalid base64: {e}")))
}
