//! Content-derived image identifiers.
//!
//! An [`ImageId`] doubles as the on-disk filename, so it is validated to be a
//! plain alphanumeric token before it ever touches a path.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Longest accepted id (a hex SHA-256 digest is 64 characters).
const MAX_ID_LEN: usize = 128;

/// Identifier of a stored image, also its filename under the cache root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    /// Validate `s` as an id: 1..=128 ASCII alphanumeric characters.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() || s.len() > MAX_ID_LEN {
            return Err(Error::InvalidId(format!("length {} out of range", s.len())));
        }
        if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(Error::InvalidId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ImageId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for ImageId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ImageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Algorithm used to derive an [`ImageId`] from image bytes.
///
/// `Adler32` is fast but collides easily; two different images that share a
/// checksum overwrite each other silently. `Sha256` keeps the same API shape
/// with a cryptographic digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Checksum {
    /// Adler-32 rendered as an unsigned decimal string.
    #[default]
    Adler32,
    /// Full SHA-256 digest as lowercase hex.
    Sha256,
}

impl Checksum {
    /// Compute the id for `data`. Same input, same id.
    pub fn compute(&self, data: &[u8]) -> ImageId {
        match self {
            Checksum::Adler32 => ImageId(adler2::adler32_slice(data).to_string()),
            Checksum::Sha256 => ImageId(hex::encode(Sha256::digest(data))),
        }
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Checksum::Adler32 => f.write_str("adler32"),
            Checksum::Sha256 => f.write_str("sha256"),
        }
    }
}
