//! Unified error type for the image store.
//!
//! Every store operation funnels its failures into [`Error`], which carries
//! enough context for the HTTP layer to derive a status code via
//! [`Error::http_status`].

use std::fmt;

/// Failure modes of the image store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed base64, or bytes that do not decode as an image.
    #[error("Decode error: {0}")]
    Decode(String),

    /// No magic-number signature matched the content.
    #[error("Unknown format: no signature matched {len} bytes")]
    UnknownFormat {
        /// Length of the inspected payload.
        len: usize,
    },

    /// The content type has no encoder to re-serialize into.
    #[error("Unsupported format: {mime}")]
    UnsupportedFormat {
        /// The sniffed MIME type.
        mime: String,
    },

    /// The requested entry does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entry (e.g. "image", "group").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// An id or group name that cannot name a file under the cache root.
    #[error("Invalid id: {0}")]
    InvalidId(String),

    /// A filesystem operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Decode(_) => 422,
            Error::UnknownFormat { .. } => 500,
            Error::UnsupportedFormat { .. } => 415,
            Error::NotFound { .. } => 404,
            Error::InvalidId(_) => 400,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Short machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Decode(_) => "decode_error",
            Error::UnknownFormat { .. } => "unknown_format",
            Error::UnsupportedFormat { .. } => "unsupported_format",
            Error::NotFound { .. } => "not_found",
            Error::InvalidId(_) => "invalid_id",
            Error::Io { .. } => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::UnsupportedFormat`].
    pub fn unsupported(mime: impl Into<String>) -> Self {
        Error::UnsupportedFormat { mime: mime.into() }
    }

    /// Convert an I/O error on `path`, turning `NotFound` into [`Error::NotFound`].
    pub(crate) fn from_io(err: std::io::Error, entity: &str, id: impl fmt::Display) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::not_found(entity, id)
        } else {
            Error::Io { source: err }
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
