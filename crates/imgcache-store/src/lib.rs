//! imgcache-store: content-addressed image storage.
//!
//! This crate is the whole of the image cache's domain logic:
//!
//! - **Ids**: checksum-derived [`ImageId`]s that double as filenames
//! - **Codec**: base64 wire representation of uploaded payloads
//! - **Sniffing**: magic-number MIME detection behind [`MimeSniffer`]
//! - **Resize**: format-preserving thumbnails and background previews
//! - **Storage**: [`ImageStore`], a flat directory of raw image bytes
//!
//! # Examples
//!
//! ```no_run
//! use imgcache_store::{ImageStore, ResizePreset};
//!
//! let store = ImageStore::new("/var/cache/images");
//! let bytes = std::fs::read("photo.png")?;
//! let id = store.persist(&bytes)?;
//! let thumb = store.render(&id, &ResizePreset::thumbnail())?;
//! assert_eq!(thumb.mime, "image/png");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod codec;
pub mod error;
pub mod ids;
pub mod mime;
pub mod resize;
pub mod storage;

#[cfg(test)]
mod test_fixtures;

pub use error::{Error, Result};
pub use ids::{Checksum, ImageId};
pub use mime::{InferSniffer, MimeSniffer};
pub use resize::{resize, ResampleFilter, ResizePreset};
pub use storage::{ImageEntry, ImageStore, StoredImage};
