//! Filesystem-level image storage keyed by content checksum.
//!
//! Images live as raw bytes at `{root}/{id}` with no extension and no sidecar
//! metadata. MIME type and format are recomputed from the bytes on every read.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::{Error, Result};
use crate::ids::{Checksum, ImageId};
use crate::mime::{self, InferSniffer, MimeSniffer, OCTET_STREAM};
use crate::resize::{self, ResizePreset};

/// Names skipped by [`ImageStore::list`] unless configured otherwise.
pub const DEFAULT_IGNORED_FILES: &[&str] = &[".DS_Store"];

/// An image loaded from the store together with its sniffed type.
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Checksum of the original bytes; also the filename.
    pub id: ImageId,
    /// The payload (original or resized).
    pub bytes: Vec<u8>,
    /// MIME type sniffed from the original bytes.
    pub mime: String,
}

impl StoredImage {
    /// Uppercase subtype of [`mime`](Self::mime), e.g. `PNG`.
    pub fn format(&self) -> String {
        mime::format_token(&self.mime)
    }
}

/// A listing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub id: ImageId,
    pub mime: String,
}

/// Content-addressed image store rooted at a single directory.
///
/// The store performs no locking: concurrent writers to the same id race at
/// the filesystem level and the last write wins.
pub struct ImageStore {
    root: PathBuf,
    checksum: Checksum,
    sniffer: Arc<dyn MimeSniffer>,
    ignored_files: Vec<String>,
}

impl ImageStore {
    /// Create a store rooted at `root` using Adler-32 ids and the `infer`
    /// sniffer.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            checksum: Checksum::default(),
            sniffer: Arc::new(InferSniffer::new()),
            ignored_files: DEFAULT_IGNORED_FILES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Use `checksum` to derive ids for newly persisted images.
    pub fn with_checksum(mut self, checksum: Checksum) -> Self {
        self.checksum = checksum;
        self
    }

    /// Replace the MIME sniffer.
    pub fn with_sniffer(mut self, sniffer: Arc<dyn MimeSniffer>) -> Self {
        self.sniffer = sniffer;
        self
    }

    /// Replace the set of filenames [`list`](Self::list) skips.
    pub fn with_ignored_files(mut self, names: Vec<String>) -> Self {
        self.ignored_files = names;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn checksum_algorithm(&self) -> Checksum {
        self.checksum
    }

    /// Create the root directory if it does not exist yet.
    pub fn ensure_root(&self) -> Result<()> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root)?;
            tracing::info!("Created image cache directory {}", self.root.display());
        }
        Ok(())
    }

    /// The id `data` would be stored under.
    pub fn checksum(&self, data: &[u8]) -> ImageId {
        self.checksum.compute(data)
    }

    /// Sniff the MIME type of `data`.
    pub fn sniff(&self, data: &[u8]) -> Result<String> {
        self.sniffer.sniff(data)
    }

    /// Write `data` verbatim to `{root}/{checksum(data)}`.
    ///
    /// An existing file at that path is overwritten, so pushing identical
    /// bytes twice is a no-op and a checksum collision replaces the older
    /// image.
    ///
    /// # Returns
    ///
    /// The id the bytes were stored under.
    pub fn persist(&self, data: &[u8]) -> Result<ImageId> {
        let id = self.checksum(data);
        let path = self.path_for(&id);
        std::fs::write(&path, data)?;
        tracing::info!("Stored image {} ({} bytes)", id, data.len());
        Ok(id)
    }

    /// Decode a base64 payload and [`persist`](Self::persist) it.
    pub fn push_encoded(&self, encoded: &str) -> Result<ImageId> {
        let data = codec::decode(encoded)?;
        self.persist(&data)
    }

    /// Read the stored bytes for `id`.
    pub fn load(&self, id: &ImageId) -> Result<Vec<u8>> {
        std::fs::read(self.path_for(id)).map_err(|e| Error::from_io(e, "image", id))
    }

    /// Load `id` and sniff its MIME type.
    pub fn open(&self, id: &ImageId) -> Result<StoredImage> {
        let bytes = self.load(id)?;
        let mime = self.sniff(&bytes)?;
        Ok(StoredImage {
            id: id.clone(),
            bytes,
            mime,
        })
    }

    /// Load `id` and shrink it to fit `preset`, keeping its format.
    pub fn render(&self, id: &ImageId, preset: &ResizePreset) -> Result<StoredImage> {
        let original = self.open(id)?;
        tracing::debug!(
            "Rendering {} as {} within {}x{}",
            id,
            original.format(),
            preset.max_width,
            preset.max_height
        );
        let bytes = resize::resize(
            &original.bytes,
            &original.mime,
            preset.max_width,
            preset.max_height,
            preset.filter,
        )?;
        Ok(StoredImage { bytes, ..original })
    }

    /// Remove `id` from the store.
    pub fn delete(&self, id: &ImageId) -> Result<()> {
        std::fs::remove_file(self.path_for(id)).map_err(|e| Error::from_io(e, "image", id))?;
        tracing::info!("Deleted image {}", id);
        Ok(())
    }

    /// List the images directly under the root, or under `{root}/{group}`.
    ///
    /// Directories, ignored names and names that are not valid ids are
    /// skipped. Every file is read and sniffed; content matching no signature
    /// is reported as `application/octet-stream`, and files that cannot be
    /// read are skipped with a warning. Order follows directory
    /// enumeration and is not sorted.
    pub fn list(&self, group: Option<&str>) -> Result<Vec<ImageEntry>> {
        let dir = match group {
            Some(name) => {
                validate_group(name)?;
                self.root.join(name)
            }
            None => self.root.clone(),
        };

        let entries = std::fs::read_dir(&dir)
            .map_err(|e| Error::from_io(e, "group", group.unwrap_or("/")))?;

        let mut listed = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            // Follows symlinks, so a linked image still counts as a file.
            if !path.is_file() {
                continue;
            }

            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                tracing::debug!("Skipping non UTF-8 filename in {}", dir.display());
                continue;
            };
            if self.ignored_files.iter().any(|ignored| ignored == name) {
                continue;
            }
            let Ok(id) = ImageId::parse(name) else {
                tracing::debug!("Skipping {name}: not an image id");
                continue;
            };

            // Unreadable or vanished since read_dir: skip rather than fail the listing.
            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!("Could not read {}: {e}", path.display());
                    continue;
                }
            };
            let mime = match self.sniff(&bytes) {
                Ok(mime) => mime,
                Err(e) => {
                    tracing::warn!("Could not sniff {}: {e}", path.display());
                    OCTET_STREAM.to_string()
                }
            };
            listed.push(ImageEntry { id, mime });
        }

        tracing::debug!("Listed {} images in {}", listed.len(), dir.display());
        Ok(listed)
    }

    fn path_for(&self, id: &ImageId) -> PathBuf {
        self.root.join(id.as_str())
    }
}

/// A group must be one plain path component.
fn validate_group(name: &str) -> Result<()> {
    let plain = !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && Path::new(name).components().count() == 1;
    if plain {
        Ok(())
    } else {
        Err(Error::InvalidId(format!("invalid group: {name}")))
    }
}
