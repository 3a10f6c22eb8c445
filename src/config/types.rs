use imgcache_store::{Checksum, ResampleFilter, ResizePreset};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub previews: PreviewConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body; base64 uploads are ~4/3 of the image size
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_max_body_bytes() -> usize {
    32 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Directory holding one file per cached image
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Id derivation: "adler32" or "sha256"
    #[serde(default)]
    pub checksum: Checksum,

    /// Filenames skipped when listing (OS artifacts)
    #[serde(default = "default_ignored_files")]
    pub ignored_files: Vec<String>,
}

fn default_root() -> PathBuf {
    PathBuf::from("/mnt/volumes/container/images")
}
fn default_ignored_files() -> Vec<String> {
    imgcache_store::storage::DEFAULT_IGNORED_FILES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            checksum: Checksum::default(),
            ignored_files: default_ignored_files(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PreviewConfig {
    #[serde(
        default = "ResizePreset::thumbnail",
        deserialize_with = "thumbnail_preset"
    )]
    pub thumbnail: ResizePreset,

    #[serde(
        default = "ResizePreset::background",
        deserialize_with = "background_preset"
    )]
    pub background: ResizePreset,
}

/// A `[previews.*]` table; missing keys fall back to that preset's values.
#[derive(Debug, Deserialize)]
struct PresetOverrides {
    max_width: Option<u32>,
    max_height: Option<u32>,
    filter: Option<ResampleFilter>,
}

impl PresetOverrides {
    fn over(self, base: ResizePreset) -> ResizePreset {
        ResizePreset {
            max_width: self.max_width.unwrap_or(base.max_width),
            max_height: self.max_height.unwrap_or(base.max_height),
            filter: self.filter.unwrap_or(base.filter),
        }
    }
}

fn thumbnail_preset<'de, D: Deserializer<'de>>(d: D) -> Result<ResizePreset, D::Error> {
    PresetOverrides::deserialize(d).map(|o| o.over(ResizePreset::thumbnail()))
}

fn background_preset<'de, D: Deserializer<'de>>(d: D) -> Result<ResizePreset, D::Error> {
    PresetOverrides::deserialize(d).map(|o| o.over(ResizePreset::background()))
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            thumbnail: ResizePreset::thumbnail(),
            background: ResizePreset::background(),
        }
    }
}
