mod types;

pub use types::*;

use anyhow::{Context, Result};
use imgcache_store::{ImageStore, ResizePreset};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    expand_paths(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./imgcache.toml",
        "./config.toml",
        "~/.config/imgcache/config.toml",
        "/etc/imgcache/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Build the image store described by `config`
pub fn build_store(config: &Config) -> ImageStore {
    ImageStore::new(config.store.root.clone())
        .with_checksum(config.store.checksum)
        .with_ignored_files(config.store.ignored_files.clone())
}

fn expand_paths(config: &mut Config) {
    let root = config.store.root.to_string_lossy().into_owned();
    config.store.root = PathBuf::from(shellexpand::tilde(&root).as_ref());
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.server.max_body_bytes == 0 {
        anyhow::bail!("server.max_body_bytes cannot be 0");
    }

    if config.store.root.as_os_str().is_empty() {
        anyhow::bail!("store.root cannot be empty");
    }

    if config.store.root.exists() && !config.store.root.is_dir() {
        anyhow::bail!("store.root is not a directory: {:?}", config.store.root);
    }

    validate_preset("thumbnail", &config.previews.thumbnail)?;
    validate_preset("background", &config.previews.background)?;

    Ok(())
}

fn validate_preset(name: &str, preset: &ResizePreset) -> Result<()> {
    if preset.max_width == 0 || preset.max_height == 0 {
        anyhow::bail!(
            "Preview '{}' must have non-zero bounds (got {}x{})",
            name,
            preset.max_width,
            preset.max_height
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgcache_store::{Checksum, ResampleFilter};

    #[test]
    fn empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.store.checksum, Checksum::Adler32);
        assert_eq!(config.store.ignored_files, vec![".DS_Store".to_string()]);
        assert_eq!(config.previews.thumbnail, ResizePreset::thumbnail());
        assert_eq!(config.previews.background, ResizePreset::background());
    }

    #[test]
    fn partial_preview_section_keeps_filter_default() {
        let config: Config = toml::from_str(
            r#"
            [previews.thumbnail]
            max_width = 120
            max_height = 80
            "#,
        )
        .unwrap();
        assert_eq!(config.previews.thumbnail.max_width, 120);
        assert_eq!(config.previews.thumbnail.filter, ResampleFilter::CatmullRom);
        assert_eq!(config.previews.background, ResizePreset::background());
    }

    #[test]
    fn partial_background_section_keeps_lanczos() {
        let config: Config = toml::from_str(
            r#"
            [previews.background]
            max_width = 32
            max_height = 32
            "#,
        )
        .unwrap();
        assert_eq!(config.previews.background.max_width, 32);
        assert_eq!(config.previews.background.max_height, 32);
        assert_eq!(config.previews.background.filter, ResampleFilter::Lanczos3);
        assert_eq!(config.previews.thumbnail, ResizePreset::thumbnail());
    }

    #[test]
    fn preview_filter_only_keeps_preset_bounds() {
        let config: Config = toml::from_str(
            r#"
            [previews.thumbnail]
            filter = "nearest"
            "#,
        )
        .unwrap();
        assert_eq!(config.previews.thumbnail.max_width, 90);
        assert_eq!(config.previews.thumbnail.max_height, 90);
        assert_eq!(config.previews.thumbnail.filter, ResampleFilter::Nearest);
    }

    #[test]
    fn load_config_reads_store_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imgcache.toml");
        std::fs::write(
            &path,
            format!(
                "[store]\nroot = {:?}\nchecksum = \"sha256\"\n",
                dir.path().join("images")
            ),
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.store.root, dir.path().join("images"));
        assert_eq!(config.store.checksum, Checksum::Sha256);
    }

    #[test]
    fn tilde_in_root_is_expanded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imgcache.toml");
        std::fs::write(&path, "[store]\nroot = \"~/imgcache-test-root\"\n").unwrap();

        let config = load_config(&path).unwrap();
        if std::env::var_os("HOME").is_some() {
            assert!(!config.store.root.to_string_lossy().starts_with('~'));
        }
    }

    #[test]
    fn rejects_port_zero() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_zero_preview_bounds() {
        let mut config = Config::default();
        config.previews.background.max_height = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("background"));
    }

    #[test]
    fn rejects_file_as_root() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.store.root = file.path().to_path_buf();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn missing_explicit_config_is_error() {
        assert!(load_config_or_default(Some(Path::new("/nonexistent/imgcache.toml"))).is_err());
    }
}
