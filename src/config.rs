use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub album: AlbumConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub preview: PreviewConfig,
}

/// Where photos and the serialized catalog live, and how photos are
/// presented to the renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumConfig {
    /// Directory holding the photo files themselves.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory holding the key-value store (one file per key).
    #[serde(default = "default_prefs_dir")]
    pub prefs_dir: PathBuf,

    /// Key the serialized catalog is stored under.
    #[serde(default = "default_catalog_key")]
    pub catalog_key: String,

    #[serde(default)]
    pub display: DisplayMode,
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("snapshelf")
        .join("photos")
}

fn default_prefs_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("snapshelf")
        .join("prefs")
}

fn default_catalog_key() -> String {
    "photos".to_string()
}

impl Default for AlbumConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            prefs_dir: default_prefs_dir(),
            catalog_key: default_catalog_key(),
            display: DisplayMode::default(),
        }
    }
}

/// How a record's display path is derived.
///
/// `Direct` hands the renderer the stored file's own path. `Inline` embeds
/// the bytes as a `data:` URI, which keeps records renderable even if the
/// data directory moves out from under a stale catalog blob.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Direct,
    Inline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Camera command template. `{output}` is replaced with the path the
    /// command must write a JPEG to.
    #[serde(default = "default_capture_command")]
    pub command: String,

    /// Directory captured frames are spooled to before import.
    #[serde(default = "default_spool_dir")]
    pub spool_dir: PathBuf,
}

fn default_capture_command() -> String {
    "fswebcam --no-banner --jpeg 100 -r 1280x720 {output}".to_string()
}

fn default_spool_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("snapshelf")
        .join("capture")
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            command: default_capture_command(),
            spool_dir: default_spool_dir(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageProtocol {
    #[default]
    Auto,
    Sixel,
    Kitty,
    ITerm2,
    Halfblocks,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    #[serde(default = "default_preview_enabled")]
    pub image_preview: bool,

    #[serde(default)]
    pub protocol: ImageProtocol,

    /// Pixel size thumbnails are decoded at before handing to the terminal.
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,
}

fn default_preview_enabled() -> bool {
    true
}

fn default_thumbnail_size() -> u32 {
    512
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            image_preview: default_preview_enabled(),
            protocol: ImageProtocol::default(),
            thumbnail_size: default_thumbnail_size(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            album: AlbumConfig::default(),
            capture: CaptureConfig::default(),
            preview: PreviewConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            // Create default config
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("snapshelf")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(parsed.album.catalog_key, "photos");
        assert_eq!(parsed.album.display, DisplayMode::Direct);
        assert_eq!(parsed.preview.thumbnail_size, 512);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [album]
            catalog_key = "camera-roll"
            display = "inline"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.album.catalog_key, "camera-roll");
        assert_eq!(parsed.album.display, DisplayMode::Inline);
        assert!(parsed.capture.command.contains("{output}"));
    }
}
