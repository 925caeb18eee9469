//! Configuration settings for listall.
//!
//! Settings are loaded from `config.yaml` in the shared container. Import
//! strategy and export format defaults live in [`crate::model::UserData`]
//! instead, because they travel with the data.

use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::config::Paths;
use crate::error::ListAllError;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Import limits.
    pub import: ImportConfig,
    /// What exported files contain.
    pub export: ExportConfig,
    /// Image compression settings.
    pub images: ImageConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format.
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    /// Color output setting.
    #[serde(default = "default_color")]
    pub color: ColorSetting,
}

/// Color output setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorSetting {
    /// Auto-detect based on terminal.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

/// Import settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImportConfig {
    /// Largest file accepted by `import`, in bytes.
    #[serde(default = "default_max_import_bytes")]
    pub max_file_bytes: u64,
    /// Show a dry-run summary instead of writing unless `--yes` is given.
    #[serde(default)]
    pub preview_by_default: bool,
}

/// Export content settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ExportConfig {
    #[serde(default = "default_true")]
    pub include_crossed_out_items: bool,
    #[serde(default = "default_true")]
    pub include_descriptions: bool,
    #[serde(default = "default_true")]
    pub include_quantities: bool,
    #[serde(default = "default_true")]
    pub include_dates: bool,
    #[serde(default)]
    pub include_archived_lists: bool,
    #[serde(default)]
    pub include_images: bool,
}

/// Image compression settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImageConfig {
    /// Longest side of a stored image, in pixels.
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
    /// JPEG quality (1-100).
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Bounding box of generated thumbnails, in pixels.
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,
    /// Largest payload accepted for attachment, in bytes.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: u64,
}

// Default value functions for serde
const fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

const fn default_color() -> ColorSetting {
    ColorSetting::Auto
}

const fn default_true() -> bool {
    true
}

const fn default_max_import_bytes() -> u64 {
    50 * 1024 * 1024
}

const fn default_max_dimension() -> u32 {
    2048
}

const fn default_jpeg_quality() -> u8 {
    80
}

const fn default_thumbnail_size() -> u32 {
    200
}

const fn default_max_payload_bytes() -> u64 {
    20 * 1024 * 1024
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            color: default_color(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_import_bytes(),
            preview_by_default: false,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            include_crossed_out_items: true,
            include_descriptions: true,
            include_quantities: true,
            include_dates: true,
            include_archived_lists: false,
            include_images: false,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
            jpeg_quality: default_jpeg_quality(),
            thumbnail_size: default_thumbnail_size(),
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

impl Config {
    /// Load configuration from the container's `config.yaml`.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load(paths: &Paths) -> Result<Self, ListAllError> {
        Self::load_from_path(&paths.config_file)
    }

    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, ListAllError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            ListAllError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            ListAllError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), ListAllError> {
        let contents = serde_yaml::to_string(self)
            .map_err(|e| ListAllError::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, contents).map_err(|e| {
            ListAllError::Config(format!(
                "Failed to write config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Reject values the image pipeline cannot work with.
    fn validate(&self) -> Result<(), ListAllError> {
        if !(1..=100).contains(&self.images.jpeg_quality) {
            return Err(ListAllError::Config(format!(
                "images.jpeg_quality must be between 1 and 100, got {}",
                self.images.jpeg_quality
            )));
        }
        if self.import.max_file_bytes == 0 {
            return Err(ListAllError::Config(
                "import.max_file_bytes must be positive".to_string(),
            ));
        }
        if self.images.max_dimension == 0 || self.images.thumbnail_size == 0 {
            return Err(ListAllError::Config(
                "images.max_dimension and images.thumbnail_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.general.default_output, OutputFormat::Pretty);
        assert_eq!(config.general.color, ColorSetting::Auto);
        assert!(config.export.include_crossed_out_items);
        assert!(!config.export.include_images);
        assert_eq!(config.images.max_dimension, 2048);
        assert_eq!(config.images.jpeg_quality, 80);
        assert_eq!(config.import.max_file_bytes, 50 * 1024 * 1024);
        assert!(!config.import.preview_by_default);
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let config = Config::load_from_path(&config_path).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut config = Config::default();
        config.images.thumbnail_size = 128;
        config.export.include_images = true;

        config.save_to_path(&config_path).unwrap();

        let loaded = Config::load_from_path(&config_path).unwrap();

        assert_eq!(loaded.images.thumbnail_size, 128);
        assert!(loaded.export.include_images);
    }

    #[test]
    fn test_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let partial_yaml = r"
images:
  jpeg_quality: 60
";
        std::fs::write(&config_path, partial_yaml).unwrap();

        let config = Config::load_from_path(&config_path).unwrap();

        assert_eq!(config.images.jpeg_quality, 60);
        assert_eq!(config.images.max_dimension, 2048);
        assert_eq!(config.general.default_output, OutputFormat::Pretty);
    }

    #[test]
    fn test_invalid_quality_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "images:\n  jpeg_quality: 0\n").unwrap();

        let err = Config::load_from_path(&config_path).unwrap_err();
        assert!(matches!(err, ListAllError::Config(_)));
    }
}
