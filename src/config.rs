//! Configuration management for the normalizer.
//!
//! Handles loading, saving, and validating configuration from
//! platform-specific config directories.

use crate::error::ConfigError;
use crate::text::{ANNOTATION_DELIMITER, FOOTER_MARKER};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application name used for config directory.
const APP_NAME: &str = "AozoraNormalizer";

/// Default config filename.
const CONFIG_FILENAME: &str = "config.toml";

/// Name of the archive directory created inside the input directory.
const DEFAULT_ARCHIVE_SUBDIR: &str = "complete";

/// Accepted values for `logging.level`.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input, output and archive directories.
    pub paths: PathsConfig,

    /// Text normalisation settings.
    pub normalize: NormalizeConfig,

    /// Batch scheduling settings.
    pub batch: BatchConfig,

    /// Logging settings.
    pub logging: LoggingConfig,
}

/// File path configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory scanned for texts to normalise.
    pub input_directory: PathBuf,

    /// Directory receiving normalised texts.
    pub output_directory: PathBuf,

    /// Directory receiving processed originals.
    /// Defaults to `complete` inside the input directory.
    pub archive_directory: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_directory: PathBuf::from("txt"),
            output_directory: PathBuf::from("modify"),
            archive_directory: None,
        }
    }
}

/// Text normalisation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Line that opens and closes the notation legend.
    pub annotation_delimiter: String,

    /// Token that starts the bibliographic footer.
    pub footer_marker: String,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            annotation_delimiter: ANNOTATION_DELIMITER.to_string(),
            footer_marker: FOOTER_MARKER.to_string(),
        }
    }
}

/// Batch behaviour configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of files processed at the same time.
    pub max_concurrent_files: usize,

    /// Name outputs after the title and author found in the header.
    pub name_by_title: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_files: 8,
            name_by_title: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level; `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Returns the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Returns the full path to the config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILENAME))
    }

    /// Loads configuration from the default location.
    ///
    /// If the config file doesn't exist, creates a default one.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.normalize.annotation_delimiter.is_empty() {
            return Err(invalid("normalize.annotation_delimiter", "must not be empty"));
        }

        if self.normalize.footer_marker.is_empty() {
            return Err(invalid("normalize.footer_marker", "must not be empty"));
        }

        if self.batch.max_concurrent_files == 0 {
            return Err(invalid(
                "batch.max_concurrent_files",
                "must be greater than 0",
            ));
        }

        if self.paths.output_directory == self.paths.input_directory {
            return Err(invalid(
                "paths.output_directory",
                "must differ from paths.input_directory",
            ));
        }

        let archive = self.archive_dir();
        if archive == self.paths.input_directory {
            return Err(invalid(
                "paths.archive_directory",
                "must differ from paths.input_directory",
            ));
        }
        if archive == self.paths.output_directory {
            return Err(invalid(
                "paths.archive_directory",
                "must differ from paths.output_directory",
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(invalid(
                "logging.level",
                "must be one of trace, debug, info, warn, error",
            ));
        }

        Ok(())
    }

    /// Returns the effective archive directory, using config or default.
    pub fn archive_dir(&self) -> PathBuf {
        match self.paths.archive_directory {
            Some(ref dir) => dir.clone(),
            None => self.paths.input_directory.join(DEFAULT_ARCHIVE_SUBDIR),
        }
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.normalize.annotation_delimiter.len(), 55);
        assert_eq!(config.normalize.footer_marker, "底本：");
        assert_eq!(config.batch.max_concurrent_files, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.batch.name_by_title = true;
        config.paths.archive_directory = Some(PathBuf::from("done"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.batch.name_by_title);
        assert_eq!(loaded.archive_dir(), PathBuf::from("done"));
        assert_eq!(
            loaded.normalize.annotation_delimiter,
            config.normalize.annotation_delimiter
        );
    }

    #[test]
    fn test_missing_file_creates_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.paths.input_directory, PathBuf::from("txt"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[batch]\nmax_concurrent_files = 2\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.batch.max_concurrent_files, 2);
        assert_eq!(config.normalize.footer_marker, FOOTER_MARKER);
    }

    #[test]
    fn test_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[batch\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_default_archive_dir() {
        let config = Config::default();
        assert_eq!(config.archive_dir(), PathBuf::from("txt").join("complete"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.batch.max_concurrent_files = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.normalize.footer_marker.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.paths.output_directory = config.paths.input_directory.clone();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_archive_must_differ_from_input_and_output() {
        let mut config = Config::default();
        config.paths.archive_directory = Some(config.paths.input_directory.clone());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "paths.archive_directory"
        ));

        let mut config = Config::default();
        config.paths.archive_directory = Some(config.paths.output_directory.clone());
        assert!(config.validate().is_err());
    }
}
