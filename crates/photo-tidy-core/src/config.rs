use crate::error::{Error, Result};
use crate::types::ImageFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration shared by every photo-tidy operation.
///
/// No scan locations live here; directories are always supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Formats the classifier accepts as images (detected from content)
    pub recognised_formats: Vec<ImageFormat>,

    /// Number of threads to use for decoding (0 = auto)
    pub threads: usize,

    /// Highest `(n)` suffix tried before giving up on a colliding name
    pub max_rename_suffix: u32,

    /// JPEG quality used when converting HEIC files (1-100)
    pub jpeg_quality: u8,

    /// Appended to the source directory name to form the conversion output
    pub converted_dir_suffix: String,

    /// Log level
    pub log_level: LogLevel,
}

/// Log level for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recognised_formats: vec![ImageFormat::Jpeg],
            threads: 0, // Auto
            max_rename_suffix: 10_000,
            jpeg_quality: 90,
            converted_dir_suffix: "_all_jpgs".to_string(),
            log_level: LogLevel::Info,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Configuration(format!("Failed to open config file: {}", e)))?;

        let config: Config = serde_json::from_reader(file)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .map_err(|e| Error::Configuration(format!("Failed to create config file: {}", e)))?;

        serde_json::to_writer_pretty(file, self)
            .map_err(|e| Error::Configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.recognised_formats.is_empty() {
            return Err(Error::Configuration(
                "At least one image format must be recognised".to_string(),
            ));
        }

        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(Error::Configuration(
                "JPEG quality must be between 1 and 100".to_string(),
            ));
        }

        if self.max_rename_suffix == 0 {
            return Err(Error::Configuration(
                "Maximum rename suffix must be at least 1".to_string(),
            ));
        }

        // The suffix must not be able to produce the source directory itself
        if self.converted_dir_suffix.is_empty()
            || self.converted_dir_suffix.contains(std::path::MAIN_SEPARATOR)
        {
            return Err(Error::Configuration(
                "Converted directory suffix must be a non-empty name fragment".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.recognised_formats, vec![ImageFormat::Jpeg]);
    }

    #[test]
    fn test_invalid_quality_rejected() {
        let config = Config {
            jpeg_quality: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_empty_formats_rejected() {
        let config = Config {
            recognised_formats: Vec::new(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo-tidy.json");

        let config = Config {
            recognised_formats: vec![ImageFormat::Jpeg, ImageFormat::Png],
            jpeg_quality: 75,
            ..Config::default()
        };
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.recognised_formats, config.recognised_formats);
        assert_eq!(loaded.jpeg_quality, 75);
        assert_eq!(loaded.converted_dir_suffix, "_all_jpgs");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "threads": 2 }"#).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.threads, 2);
        assert_eq!(loaded.max_rename_suffix, 10_000);
    }
}
