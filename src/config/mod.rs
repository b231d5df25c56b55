//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files
//! - CLI arguments

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::clipboard::SharingMode;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Clipboard service configuration
    #[serde(default)]
    pub clipboard: ClipboardConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Clipboard service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardConfig {
    /// Directional sharing mode at startup
    pub mode: SharingMode,

    /// Keep the host's real clipboard untouched
    pub headless: bool,

    /// Maximum guest payload size in bytes
    pub max_data_size: usize,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            mode: SharingMode::Off,
            headless: false,
            max_data_size: 16 * 1024 * 1024, // 16MB
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace|debug|info|warn|error)
    pub level: String,

    /// Log format (pretty|compact|json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.clipboard.max_data_size == 0 {
            anyhow::bail!("clipboard.max_data_size must be greater than zero");
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Invalid log level: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" | "json" => {}
            _ => anyhow::bail!("Invalid log format: {}", self.logging.format),
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(mut self, mode: Option<SharingMode>, headless: bool) -> Self {
        if let Some(mode) = mode {
            self.clipboard.mode = mode;
        }
        if headless {
            self.clipboard.headless = true;
        }
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clipboard: ClipboardConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.clipboard.mode, SharingMode::Off);
        assert!(!config.clipboard.headless);
        assert_eq!(config.clipboard.max_data_size, 16 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[clipboard]
mode = "bidirectional"
headless = true
max_data_size = 1048576

[logging]
level = "debug"
format = "compact"
"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.clipboard.mode, SharingMode::Bidirectional);
        assert!(config.clipboard.headless);
        assert_eq!(config.clipboard.max_data_size, 1048576);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validation_rejects_bad_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_max_size() {
        let mut config = Config::default();
        config.clipboard.max_data_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::default().with_overrides(Some(SharingMode::HostToGuest), true);
        assert_eq!(config.clipboard.mode, SharingMode::HostToGuest);
        assert!(config.clipboard.headless);
    }
}
