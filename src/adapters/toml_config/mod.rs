// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::domain::model::*;
use crate::error::{SplitXError, SplitXResult};
use crate::utils::logging::LogLevel;

/// Default remote job service location
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:3001";

/// Application configuration, every field has a default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    pub segment_duration_secs: f64,
    pub local_max_size: u64,
    pub remote_max_size: u64,
    pub poll_interval_ms: u64,
    pub download_stagger_ms: u64,
    pub service_url: String,
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub connect_timeout_secs: u64,
    pub log_level: String,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            segment_duration_secs: SEGMENT_DURATION_SECS,
            local_max_size: LOCAL_MAX_SIZE,
            remote_max_size: REMOTE_MAX_SIZE,
            poll_interval_ms: POLL_INTERVAL.as_millis() as u64,
            download_stagger_ms: DOWNLOAD_STAGGER.as_millis() as u64,
            service_url: DEFAULT_SERVICE_URL.to_string(),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            connect_timeout_secs: 10,
            log_level: "info".to_string(),
        }
    }
}

impl SplitterConfig {
    /// Check value ranges and cross-field consistency
    pub fn validate(&self) -> SplitXResult<()> {
        if !self.segment_duration_secs.is_finite() || self.segment_duration_secs <= 0.0 {
            return Err(config_error(format!(
                "segment_duration_secs must be positive, got {}",
                self.segment_duration_secs
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(config_error("poll_interval_ms must be positive"));
        }
        if self.local_max_size > self.remote_max_size {
            return Err(config_error(format!(
                "local_max_size ({}) cannot exceed remote_max_size ({})",
                self.local_max_size, self.remote_max_size
            )));
        }
        Url::parse(&self.service_url).map_err(|e| {
            config_error(format!("invalid service_url '{}': {}", self.service_url, e))
        })?;
        self.log_level.parse::<LogLevel>()?;
        Ok(())
    }

    /// Domain settings derived from this configuration
    pub fn settings(&self) -> SplitSettings {
        SplitSettings {
            segment_duration: self.segment_duration_secs,
            local_max_size: self.local_max_size,
            remote_max_size: self.remote_max_size,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            download_stagger: Duration::from_millis(self.download_stagger_ms),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn config_error(message: impl Into<String>) -> SplitXError {
    SplitXError::Config {
        message: message.into(),
    }
}

/// File layout: all keys live under a `[splitter]` table
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    splitter: SplitterConfig,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> SplitXResult<SplitterConfig> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.splitter)
    }

    /// Serialize configuration to TOML text
    pub fn serialize(config: &SplitterConfig) -> SplitXResult<String> {
        let file = ConfigFile {
            splitter: config.clone(),
        };
        Ok(toml::to_string_pretty(&file)?)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> SplitXResult<SplitterConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            config_error(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::parse(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories
    pub fn save(config: &SplitterConfig, path: &Path) -> SplitXResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::serialize(config)?)?;
        Ok(())
    }

    /// Files searched when no explicit path is given, in order
    pub fn default_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from("splitter.toml"),
            PathBuf::from("config").join("splitter.toml"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_domain_constants() {
        let config = SplitterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.settings(), SplitSettings::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = TomlConfigAdapter::parse(
            r#"
            [splitter]
            segment_duration_secs = 60
            service_url = "https://split.example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.segment_duration_secs, 60.0);
        assert_eq!(config.service_url, "https://split.example.com");
        assert_eq!(config.local_max_size, LOCAL_MAX_SIZE);
        assert_eq!(config.poll_interval_ms, 2000);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(TomlConfigAdapter::parse("").unwrap(), SplitterConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(matches!(
            TomlConfigAdapter::parse("[splitter\nfoo = "),
            Err(SplitXError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_validation_rejects_inconsistent_values() {
        let mut config = SplitterConfig::default();
        config.local_max_size = config.remote_max_size + 1;
        assert!(config.validate().is_err());

        let mut config = SplitterConfig::default();
        config.segment_duration_secs = 0.0;
        assert!(config.validate().is_err());

        let mut config = SplitterConfig::default();
        config.poll_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = SplitterConfig::default();
        config.service_url = "::nope".to_string();
        assert!(config.validate().is_err());

        let mut config = SplitterConfig::default();
        config.log_level = "chatty".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("splitter.toml");
        let mut config = SplitterConfig::default();
        config.poll_interval_ms = 500;

        TomlConfigAdapter::save(&config, &path).unwrap();
        assert_eq!(TomlConfigAdapter::load(&path).unwrap(), config);
    }
}
