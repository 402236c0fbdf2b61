//! Configuration initialization and hierarchy management

use std::path::PathBuf;

use tracing::{debug, info};

use crate::adapters::toml_config::{SplitterConfig, TomlConfigAdapter};
use crate::error::{SplitXError, SplitXResult};

/// Values given on the command line, highest precedence
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub service_url: Option<String>,
    pub segment_duration_secs: Option<f64>,
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Build the configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(overrides: &ConfigOverrides) -> SplitXResult<SplitterConfig> {
    let mut config = load_config_file(overrides.config_path.as_ref())?;

    let applied = apply_environment_overrides(&mut config, |key| std::env::var(key).ok())?;
    if applied > 0 {
        info!("Applied {} environment variable overrides", applied);
    }

    let applied = apply_cli_overrides(&mut config, overrides);
    if applied > 0 {
        info!("Applied {} CLI configuration overrides", applied);
    }

    config.validate()?;
    Ok(config)
}

/// Load the explicit file, or the first default file found, or defaults
fn load_config_file(explicit: Option<&PathBuf>) -> SplitXResult<SplitterConfig> {
    if let Some(path) = explicit {
        return TomlConfigAdapter::load(path);
    }

    for path in TomlConfigAdapter::default_paths() {
        if path.exists() {
            return TomlConfigAdapter::load(&path);
        }
    }

    debug!("No configuration file found, using defaults");
    Ok(SplitterConfig::default())
}

/// Apply `SPLITTER_*` variables through `lookup`, returning how many were set
pub fn apply_environment_overrides<F>(config: &mut SplitterConfig, lookup: F) -> SplitXResult<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = 0;

    if let Some(value) = lookup("SPLITTER_SERVICE_URL") {
        config.service_url = value;
        applied += 1;
    }
    if let Some(value) = lookup("SPLITTER_SEGMENT_DURATION") {
        config.segment_duration_secs = parse_env("SPLITTER_SEGMENT_DURATION", &value)?;
        applied += 1;
    }
    if let Some(value) = lookup("SPLITTER_LOCAL_MAX_SIZE") {
        config.local_max_size = parse_env("SPLITTER_LOCAL_MAX_SIZE", &value)?;
        applied += 1;
    }
    if let Some(value) = lookup("SPLITTER_REMOTE_MAX_SIZE") {
        config.remote_max_size = parse_env("SPLITTER_REMOTE_MAX_SIZE", &value)?;
        applied += 1;
    }
    if let Some(value) = lookup("SPLITTER_POLL_INTERVAL_MS") {
        config.poll_interval_ms = parse_env("SPLITTER_POLL_INTERVAL_MS", &value)?;
        applied += 1;
    }
    if let Some(value) = lookup("SPLITTER_DOWNLOAD_STAGGER_MS") {
        config.download_stagger_ms = parse_env("SPLITTER_DOWNLOAD_STAGGER_MS", &value)?;
        applied += 1;
    }
    if let Some(value) = lookup("SPLITTER_FFMPEG_PATH") {
        config.ffmpeg_path = PathBuf::from(value);
        applied += 1;
    }
    if let Some(value) = lookup("SPLITTER_FFPROBE_PATH") {
        config.ffprobe_path = PathBuf::from(value);
        applied += 1;
    }
    if let Some(value) = lookup("SPLITTER_LOG_LEVEL") {
        config.log_level = value;
        applied += 1;
    }

    Ok(applied)
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> SplitXResult<T> {
    value.trim().parse().map_err(|_| SplitXError::Config {
        message: format!("invalid value '{}' for {}", value, key),
    })
}

/// Apply command-line overrides, returning how many were set
pub fn apply_cli_overrides(config: &mut SplitterConfig, overrides: &ConfigOverrides) -> usize {
    let mut applied = 0;

    if let Some(url) = &overrides.service_url {
        config.service_url = url.clone();
        applied += 1;
    }
    if let Some(secs) = overrides.segment_duration_secs {
        config.segment_duration_secs = secs;
        applied += 1;
    }
    if let Some(path) = &overrides.ffmpeg_path {
        config.ffmpeg_path = path.clone();
        applied += 1;
    }
    if let Some(path) = &overrides.ffprobe_path {
        config.ffprobe_path = path.clone();
        applied += 1;
    }
    if let Some(level) = &overrides.log_level {
        config.log_level = level.clone();
        applied += 1;
    }

    applied
}
