//! FFprobe adapter for media duration probing
//!
//! Runs the `ffprobe` binary against the file and reads the container duration.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// FFprobe-based duration probe
pub struct FFprobeAdapter {
    binary: PathBuf,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Parse the single-value output of `-show_entries format=duration`
    pub fn parse_duration_output(output: &str) -> Result<f64, DomainError> {
        let value = output.lines().map(str::trim).find(|l| !l.is_empty());
        let Some(value) = value else {
            return Err(DomainError::MediaRead("no duration reported".to_string()));
        };
        let duration: f64 = value
            .parse()
            .map_err(|_| DomainError::MediaRead(format!("unreadable duration '{}'", value)))?;
        if !duration.is_finite() || duration < 0.0 {
            return Err(DomainError::MediaRead(format!("invalid duration {}", duration)));
        }
        Ok(duration)
    }
}

#[async_trait]
impl DurationProbePort for FFprobeAdapter {
    async fn probe_duration(&self, file: &MediaFile) -> Result<f64, DomainError> {
        debug!("Probing duration of {}", file.path.display());

        // The child is killed if this future is dropped mid-probe
        let output = Command::new(&self.binary)
            .args(["-v", "error"])
            .args(["-show_entries", "format=duration"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(&file.path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                DomainError::MediaRead(format!(
                    "could not run {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr.trim();
            return Err(DomainError::MediaRead(if reason.is_empty() {
                format!("{} is not a readable media file", file.name)
            } else {
                reason.to_string()
            }));
        }

        let duration = Self::parse_duration_output(&String::from_utf8_lossy(&output.stdout))?;
        debug!("Duration of {}: {:.3}s", file.name, duration);
        Ok(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_output() {
        assert_eq!(FFprobeAdapter::parse_duration_output("300.040000\n"), Ok(300.04));
        assert_eq!(FFprobeAdapter::parse_duration_output("\n  12\n"), Ok(12.0));
    }

    #[test]
    fn test_parse_duration_output_rejects_garbage() {
        for output in ["", "N/A", "-3", "inf"] {
            let err = FFprobeAdapter::parse_duration_output(output).unwrap_err();
            assert_eq!(err.code(), "media_read", "output {:?}", output);
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_media_read_error() {
        let adapter = FFprobeAdapter::new("/nonexistent/ffprobe-binary");
        let file = MediaFile::new("clip.mp4", 1, MediaKind::new("video/mp4")).unwrap();
        let err = adapter.probe_duration(&file).await.unwrap_err();
        assert!(matches!(err, DomainError::MediaRead(_)));
    }
}
