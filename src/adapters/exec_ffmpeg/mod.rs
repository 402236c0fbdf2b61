//! FFmpeg execution adapter
//!
//! Codec runtime backed by the `ffmpeg` binary. Named buffers live as files
//! in a private temporary directory that is removed with the runtime.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::*;
use crate::ports::*;

/// FFmpeg-based codec runtime
pub struct FFmpegRuntime {
    binary: PathBuf,
    workdir: Option<TempDir>,
}

impl FFmpegRuntime {
    /// Create an unloaded runtime
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            workdir: None,
        }
    }

    fn workdir(&self) -> Result<&Path, DomainError> {
        self.workdir
            .as_ref()
            .map(TempDir::path)
            .ok_or_else(|| DomainError::LocalProcessing("codec runtime is not loaded".to_string()))
    }

    /// Resolve a buffer name inside the working directory
    fn buffer_path(&self, name: &str) -> Result<PathBuf, DomainError> {
        let plain = Path::new(name)
            .file_name()
            .map(|n| n == name)
            .unwrap_or(false);
        if !plain {
            return Err(DomainError::LocalProcessing(format!(
                "invalid buffer name '{}'",
                name
            )));
        }
        Ok(self.workdir()?.join(name))
    }
}

#[async_trait]
impl CodecRuntime for FFmpegRuntime {
    async fn load(&mut self) -> Result<(), DomainError> {
        if self.workdir.is_some() {
            return Ok(());
        }

        let output = Command::new(&self.binary)
            .arg("-version")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                DomainError::RuntimeLoad(format!("could not run {}: {}", self.binary.display(), e))
            })?;
        if !output.status.success() {
            return Err(DomainError::RuntimeLoad(format!(
                "{} -version exited with {}",
                self.binary.display(),
                output.status
            )));
        }

        let workdir = tempfile::Builder::new()
            .prefix("splitx-")
            .tempdir()
            .map_err(|e| DomainError::RuntimeLoad(format!("no working directory: {}", e)))?;
        debug!("Codec runtime loaded, working in {}", workdir.path().display());
        self.workdir = Some(workdir);
        Ok(())
    }

    async fn write_file(&mut self, name: &str, data: Bytes) -> Result<(), DomainError> {
        let path = self.buffer_path(name)?;
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| DomainError::LocalProcessing(format!("write {}: {}", name, e)))
    }

    async fn run(&mut self, args: &[String]) -> Result<(), DomainError> {
        let workdir = self.workdir()?.to_path_buf();
        debug!("ffmpeg {}", args.join(" "));

        let output = Command::new(&self.binary)
            .current_dir(&workdir)
            .args(["-hide_banner", "-loglevel", "error", "-nostdin", "-y"])
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| DomainError::LocalProcessing(format!("could not run ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DomainError::LocalProcessing(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }

    async fn read_file(&mut self, name: &str) -> Result<Bytes, DomainError> {
        let path = self.buffer_path(name)?;
        tokio::fs::read(&path)
            .await
            .map(Bytes::from)
            .map_err(|e| DomainError::LocalProcessing(format!("read {}: {}", name, e)))
    }

    async fn delete_file(&mut self, name: &str) -> Result<(), DomainError> {
        let path = self.buffer_path(name)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| DomainError::LocalProcessing(format!("delete {}: {}", name, e)))
    }
}

/// Hands out a fresh `FFmpegRuntime` per run
#[derive(Debug, Clone)]
pub struct FFmpegRuntimeFactory {
    binary: PathBuf,
}

impl FFmpegRuntimeFactory {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl CodecRuntimeFactory for FFmpegRuntimeFactory {
    fn create(&self) -> Box<dyn CodecRuntime> {
        Box::new(FFmpegRuntime::new(self.binary.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_fails_for_missing_binary() {
        let mut runtime = FFmpegRuntime::new("/nonexistent/ffmpeg-binary");
        let err = runtime.load().await.unwrap_err();
        assert!(matches!(err, DomainError::RuntimeLoad(_)));
    }

    #[tokio::test]
    async fn test_buffers_require_loaded_runtime() {
        let mut runtime = FFmpegRuntime::new("ffmpeg");
        let err = runtime
            .write_file("input.mp4", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::LocalProcessing(_)));
    }

    #[test]
    fn test_buffer_names_must_be_plain() {
        let runtime = FFmpegRuntime {
            binary: PathBuf::from("ffmpeg"),
            workdir: Some(tempfile::tempdir().unwrap()),
        };
        assert!(runtime.buffer_path("input.mp4").is_ok());
        assert!(runtime.buffer_path("../escape.mp4").is_err());
        assert!(runtime.buffer_path("nested/out.mp4").is_err());
        assert!(runtime.buffer_path("").is_err());
    }

    #[tokio::test]
    async fn test_buffer_round_trip_in_workdir() {
        let mut runtime = FFmpegRuntime {
            binary: PathBuf::from("ffmpeg"),
            workdir: Some(tempfile::tempdir().unwrap()),
        };
        runtime
            .write_file("input.mp4", Bytes::from_static(b"data"))
            .await
            .unwrap();
        assert_eq!(
            runtime.read_file("input.mp4").await.unwrap(),
            Bytes::from_static(b"data")
        );
        runtime.delete_file("input.mp4").await.unwrap();
        assert!(runtime.read_file("input.mp4").await.is_err());
    }
}
