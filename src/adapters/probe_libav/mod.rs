//! In-process duration probe using libav bindings (feature `libav`)

use async_trait::async_trait;
use ffmpeg_next as ffmpeg;
use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::MediaFile;
use crate::ports::DurationProbePort;

/// Duration probe reading the container header through libavformat
pub struct ProbeLibavAdapter;

impl ProbeLibavAdapter {
    pub fn new() -> Result<Self, DomainError> {
        ffmpeg::init()
            .map_err(|e| DomainError::MediaRead(format!("FFmpeg initialization failed: {}", e)))?;
        Ok(Self)
    }
}

#[async_trait]
impl DurationProbePort for ProbeLibavAdapter {
    async fn probe_duration(&self, file: &MediaFile) -> Result<f64, DomainError> {
        let path = file.path.clone();
        let name = file.name.clone();

        tokio::task::spawn_blocking(move || {
            // Input context is closed when it goes out of scope on every path
            let context = ffmpeg::format::input(&path)
                .map_err(|e| DomainError::MediaRead(format!("cannot open {}: {}", name, e)))?;

            let raw = context.duration();
            if raw <= 0 {
                return Err(DomainError::MediaRead(format!(
                    "{} does not report a duration",
                    name
                )));
            }
            let duration = raw as f64 / ffmpeg::ffi::AV_TIME_BASE as f64;
            debug!("Duration of {}: {:.3}s", name, duration);
            Ok(duration)
        })
        .await
        .map_err(|e| DomainError::MediaRead(format!("probe task failed: {}", e)))?
    }
}
