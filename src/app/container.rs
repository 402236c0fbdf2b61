use std::sync::Arc;

use tracing::debug;

use crate::adapters::toml_config::SplitterConfig;
use crate::adapters::{FFmpegRuntimeFactory, FFprobeAdapter, HttpJobAdapter};
use crate::app::session::SplitSession;
use crate::domain::model::SplitSettings;
use crate::engine::{LocalSegmentationEngine, RemoteJobClient};
use crate::error::SplitXResult;
use crate::output::SegmentWriter;
use crate::ports::{CodecRuntimeFactory, DurationProbePort, JobServicePort};

pub trait AppContainer: Send + Sync {
    /// A fresh session wired to this container's ports
    fn session(&self) -> SplitSession;
    /// Direct access to the job service for status and cancel
    fn remote_client(&self) -> RemoteJobClient;
    fn settings(&self) -> &SplitSettings;
}

pub struct DefaultAppContainer {
    probe: Arc<dyn DurationProbePort>,
    runtimes: Arc<dyn CodecRuntimeFactory>,
    jobs: Arc<dyn JobServicePort>,
    settings: SplitSettings,
}

impl DefaultAppContainer {
    /// Wire the production adapters from configuration
    pub fn from_config(config: &SplitterConfig) -> SplitXResult<Self> {
        let probe = default_probe(config);
        let runtimes = Arc::new(FFmpegRuntimeFactory::new(&config.ffmpeg_path));
        let jobs = Arc::new(HttpJobAdapter::new(
            &config.service_url,
            config.connect_timeout(),
        )?);

        Ok(Self::with_ports(
            probe,
            runtimes as Arc<dyn CodecRuntimeFactory>,
            jobs as Arc<dyn JobServicePort>,
            config.settings(),
        ))
    }

    pub fn with_ports(
        probe: Arc<dyn DurationProbePort>,
        runtimes: Arc<dyn CodecRuntimeFactory>,
        jobs: Arc<dyn JobServicePort>,
        settings: SplitSettings,
    ) -> Self {
        Self {
            probe,
            runtimes,
            jobs,
            settings,
        }
    }
}

#[cfg(feature = "libav")]
fn default_probe(config: &SplitterConfig) -> Arc<dyn DurationProbePort> {
    use crate::adapters::ProbeLibavAdapter;

    match ProbeLibavAdapter::new() {
        Ok(adapter) => {
            debug!("Using libav duration probe");
            Arc::new(adapter)
        }
        Err(e) => {
            tracing::warn!("libav unavailable ({}), falling back to ffprobe", e);
            Arc::new(FFprobeAdapter::new(&config.ffprobe_path))
        }
    }
}

#[cfg(not(feature = "libav"))]
fn default_probe(config: &SplitterConfig) -> Arc<dyn DurationProbePort> {
    debug!("Using ffprobe at {}", config.ffprobe_path.display());
    Arc::new(FFprobeAdapter::new(&config.ffprobe_path))
}

impl AppContainer for DefaultAppContainer {
    fn session(&self) -> SplitSession {
        SplitSession::new(
            Arc::clone(&self.probe),
            LocalSegmentationEngine::new(Arc::clone(&self.runtimes), &self.settings),
            self.remote_client(),
            SegmentWriter::new(Arc::clone(&self.jobs), self.settings.download_stagger),
            self.settings.clone(),
        )
    }

    fn remote_client(&self) -> RemoteJobClient {
        RemoteJobClient::new(Arc::clone(&self.jobs), self.settings.poll_interval)
    }

    fn settings(&self) -> &SplitSettings {
        &self.settings
    }
}
