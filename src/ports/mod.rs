// Ports - Interface definitions (contracts)

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for determining the playback duration of a media file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DurationProbePort: Send + Sync {
    /// Duration in seconds.
    ///
    /// Fails with `DomainError::MediaRead` when the file cannot be parsed as
    /// media. Any handle opened on the file is released before returning.
    async fn probe_duration(&self, file: &MediaFile) -> Result<f64, DomainError>;
}

/// Embedded codec runtime with named in-memory working buffers
#[async_trait]
pub trait CodecRuntime: Send {
    /// One-time initialization, must succeed before any other call
    async fn load(&mut self) -> Result<(), DomainError>;

    /// Store a named buffer in the runtime's working area
    async fn write_file(&mut self, name: &str, data: Bytes) -> Result<(), DomainError>;

    /// Run a transcode command against the working area
    async fn run(&mut self, args: &[String]) -> Result<(), DomainError>;

    /// Read back a named buffer
    async fn read_file(&mut self, name: &str) -> Result<Bytes, DomainError>;

    /// Release a named buffer
    async fn delete_file(&mut self, name: &str) -> Result<(), DomainError>;
}

/// Creates a fresh codec runtime for each local segmentation run
pub trait CodecRuntimeFactory: Send + Sync {
    fn create(&self) -> Box<dyn CodecRuntime>;
}

/// Port for the remote split job service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobServicePort: Send + Sync {
    /// Upload the file and start a split job
    async fn submit(&self, file: &MediaFile) -> Result<JobId, DomainError>;

    /// Query job status once
    async fn poll(&self, job_id: &JobId) -> Result<JobStatus, DomainError>;

    /// Fetch the bytes of one finished part
    async fn download(&self, job_id: &JobId, part_number: u32) -> Result<Bytes, DomainError>;

    /// Best-effort job deletion, failures are swallowed
    async fn cancel(&self, job_id: &JobId);
}
