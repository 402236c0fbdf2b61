//! Segment writer: per-segment and staggered bulk downloads

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::domain::errors::DomainError;
use crate::domain::model::{Segment, SegmentSource};
use crate::ports::JobServicePort;
use crate::utils::path::PathUtils;

/// Writes segments into a destination directory
#[derive(Clone)]
pub struct SegmentWriter {
    jobs: Arc<dyn JobServicePort>,
    stagger: Duration,
}

impl SegmentWriter {
    pub fn new(jobs: Arc<dyn JobServicePort>, stagger: Duration) -> Self {
        Self { jobs, stagger }
    }

    /// Fetch the segment's content, contacting the service for remote parts only
    pub async fn fetch(&self, segment: &Segment) -> Result<Bytes, DomainError> {
        match &segment.source {
            SegmentSource::Memory(data) => Ok(data.clone()),
            SegmentSource::Remote {
                job_id,
                part_number,
            } => {
                debug!("Downloading part {} of job {}", part_number, job_id);
                self.jobs.download(job_id, *part_number).await
            }
        }
    }

    /// Write one segment into `dir`, returning the file path
    pub async fn write(&self, segment: &Segment, dir: &Path) -> Result<PathBuf, DomainError> {
        let data = self.fetch(segment).await?;

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| DomainError::Output(format!("{}: {}", dir.display(), e)))?;
        let path = PathUtils::output_path(dir, &segment.name, segment.index);
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| DomainError::Output(format!("{}: {}", path.display(), e)))?;

        info!("Wrote {} ({} bytes)", path.display(), data.len());
        Ok(path)
    }

    /// Start one write per segment, the i-th delayed by `i * stagger`.
    ///
    /// Completion order is unspecified; the tasks share no state.
    pub fn write_all(
        &self,
        segments: Vec<Segment>,
        dir: PathBuf,
    ) -> JoinSet<Result<PathBuf, DomainError>> {
        let mut tasks = JoinSet::new();
        for (position, segment) in segments.into_iter().enumerate() {
            let writer = self.clone();
            let dir = dir.clone();
            let delay = self.stagger * position as u32;
            tasks.spawn(async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                writer.write(&segment, &dir).await
            });
        }
        tasks
    }
}
