//! Remote job lifecycle: submit, poll, watch, cancel

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::errors::DomainError;
use crate::domain::model::{JobId, JobStatus, MediaFile};
use crate::ports::JobServicePort;

/// Client side of the remote job service
#[derive(Clone)]
pub struct RemoteJobClient {
    service: Arc<dyn JobServicePort>,
    poll_interval: Duration,
}

struct WatchState {
    job_id: JobId,
    stop: CancellationToken,
    polls: u64,
    finished: bool,
}

impl RemoteJobClient {
    pub fn new(service: Arc<dyn JobServicePort>, poll_interval: Duration) -> Self {
        Self {
            service,
            poll_interval,
        }
    }

    pub fn service(&self) -> &Arc<dyn JobServicePort> {
        &self.service
    }

    pub async fn submit(&self, file: &MediaFile) -> Result<JobId, DomainError> {
        info!("Submitting {} ({} bytes) to the remote service", file.name, file.size);
        let job_id = self.service.submit(file).await?;
        info!("Remote job {} created", job_id);
        Ok(job_id)
    }

    pub async fn poll(&self, job_id: &JobId) -> Result<JobStatus, DomainError> {
        self.service.poll(job_id).await
    }

    /// Poll repeatedly until a terminal status or an error.
    ///
    /// The first query is issued immediately, later ones after the poll
    /// interval. The stream ends right after yielding `Completed` or an
    /// error, and ends silently once `stop` is cancelled; a response that
    /// arrives after cancellation is discarded.
    pub fn watch(
        &self,
        job_id: JobId,
        stop: CancellationToken,
    ) -> BoxStream<'static, Result<JobStatus, DomainError>> {
        let service = Arc::clone(&self.service);
        let interval = self.poll_interval;
        let state = WatchState {
            job_id,
            stop,
            polls: 0,
            finished: false,
        };

        stream::unfold(state, move |mut state| {
            let service = Arc::clone(&service);
            async move {
                if state.finished || state.stop.is_cancelled() {
                    return None;
                }
                if state.polls > 0 {
                    tokio::select! {
                        biased;
                        _ = state.stop.cancelled() => return None,
                        _ = tokio::time::sleep(interval) => {}
                    }
                }

                state.polls += 1;
                let result = service.poll(&state.job_id).await;
                if state.stop.is_cancelled() {
                    debug!("Discarding status of job {} after stop", state.job_id);
                    return None;
                }

                match &result {
                    Ok(JobStatus::Processing { progress }) => {
                        debug!("Job {} at {}% (poll #{})", state.job_id, progress, state.polls);
                    }
                    Ok(JobStatus::Completed { segments }) => {
                        info!("Job {} completed with {} parts", state.job_id, segments.len());
                        state.finished = true;
                    }
                    Err(e) => {
                        debug!("Job {} watch ended: {}", state.job_id, e);
                        state.finished = true;
                    }
                }
                Some((result, state))
            }
        })
        .boxed()
    }

    /// Best-effort cancellation, never fails
    pub async fn cancel(&self, job_id: &JobId) {
        info!("Cancelling remote job {}", job_id);
        self.service.cancel(job_id).await;
    }
}
