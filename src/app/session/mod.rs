// Split session - Orchestrates the select / split / download / reset flow

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::{LocalSegmentationEngine, ProgressTracker, RemoteJobClient};
use crate::output::SegmentWriter;
use crate::ports::*;

/// Visible phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Loading,
    Ready,
    Processing,
    Completed,
    Error,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Loading => "loading",
            SessionPhase::Ready => "ready",
            SessionPhase::Processing => "processing",
            SessionPhase::Completed => "completed",
            SessionPhase::Error => "error",
        };
        f.write_str(name)
    }
}

/// Everything a renderer needs to draw the session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub file: Option<MediaFile>,
    pub duration_secs: Option<f64>,
    pub plan: Option<ProcessingPlan>,
    /// 0.0 - 100.0 for the current split attempt
    pub progress: f64,
    pub job: Option<Job>,
    /// Non-empty only in `Completed`
    pub segments: Vec<Segment>,
    pub error: Option<String>,
    pub error_code: Option<&'static str>,
    pub updated_at: DateTime<Utc>,
}

impl SessionSnapshot {
    fn idle() -> Self {
        Self {
            phase: SessionPhase::Idle,
            file: None,
            duration_secs: None,
            plan: None,
            progress: 0.0,
            job: None,
            segments: Vec::new(),
            error: None,
            error_code: None,
            updated_at: Utc::now(),
        }
    }
}

/// The single source of truth for one user session.
///
/// Transitions happen only through the methods below; observers subscribe to
/// snapshots and never mutate state.
pub struct SplitSession {
    probe: Arc<dyn DurationProbePort>,
    engine: LocalSegmentationEngine,
    remote: RemoteJobClient,
    writer: SegmentWriter,
    settings: SplitSettings,
    state: Arc<watch::Sender<SessionSnapshot>>,
    /// Last job submitted in this session, cancelled on reset or reselect
    active_job: Option<JobId>,
    /// Session-wide interrupt, parent of every per-operation token
    interrupt: CancellationToken,
    stop: CancellationToken,
}

impl SplitSession {
    pub fn new(
        probe: Arc<dyn DurationProbePort>,
        engine: LocalSegmentationEngine,
        remote: RemoteJobClient,
        writer: SegmentWriter,
        settings: SplitSettings,
    ) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::idle());
        let interrupt = CancellationToken::new();
        let stop = interrupt.child_token();
        Self {
            probe,
            engine,
            remote,
            writer,
            settings,
            state: Arc::new(state),
            active_job: None,
            interrupt,
            stop,
        }
    }

    /// Receive every future snapshot
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase
    }

    pub fn settings(&self) -> &SplitSettings {
        &self.settings
    }

    /// Job that a reset would cancel
    pub fn active_job(&self) -> Option<&JobId> {
        self.active_job.as_ref()
    }

    /// Token that interrupts whatever the session is doing.
    ///
    /// Once triggered it stays triggered: the session is considered to be
    /// shutting down and later split attempts end as cancelled.
    pub fn interrupt_handle(&self) -> CancellationToken {
        self.interrupt.clone()
    }

    /// Select a file from disk, abandoning any previous work
    pub async fn select_file(&mut self, path: impl AsRef<Path>) -> Result<ProcessingPlan, DomainError> {
        self.abandon().await;
        self.state.send_replace(SessionSnapshot::idle());

        match MediaFile::open(path.as_ref()).await {
            Ok(file) => self.load(file).await,
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Select an already-described file, abandoning any previous work
    pub async fn select_media(&mut self, file: MediaFile) -> Result<ProcessingPlan, DomainError> {
        self.abandon().await;
        self.state.send_replace(SessionSnapshot::idle());
        self.load(file).await
    }

    async fn load(&mut self, file: MediaFile) -> Result<ProcessingPlan, DomainError> {
        info!("Selected {} ({} bytes, {})", file.name, file.size, file.kind);
        self.transition(SessionPhase::Loading, |s| s.file = Some(file.clone()));

        // The absolute ceiling is enforced before any probing
        if let Err(e) = StrategySelector::check_size(file.size, &self.settings) {
            return Err(self.fail(e));
        }

        let duration = match self.probe.probe_duration(&file).await {
            Ok(duration) => duration,
            Err(DomainError::MediaRead(msg)) => return Err(self.fail(DomainError::MediaRead(msg))),
            Err(other) => return Err(self.fail(DomainError::MediaRead(other.to_string()))),
        };

        let plan = match StrategySelector::select(file.size, duration, &self.settings) {
            Ok(plan) => plan,
            Err(e) => return Err(self.fail(e)),
        };

        match (plan.path, plan.warning) {
            (_, Some(warning)) => info!("Plan for {}: {} ({})", file.name, warning, warning.message()),
            (Some(path), None) => info!(
                "Plan for {}: {} split into {} segments",
                file.name, path, plan.segment_count
            ),
            (None, None) => {}
        }

        let ready_plan = plan.clone();
        self.transition(SessionPhase::Ready, move |s| {
            s.duration_secs = Some(duration);
            s.plan = Some(ready_plan);
        });
        Ok(plan)
    }

    /// Run the split chosen by the plan, returning the number of segments
    pub async fn start_split(&mut self) -> Result<usize, DomainError> {
        let snapshot = self.snapshot();
        if snapshot.phase != SessionPhase::Ready {
            return Err(DomainError::InvalidTransition(format!(
                "cannot start a split while {}",
                snapshot.phase
            )));
        }
        let (Some(file), Some(plan)) = (snapshot.file, snapshot.plan) else {
            return Err(DomainError::InvalidTransition(
                "no file has been prepared".to_string(),
            ));
        };
        let path = match plan.path {
            Some(path) if plan.needs_split() => path,
            _ => {
                return Err(DomainError::NoOp(
                    "the video is not longer than one segment".to_string(),
                ))
            }
        };

        info!("Starting {} split of {}", path, file.name);
        self.transition(SessionPhase::Processing, |s| {
            s.progress = 0.0;
            s.segments.clear();
        });

        let result = match path {
            ProcessingPath::Local => self.split_locally(&file, plan.duration_secs).await,
            ProcessingPath::Remote => self.split_remotely(&file).await,
        };

        match result {
            Ok(segments) => {
                let count = segments.len();
                info!("Split of {} completed with {} segments", file.name, count);
                self.transition(SessionPhase::Completed, move |s| {
                    s.progress = 100.0;
                    s.segments = segments;
                });
                Ok(count)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    async fn split_locally(
        &self,
        file: &MediaFile,
        duration_secs: f64,
    ) -> Result<Vec<Segment>, DomainError> {
        let count = SegmentPlanner::segment_count(duration_secs, self.settings.segment_duration);
        let tracker = ProgressTracker::new("local split", count as u64);
        let state = Arc::clone(&self.state);
        tracker.add_callback(Arc::new(move |percent: f64, _message: &str| {
            state.send_modify(|s| {
                s.progress = percent;
                s.updated_at = Utc::now();
            });
        }));

        tokio::select! {
            result = self.engine.run(file, duration_secs, &tracker) => result,
            _ = self.stop.cancelled() => Err(DomainError::Cancelled),
        }
    }

    async fn split_remotely(&mut self, file: &MediaFile) -> Result<Vec<Segment>, DomainError> {
        let job_id = tokio::select! {
            result = self.remote.submit(file) => result?,
            _ = self.stop.cancelled() => return Err(DomainError::Cancelled),
        };
        self.active_job = Some(job_id.clone());
        let job = Job::submitted(job_id.clone());
        self.state.send_modify(|s| {
            s.job = Some(job);
            s.updated_at = Utc::now();
        });

        let mut updates = self.remote.watch(job_id, self.stop.child_token());
        while let Some(update) = updates.next().await {
            match update {
                Ok(status) => {
                    let status = named_after(file, status);
                    self.state.send_modify(|s| {
                        if let Some(job) = s.job.as_mut() {
                            job.apply(&status);
                        }
                        s.progress = f64::from(status.progress());
                        s.updated_at = Utc::now();
                    });
                    if let JobStatus::Completed { segments } = status {
                        return Ok(segments);
                    }
                }
                Err(e) => {
                    let detail = match &e {
                        DomainError::RemoteProcessing { detail } => detail.clone(),
                        other => other.to_string(),
                    };
                    self.state.send_modify(|s| {
                        if let Some(job) = s.job.as_mut() {
                            job.fail(detail);
                        }
                    });
                    return Err(e);
                }
            }
        }

        // Stream ended without a terminal status: observation was stopped
        Err(DomainError::Cancelled)
    }

    /// Return to idle, cancelling the last known remote job
    pub async fn reset(&mut self) {
        self.abandon().await;
        self.state.send_replace(SessionSnapshot::idle());
        info!("Session reset");
    }

    /// Write one completed segment into `dir`
    pub async fn download_segment(&self, index: usize, dir: &Path) -> Result<PathBuf, DomainError> {
        let segments = self.completed_segments()?;
        let segment = segments
            .into_iter()
            .find(|s| s.index == index)
            .ok_or_else(|| DomainError::InvalidTransition(format!("there is no segment {}", index)))?;
        self.writer.write(&segment, dir).await
    }

    /// Start staggered writes of every completed segment into `dir`
    pub fn download_all(
        &self,
        dir: impl Into<PathBuf>,
    ) -> Result<JoinSet<Result<PathBuf, DomainError>>, DomainError> {
        let segments = self.completed_segments()?;
        debug!("Downloading {} segments", segments.len());
        Ok(self.writer.write_all(segments, dir.into()))
    }

    fn completed_segments(&self) -> Result<Vec<Segment>, DomainError> {
        let state = self.state.borrow();
        if state.phase != SessionPhase::Completed {
            return Err(DomainError::InvalidTransition(format!(
                "segments are not available while {}",
                state.phase
            )));
        }
        Ok(state.segments.clone())
    }

    /// Stop observing outstanding work and cancel the remote job, if any
    async fn abandon(&mut self) {
        self.stop.cancel();
        self.stop = self.interrupt.child_token();
        if let Some(job_id) = self.active_job.take() {
            self.remote.cancel(&job_id).await;
        }
    }

    fn transition<F>(&self, phase: SessionPhase, update: F)
    where
        F: FnOnce(&mut SessionSnapshot),
    {
        let from = self.phase();
        self.state.send_modify(|s| {
            s.phase = phase;
            update(s);
            s.updated_at = Utc::now();
        });
        debug!("Session {} -> {}", from, phase);
    }

    fn fail(&self, e: DomainError) -> DomainError {
        if e.is_validation() {
            warn!("{}", e);
        } else {
            error!("{}", e);
        }
        let message = e.to_string();
        let code = e.code();
        self.transition(SessionPhase::Error, |s| {
            s.segments.clear();
            s.error = Some(message);
            s.error_code = Some(code);
        });
        e
    }
}

/// Completed remote parts are written as `{base}_part{index}.mp4`, like local ones
fn named_after(file: &MediaFile, status: JobStatus) -> JobStatus {
    match status {
        JobStatus::Completed { segments } => JobStatus::Completed {
            segments: segments
                .into_iter()
                .map(|mut segment| {
                    segment.name = SegmentPlanner::segment_name(file.base_name(), segment.index);
                    segment
                })
                .collect(),
        },
        other => other,
    }
}
