// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::domain::errors::{DomainError, ValidationIssue};

/// Fixed length of every segment except possibly the last
pub const SEGMENT_DURATION_SECS: f64 = 120.0;
/// Largest file processed on this machine
pub const LOCAL_MAX_SIZE: u64 = 300 * 1024 * 1024;
/// Largest file accepted at all
pub const REMOTE_MAX_SIZE: u64 = 5 * 1024 * 1024 * 1024;
/// Delay between two remote status queries
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Delay between two consecutive downloads in "download all"
pub const DOWNLOAD_STAGGER: Duration = Duration::from_secs(1);

/// Tunable thresholds and timings for one session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitSettings {
    /// Segment length in seconds
    pub segment_duration: f64,
    /// Files above this size go to the remote service
    pub local_max_size: u64,
    /// Files above this size are rejected
    pub remote_max_size: u64,
    pub poll_interval: Duration,
    pub download_stagger: Duration,
}

impl Default for SplitSettings {
    fn default() -> Self {
        Self {
            segment_duration: SEGMENT_DURATION_SECS,
            local_max_size: LOCAL_MAX_SIZE,
            remote_max_size: REMOTE_MAX_SIZE,
            poll_interval: POLL_INTERVAL,
            download_stagger: DOWNLOAD_STAGGER,
        }
    }
}

/// Declared media kind of a file, as a MIME essence string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaKind(String);

impl MediaKind {
    pub fn new(essence: impl Into<String>) -> Self {
        Self(essence.into().to_lowercase())
    }

    /// Guess the kind from the file extension
    pub fn guess(path: &Path) -> Self {
        let guess = mime_guess::from_path(path).first_or_octet_stream();
        Self::new(guess.essence_str())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this kind belongs to the video category
    pub fn is_video(&self) -> bool {
        self.0.starts_with("video/")
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A selected input file. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub kind: MediaKind,
}

impl MediaFile {
    /// Build a media file handle, rejecting non-video kinds
    pub fn new(
        path: impl Into<PathBuf>,
        size: u64,
        kind: MediaKind,
    ) -> Result<Self, DomainError> {
        let path = path.into();
        if !kind.is_video() {
            return Err(ValidationIssue::UnsupportedMediaKind(kind.to_string()).into());
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        Ok(Self {
            path,
            name,
            size,
            kind,
        })
    }

    /// Stat a file on disk and wrap it
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await.map_err(|_| {
            DomainError::Validation(ValidationIssue::FileNotFound(path.display().to_string()))
        })?;
        if !metadata.is_file() {
            return Err(ValidationIssue::FileNotFound(path.display().to_string()).into());
        }
        Self::new(path, metadata.len(), MediaKind::guess(path))
    }

    /// File name without its extension
    pub fn base_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(pos) if pos > 0 => &self.name[..pos],
            _ => &self.name,
        }
    }

    /// Lower-cased extension, if any
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }
}

/// Where the split work happens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessingPath {
    Local,
    Remote,
}

impl fmt::Display for ProcessingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingPath::Local => write!(f, "local"),
            ProcessingPath::Remote => write!(f, "remote"),
        }
    }
}

/// Advisory message attached to a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlanWarning {
    NoSplitNeeded,
    LargeFileUsingRemote,
}

impl PlanWarning {
    /// Human-readable explanation
    pub fn message(&self) -> &'static str {
        match self {
            PlanWarning::NoSplitNeeded => {
                "The video is not longer than one segment, there is nothing to split"
            }
            PlanWarning::LargeFileUsingRemote => {
                "The file is too large to split locally and will be processed by the remote service"
            }
        }
    }
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanWarning::NoSplitNeeded => write!(f, "NoSplitNeeded"),
            PlanWarning::LargeFileUsingRemote => write!(f, "LargeFileUsingRemote"),
        }
    }
}

/// Processing decision derived from file size and duration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingPlan {
    /// None when no split is needed
    pub path: Option<ProcessingPath>,
    pub warning: Option<PlanWarning>,
    pub segment_count: usize,
    pub duration_secs: f64,
    pub file_size: u64,
}

impl ProcessingPlan {
    /// Whether a split action may be offered
    pub fn needs_split(&self) -> bool {
        self.warning != Some(PlanWarning::NoSplitNeeded) && self.path.is_some()
    }
}

/// Time window of one segment to cut
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentWindow {
    /// 1-based sequence index
    pub index: usize,
    pub start_secs: f64,
    pub duration_secs: f64,
}

/// Opaque job identifier assigned by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a segment's content is retrieved
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentSource {
    /// Bytes produced locally and held in memory
    Memory(Bytes),
    /// Part stored by the remote service, fetched on demand
    Remote { job_id: JobId, part_number: u32 },
}

impl Serialize for SegmentSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SegmentSource::Memory(bytes) => {
                let mut s = serializer.serialize_struct("SegmentSource", 2)?;
                s.serialize_field("kind", "memory")?;
                s.serialize_field("len", &bytes.len())?;
                s.end()
            }
            SegmentSource::Remote {
                job_id,
                part_number,
            } => {
                let mut s = serializer.serialize_struct("SegmentSource", 3)?;
                s.serialize_field("kind", "remote")?;
                s.serialize_field("job_id", job_id)?;
                s.serialize_field("part_number", part_number)?;
                s.end()
            }
        }
    }
}

/// One output unit of a split
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// 1-based, contiguous sequence index
    pub index: usize,
    pub name: String,
    pub source: SegmentSource,
}

impl Segment {
    pub fn local(index: usize, name: String, data: Bytes) -> Self {
        Self {
            index,
            name,
            source: SegmentSource::Memory(data),
        }
    }

    pub fn remote(index: usize, name: String, job_id: JobId, part_number: u32) -> Self {
        Self {
            index,
            name,
            source: SegmentSource::Remote {
                job_id,
                part_number,
            },
        }
    }
}

/// Result of a single remote status query
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Processing { progress: u8 },
    Completed { segments: Vec<Segment> },
}

impl JobStatus {
    pub fn progress(&self) -> u8 {
        match self {
            JobStatus::Processing { progress } => *progress,
            JobStatus::Completed { .. } => 100,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed { .. })
    }
}

/// Lifecycle of a remote job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobLifecycle {
    Submitted,
    Processing,
    Completed,
    Failed,
}

/// Remote processing state tracked by the session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub id: JobId,
    pub lifecycle: JobLifecycle,
    pub progress: u8,
    pub segments: Vec<Segment>,
    pub error: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl Job {
    pub fn submitted(id: JobId) -> Self {
        Self {
            id,
            lifecycle: JobLifecycle::Submitted,
            progress: 0,
            segments: Vec::new(),
            error: None,
            submitted_at: Utc::now(),
        }
    }

    /// Fold a status report into the job
    pub fn apply(&mut self, status: &JobStatus) {
        match status {
            JobStatus::Processing { progress } => {
                self.lifecycle = JobLifecycle::Processing;
                self.progress = *progress;
            }
            JobStatus::Completed { segments } => {
                self.lifecycle = JobLifecycle::Completed;
                self.progress = 100;
                self.segments = segments.clone();
            }
        }
    }

    pub fn fail(&mut self, detail: impl Into<String>) {
        self.lifecycle = JobLifecycle::Failed;
        self.error = Some(detail.into());
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.lifecycle,
            JobLifecycle::Completed | JobLifecycle::Failed
        )
    }
}

#[cfg(test)]
mod tests;
