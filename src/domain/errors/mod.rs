// Domain errors - Error taxonomy for the split workflow

use std::fmt;

/// Reasons a selected file is refused before any processing starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// File exceeds the absolute size ceiling
    FileTooLarge { size: u64, limit: u64 },
    /// Declared media kind is not a recognized video category
    UnsupportedMediaKind(String),
    /// File does not exist or cannot be stat'ed
    FileNotFound(String),
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::FileTooLarge { size, limit } => write!(
                f,
                "file is {} bytes, the maximum supported size is {} bytes",
                size, limit
            ),
            ValidationIssue::UnsupportedMediaKind(kind) => {
                write!(f, "'{}' is not a supported video type", kind)
            }
            ValidationIssue::FileNotFound(path) => write!(f, "file not found: {}", path),
        }
    }
}

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Selected file was rejected up front
    Validation(ValidationIssue),
    /// Duration probe could not read the file as media
    MediaRead(String),
    /// Codec runtime could not be loaded
    RuntimeLoad(String),
    /// A local segmentation step failed
    LocalProcessing(String),
    /// Remote upload was refused or failed
    Upload(String),
    /// Remote status query failed
    StatusFetch(String),
    /// Remote service reported the job as failed
    RemoteProcessing { detail: String },
    /// Split requested for a file that needs no split
    NoOp(String),
    /// Action not permitted in the current session phase
    InvalidTransition(String),
    /// Observation was stopped before the operation finished
    Cancelled,
    /// Writing a segment to its destination failed
    Output(String),
}

impl DomainError {
    /// Stable machine-readable code for this error category
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation",
            DomainError::MediaRead(_) => "media_read",
            DomainError::RuntimeLoad(_) => "runtime_load",
            DomainError::LocalProcessing(_) => "local_processing",
            DomainError::Upload(_) => "upload",
            DomainError::StatusFetch(_) => "status_fetch",
            DomainError::RemoteProcessing { .. } => "remote_processing",
            DomainError::NoOp(_) => "no_op",
            DomainError::InvalidTransition(_) => "invalid_transition",
            DomainError::Cancelled => "cancelled",
            DomainError::Output(_) => "output",
        }
    }

    /// True for errors caused by the selected file itself
    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Validation(_))
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::Validation(issue) => write!(f, "Invalid file: {}", issue),
            DomainError::MediaRead(msg) => write!(f, "Could not read media: {}", msg),
            DomainError::RuntimeLoad(msg) => write!(f, "Could not load codec runtime: {}", msg),
            DomainError::LocalProcessing(msg) => write!(f, "Local processing failed: {}", msg),
            DomainError::Upload(msg) => write!(f, "Upload failed: {}", msg),
            DomainError::StatusFetch(msg) => write!(f, "Could not fetch job status: {}", msg),
            DomainError::RemoteProcessing { detail } => {
                write!(f, "Remote processing failed: {}", detail)
            }
            DomainError::NoOp(msg) => write!(f, "Nothing to do: {}", msg),
            DomainError::InvalidTransition(msg) => write!(f, "Invalid action: {}", msg),
            DomainError::Cancelled => write!(f, "Operation cancelled"),
            DomainError::Output(msg) => write!(f, "Could not write segment: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

impl From<ValidationIssue> for DomainError {
    fn from(issue: ValidationIssue) -> Self {
        DomainError::Validation(issue)
    }
}
