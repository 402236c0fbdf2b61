//! SplitX CLI Video Splitter Library
//!
//! Splits long videos into fixed-length segments. Files up to the local size
//! limit are cut in-process with stream copy; larger files are uploaded to a
//! remote job service that does the cutting and serves the parts back.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{AppContainer, DefaultAppContainer, SessionPhase, SessionSnapshot, SplitSession};
pub use domain::errors::DomainError;
pub use domain::model::{MediaFile, ProcessingPath, ProcessingPlan, Segment, SplitSettings};
pub use error::{SplitXError, SplitXResult};
