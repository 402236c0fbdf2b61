//! Split engines: local codec-runtime segmentation and the remote job client

pub mod local;
pub mod progress;
pub mod remote;

pub use local::LocalSegmentationEngine;
pub use progress::{ProgressCallback, ProgressInfo, ProgressPhase, ProgressTracker};
pub use remote::RemoteJobClient;
