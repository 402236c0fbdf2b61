//! Progress tracking and callback system for UI integration

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Progress callback trait for UI integration
pub trait ProgressCallback: Send + Sync {
    /// Called whenever the reported percentage changes
    fn on_progress(&self, percent: f64, message: &str);
}

impl<F> ProgressCallback for F
where
    F: Fn(f64, &str) + Send + Sync,
{
    fn on_progress(&self, percent: f64, message: &str) {
        self(percent, message)
    }
}

/// Progress phases
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum ProgressPhase {
    /// Loading the codec runtime
    Initializing,
    /// Copying the input into the runtime
    Loading,
    /// Cutting segments
    Processing,
    /// Operation completed
    Complete,
    /// Operation failed
    Failed,
}

/// Point-in-time progress information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressInfo {
    pub phase: ProgressPhase,
    /// Progress percentage (0.0 - 100.0)
    pub percent: f64,
    /// Completed work units
    pub completed: u64,
    pub total: u64,
    pub message: String,
    pub elapsed: Duration,
}

/// Progress tracker over a fixed number of work units.
///
/// Reported percentages never decrease.
#[derive(Clone)]
pub struct ProgressTracker {
    inner: Arc<Mutex<ProgressTrackerInner>>,
    callbacks: Arc<Mutex<Vec<Arc<dyn ProgressCallback>>>>,
}

struct ProgressTrackerInner {
    info: ProgressInfo,
    start_time: Instant,
}

impl ProgressTracker {
    /// Create a new progress tracker
    pub fn new(operation: &str, total: u64) -> Self {
        let info = ProgressInfo {
            phase: ProgressPhase::Initializing,
            percent: 0.0,
            completed: 0,
            total: total.max(1),
            message: operation.to_string(),
            elapsed: Duration::ZERO,
        };

        Self {
            inner: Arc::new(Mutex::new(ProgressTrackerInner {
                info,
                start_time: Instant::now(),
            })),
            callbacks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a progress callback
    pub fn add_callback(&self, callback: Arc<dyn ProgressCallback>) {
        if let Ok(mut callbacks) = self.callbacks.lock() {
            callbacks.push(callback);
        }
    }

    pub fn set_phase(&self, phase: ProgressPhase) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.info.phase = phase;
        }
    }

    /// Midpoint update before work unit `unit` (0-based) starts
    pub fn begin_unit(&self, unit: u64, message: impl Into<String>) {
        let total = self.total();
        self.report((unit as f64 + 0.5) / total as f64 * 100.0, unit, message.into());
    }

    /// Work unit `unit` (0-based) finished
    pub fn complete_unit(&self, unit: u64, message: impl Into<String>) {
        let total = self.total();
        self.report((unit + 1) as f64 / total as f64 * 100.0, unit + 1, message.into());
    }

    /// Mark the whole operation as finished at exactly 100%
    pub fn finish(&self) {
        let total = self.total();
        self.set_phase(ProgressPhase::Complete);
        self.report(100.0, total, "Complete".to_string());
    }

    /// Mark the operation as failed, keeping the last percentage
    pub fn fail(&self, error: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.info.phase = ProgressPhase::Failed;
            inner.info.message = error.to_string();
        }
    }

    /// Snapshot of the current progress
    pub fn info(&self) -> Option<ProgressInfo> {
        self.inner.lock().ok().map(|inner| {
            let mut info = inner.info.clone();
            info.elapsed = inner.start_time.elapsed();
            info
        })
    }

    pub fn percent(&self) -> f64 {
        self.info().map(|info| info.percent).unwrap_or(0.0)
    }

    fn total(&self) -> u64 {
        self.inner
            .lock()
            .map(|inner| inner.info.total)
            .unwrap_or(1)
    }

    fn report(&self, percent: f64, completed: u64, message: String) {
        let percent = {
            let Ok(mut inner) = self.inner.lock() else {
                return;
            };
            let clamped = percent.clamp(0.0, 100.0).max(inner.info.percent);
            inner.info.percent = clamped;
            inner.info.completed = completed.max(inner.info.completed);
            inner.info.message = message.clone();
            inner.info.elapsed = inner.start_time.elapsed();
            clamped
        };

        if let Ok(callbacks) = self.callbacks.lock() {
            for callback in callbacks.iter() {
                callback.on_progress(percent, &message);
            }
        }
    }
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("info", &self.info())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint_and_completion_percentages() {
        let tracker = ProgressTracker::new("split", 4);
        tracker.begin_unit(0, "part 1");
        assert_eq!(tracker.percent(), 12.5);
        tracker.complete_unit(0, "part 1");
        assert_eq!(tracker.percent(), 25.0);
        tracker.begin_unit(3, "part 4");
        assert_eq!(tracker.percent(), 87.5);
        tracker.complete_unit(3, "part 4");
        assert_eq!(tracker.percent(), 100.0);
    }

    #[test]
    fn test_progress_never_decreases() {
        let tracker = ProgressTracker::new("split", 2);
        tracker.complete_unit(1, "done");
        tracker.begin_unit(0, "late update");
        assert_eq!(tracker.percent(), 100.0);
    }

    #[test]
    fn test_callbacks_receive_updates() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let tracker = ProgressTracker::new("split", 2);
        tracker.add_callback(Arc::new(move |percent: f64, _msg: &str| {
            sink.lock().unwrap().push(percent);
        }));

        tracker.begin_unit(0, "a");
        tracker.complete_unit(0, "a");
        tracker.finish();

        assert_eq!(*seen.lock().unwrap(), vec![25.0, 50.0, 100.0]);
        assert_eq!(tracker.info().unwrap().phase, ProgressPhase::Complete);
    }

    #[test]
    fn test_fail_keeps_percentage() {
        let tracker = ProgressTracker::new("split", 2);
        tracker.complete_unit(0, "a");
        tracker.fail("boom");
        let info = tracker.info().unwrap();
        assert_eq!(info.phase, ProgressPhase::Failed);
        assert_eq!(info.percent, 50.0);
        assert_eq!(info.message, "boom");
    }
}
