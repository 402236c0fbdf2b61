// Domain rules - Business logic and policies

use crate::domain::errors::*;
use crate::domain::model::*;

/// Business rules for choosing where a file gets split
pub struct StrategySelector;

impl StrategySelector {
    /// Map (size, duration) to a processing plan.
    ///
    /// Rules are evaluated in order: the absolute size ceiling first, then
    /// the no-split case, then the local/remote threshold.
    pub fn select(
        size: u64,
        duration_secs: f64,
        settings: &SplitSettings,
    ) -> Result<ProcessingPlan, DomainError> {
        Self::check_size(size, settings)?;

        let segment_count = SegmentPlanner::segment_count(duration_secs, settings.segment_duration);

        let (path, warning) = if duration_secs <= settings.segment_duration {
            (None, Some(PlanWarning::NoSplitNeeded))
        } else if size > settings.local_max_size {
            (
                Some(ProcessingPath::Remote),
                Some(PlanWarning::LargeFileUsingRemote),
            )
        } else {
            (Some(ProcessingPath::Local), None)
        };

        Ok(ProcessingPlan {
            path,
            warning,
            segment_count,
            duration_secs,
            file_size: size,
        })
    }

    /// Reject files above the absolute size ceiling
    pub fn check_size(size: u64, settings: &SplitSettings) -> Result<(), DomainError> {
        if size > settings.remote_max_size {
            return Err(DomainError::Validation(ValidationIssue::FileTooLarge {
                size,
                limit: settings.remote_max_size,
            }));
        }
        Ok(())
    }
}

/// Business rules for segment boundaries and naming
pub struct SegmentPlanner;

impl SegmentPlanner {
    /// N = ceil(duration / segment_duration), never below one
    pub fn segment_count(duration_secs: f64, segment_duration: f64) -> usize {
        if duration_secs <= 0.0 || segment_duration <= 0.0 {
            return 1;
        }
        ((duration_secs / segment_duration).ceil() as usize).max(1)
    }

    /// Lazily yield the cut windows covering the whole duration
    pub fn windows(
        duration_secs: f64,
        segment_duration: f64,
    ) -> impl Iterator<Item = SegmentWindow> {
        let count = Self::segment_count(duration_secs, segment_duration);
        (0..count).map(move |i| {
            let start_secs = i as f64 * segment_duration;
            SegmentWindow {
                index: i + 1,
                start_secs,
                duration_secs: segment_duration.min(duration_secs - start_secs).max(0.0),
            }
        })
    }

    /// Display name of the segment with the given 1-based index
    pub fn segment_name(base_name: &str, index: usize) -> String {
        format!("{}_part{}.mp4", base_name, index)
    }
}

#[cfg(test)]
mod tests;
