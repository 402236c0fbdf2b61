// Unit tests for business rules

use super::*;

const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * MIB;

fn settings() -> SplitSettings {
    SplitSettings::default()
}

#[test]
fn test_small_long_file_goes_local() {
    let plan = StrategySelector::select(50 * MIB, 300.0, &settings()).unwrap();
    assert_eq!(plan.path, Some(ProcessingPath::Local));
    assert_eq!(plan.warning, None);
    assert_eq!(plan.segment_count, 3);
    assert!(plan.needs_split());
}

#[test]
fn test_large_file_goes_remote() {
    let plan = StrategySelector::select(400 * MIB, 600.0, &settings()).unwrap();
    assert_eq!(plan.path, Some(ProcessingPath::Remote));
    assert_eq!(plan.warning, Some(PlanWarning::LargeFileUsingRemote));
    assert_eq!(plan.segment_count, 5);
}

#[test]
fn test_short_file_needs_no_split() {
    let plan = StrategySelector::select(10 * MIB, 60.0, &settings()).unwrap();
    assert_eq!(plan.warning, Some(PlanWarning::NoSplitNeeded));
    assert!(!plan.needs_split());

    // Regardless of size, as long as it is under the ceiling
    let plan = StrategySelector::select(4 * GIB, 120.0, &settings()).unwrap();
    assert_eq!(plan.warning, Some(PlanWarning::NoSplitNeeded));
}

#[test]
fn test_oversize_file_rejected_before_duration_rules() {
    for duration in [30.0, 120.0, 600.0] {
        let err = StrategySelector::select(6 * GIB, duration, &settings()).unwrap_err();
        assert_eq!(
            err,
            DomainError::Validation(ValidationIssue::FileTooLarge {
                size: 6 * GIB,
                limit: 5 * GIB,
            })
        );
    }
}

#[test]
fn test_threshold_boundaries_are_inclusive() {
    let plan = StrategySelector::select(300 * MIB, 121.0, &settings()).unwrap();
    assert_eq!(plan.path, Some(ProcessingPath::Local));

    let plan = StrategySelector::select(300 * MIB + 1, 121.0, &settings()).unwrap();
    assert_eq!(plan.path, Some(ProcessingPath::Remote));

    assert!(StrategySelector::select(5 * GIB, 121.0, &settings()).is_ok());
    assert!(StrategySelector::select(5 * GIB + 1, 121.0, &settings()).is_err());
}

#[test]
fn test_segment_count() {
    assert_eq!(SegmentPlanner::segment_count(300.0, 120.0), 3);
    assert_eq!(SegmentPlanner::segment_count(240.0, 120.0), 2);
    assert_eq!(SegmentPlanner::segment_count(240.5, 120.0), 3);
    assert_eq!(SegmentPlanner::segment_count(60.0, 120.0), 1);
    assert_eq!(SegmentPlanner::segment_count(0.0, 120.0), 1);
}

#[test]
fn test_windows_cover_duration_contiguously() {
    let windows: Vec<_> = SegmentPlanner::windows(300.0, 120.0).collect();
    assert_eq!(windows.len(), 3);
    assert_eq!(
        windows.iter().map(|w| w.index).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert_eq!(windows[0].start_secs, 0.0);
    assert_eq!(windows[1].start_secs, 120.0);
    assert_eq!(windows[2].start_secs, 240.0);
    assert_eq!(windows[0].duration_secs, 120.0);
    assert_eq!(windows[2].duration_secs, 60.0);

    let total: f64 = windows.iter().map(|w| w.duration_secs).sum();
    assert!((total - 300.0).abs() < 1e-9);
}

#[test]
fn test_segment_name() {
    assert_eq!(SegmentPlanner::segment_name("base", 1), "base_part1.mp4");
    assert_eq!(SegmentPlanner::segment_name("my clip", 12), "my clip_part12.mp4");
}
