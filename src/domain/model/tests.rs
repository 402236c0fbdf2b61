// Unit tests for domain models

use super::*;
use crate::domain::errors::*;

fn video(name: &str, size: u64) -> MediaFile {
    MediaFile::new(name, size, MediaKind::new("video/mp4")).unwrap()
}

#[test]
fn test_media_kind_guess_from_extension() {
    assert!(MediaKind::guess(Path::new("clip.mp4")).is_video());
    assert!(MediaKind::guess(Path::new("clip.MOV")).is_video());
    assert!(MediaKind::guess(Path::new("clip.mkv")).is_video());
    assert!(!MediaKind::guess(Path::new("notes.txt")).is_video());
    assert!(!MediaKind::guess(Path::new("no_extension")).is_video());
}

#[test]
fn test_media_file_rejects_non_video() {
    let err = MediaFile::new("song.mp3", 10, MediaKind::new("audio/mpeg")).unwrap_err();
    assert_eq!(
        err,
        DomainError::Validation(ValidationIssue::UnsupportedMediaKind(
            "audio/mpeg".to_string()
        ))
    );
    assert!(err.is_validation());
}

#[test]
fn test_media_file_names() {
    let file = video("/videos/holiday.trip.mp4", 42);
    assert_eq!(file.name, "holiday.trip.mp4");
    assert_eq!(file.base_name(), "holiday.trip");
    assert_eq!(file.extension().as_deref(), Some("mp4"));

    let hidden = video(".hidden", 1);
    assert_eq!(hidden.base_name(), ".hidden");
    assert_eq!(hidden.extension(), None);
}

#[tokio::test]
async fn test_media_file_open_missing_file() {
    let err = MediaFile::open("/definitely/not/here.mp4").await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationIssue::FileNotFound(_))
    ));
}

#[tokio::test]
async fn test_media_file_open_reads_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.mp4");
    std::fs::write(&path, vec![0u8; 1234]).unwrap();

    let file = MediaFile::open(&path).await.unwrap();
    assert_eq!(file.size, 1234);
    assert_eq!(file.name, "sample.mp4");
    assert_eq!(file.kind.as_str(), "video/mp4");
}

#[test]
fn test_plan_needs_split() {
    let plan = ProcessingPlan {
        path: None,
        warning: Some(PlanWarning::NoSplitNeeded),
        segment_count: 1,
        duration_secs: 60.0,
        file_size: 10,
    };
    assert!(!plan.needs_split());

    let plan = ProcessingPlan {
        path: Some(ProcessingPath::Remote),
        warning: Some(PlanWarning::LargeFileUsingRemote),
        segment_count: 5,
        duration_secs: 600.0,
        file_size: 10,
    };
    assert!(plan.needs_split());
}

#[test]
fn test_job_lifecycle() {
    let mut job = Job::submitted(JobId::new("abc"));
    assert_eq!(job.lifecycle, JobLifecycle::Submitted);
    assert!(!job.is_terminal());

    job.apply(&JobStatus::Processing { progress: 40 });
    assert_eq!(job.lifecycle, JobLifecycle::Processing);
    assert_eq!(job.progress, 40);

    let segments = vec![Segment::remote(
        1,
        "a_part1.mp4".to_string(),
        JobId::new("abc"),
        1,
    )];
    job.apply(&JobStatus::Completed {
        segments: segments.clone(),
    });
    assert_eq!(job.lifecycle, JobLifecycle::Completed);
    assert_eq!(job.progress, 100);
    assert_eq!(job.segments, segments);
    assert!(job.is_terminal());
}

#[test]
fn test_job_failure_records_detail() {
    let mut job = Job::submitted(JobId::new("abc"));
    job.fail("decode failed");
    assert_eq!(job.lifecycle, JobLifecycle::Failed);
    assert_eq!(job.error.as_deref(), Some("decode failed"));
}

#[test]
fn test_segment_source_serializes_without_bytes() {
    let local = Segment::local(1, "x_part1.mp4".to_string(), Bytes::from_static(b"abcd"));
    let json = serde_json::to_value(&local).unwrap();
    assert_eq!(json["source"]["kind"], "memory");
    assert_eq!(json["source"]["len"], 4);

    let remote = Segment::remote(2, "x_part2.mp4".to_string(), JobId::new("j1"), 2);
    let json = serde_json::to_value(&remote).unwrap();
    assert_eq!(json["source"]["kind"], "remote");
    assert_eq!(json["source"]["job_id"], "j1");
    assert_eq!(json["source"]["part_number"], 2);
}

#[test]
fn test_error_codes_and_messages() {
    let err = DomainError::RemoteProcessing {
        detail: "decode failed".to_string(),
    };
    assert_eq!(err.code(), "remote_processing");
    assert!(err.to_string().contains("decode failed"));

    let err: DomainError = ValidationIssue::FileTooLarge {
        size: 10,
        limit: 5,
    }
    .into();
    assert_eq!(err.code(), "validation");
}
