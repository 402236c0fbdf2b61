//! HTTP adapter for the remote split job service
//!
//! Wire contract:
//! - `POST /split` multipart field `video` -> `{ "jobId": "..." }`
//! - `GET /status/{jobId}` -> `{ status, progress, files?, error? }`
//! - `GET /download/{jobId}/{partNumber}` -> part bytes
//! - `DELETE /job/{jobId}` -> ignored

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};
use url::Url;

use crate::domain::errors::DomainError;
use crate::domain::model::{JobId, JobStatus, MediaFile, Segment};
use crate::error::{SplitXError, SplitXResult};
use crate::ports::JobServicePort;
use crate::utils::path::PathUtils;

/// Response of `POST /split`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    job_id: String,
}

/// Response of `GET /status/{jobId}`
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub files: Vec<PartDescriptor>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One finished output part
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartDescriptor {
    pub name: String,
    pub part_number: u32,
}

impl StatusResponse {
    /// Translate the wire status into a domain status.
    ///
    /// Unknown status strings are treated as still processing.
    pub fn into_status(self, job_id: &JobId) -> Result<JobStatus, DomainError> {
        match self.status.as_str() {
            "error" => Err(DomainError::RemoteProcessing {
                detail: self.error.unwrap_or_else(|| "Unknown error".to_string()),
            }),
            "completed" => {
                if self.files.is_empty() {
                    return Err(DomainError::RemoteProcessing {
                        detail: "job completed without output parts".to_string(),
                    });
                }
                let mut parts = self.files;
                parts.sort_by_key(|part| part.part_number);

                // Names reducing to the same bare file name must not share an output path
                let mut taken = HashSet::new();
                let segments = parts
                    .into_iter()
                    .enumerate()
                    .map(|(i, part)| {
                        let index = i + 1;
                        let mut name = PathUtils::safe_file_name(&part.name, part.part_number);
                        while !taken.insert(name.clone()) {
                            name = PathUtils::indexed_file_name(&name, index);
                        }
                        Segment::remote(index, name, job_id.clone(), part.part_number)
                    })
                    .collect();
                Ok(JobStatus::Completed { segments })
            }
            _ => {
                let progress = self.progress.unwrap_or(0.0);
                let progress = if progress.is_finite() {
                    progress.round().clamp(0.0, 100.0) as u8
                } else {
                    0
                };
                Ok(JobStatus::Processing { progress })
            }
        }
    }
}

/// reqwest-backed job service client
#[derive(Debug, Clone)]
pub struct HttpJobAdapter {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpJobAdapter {
    /// Create a client for the service rooted at `base_url`
    pub fn new(base_url: &str, connect_timeout: Duration) -> SplitXResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| SplitXError::Config {
            message: format!("invalid service url '{}': {}", base_url, e),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SplitXError::Config {
                message: format!("service url '{}' cannot be used as a base", base_url),
            });
        }

        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(concat!("splitx-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL, percent-encoding each path segment
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn error_body(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let body = body.trim();
        if body.is_empty() {
            format!("server responded with {}", status)
        } else {
            format!("server responded with {}: {}", status, body)
        }
    }
}

#[async_trait]
impl JobServicePort for HttpJobAdapter {
    async fn submit(&self, file: &MediaFile) -> Result<JobId, DomainError> {
        let handle = tokio::fs::File::open(&file.path)
            .await
            .map_err(|e| DomainError::Upload(format!("cannot open {}: {}", file.name, e)))?;
        let body = reqwest::Body::wrap_stream(ReaderStream::new(handle));
        let part = Part::stream_with_length(body, file.size)
            .file_name(file.name.clone())
            .mime_str(file.kind.as_str())
            .map_err(|e| DomainError::Upload(e.to_string()))?;
        let form = Form::new().part("video", part);

        let response = self
            .client
            .post(self.endpoint(&["split"]))
            .multipart(form)
            .send()
            .await
            .map_err(|e| DomainError::Upload(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DomainError::Upload(Self::error_body(response).await));
        }

        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Upload(format!("invalid response: {}", e)))?;
        Ok(JobId::new(body.job_id))
    }

    async fn poll(&self, job_id: &JobId) -> Result<JobStatus, DomainError> {
        let response = self
            .client
            .get(self.endpoint(&["status", job_id.as_str()]))
            .send()
            .await
            .map_err(|e| DomainError::StatusFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DomainError::StatusFetch(Self::error_body(response).await));
        }

        let body: StatusResponse = response
            .json()
            .await
            .map_err(|e| DomainError::StatusFetch(format!("invalid response: {}", e)))?;
        debug!("Status of job {}: {}", job_id, body.status);
        body.into_status(job_id)
    }

    async fn download(&self, job_id: &JobId, part_number: u32) -> Result<Bytes, DomainError> {
        let part = part_number.to_string();
        let response = self
            .client
            .get(self.endpoint(&["download", job_id.as_str(), &part]))
            .send()
            .await
            .map_err(|e| DomainError::Output(format!("download of part {} failed: {}", part, e)))?;

        if !response.status().is_success() {
            return Err(DomainError::Output(format!(
                "download of part {} failed: {}",
                part,
                Self::error_body(response).await
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| DomainError::Output(format!("download of part {} failed: {}", part, e)))
    }

    async fn cancel(&self, job_id: &JobId) {
        let result = self
            .client
            .delete(self.endpoint(&["job", job_id.as_str()]))
            .send()
            .await;
        match result {
            Ok(response) if !response.status().is_success() => {
                warn!("Cancelling job {} returned {}", job_id, response.status());
            }
            Ok(_) => debug!("Job {} deleted", job_id),
            Err(e) => warn!("Cancelling job {} failed: {}", job_id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(json: &str) -> StatusResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_processing_status_progress_is_clamped() {
        let job = JobId::new("j");
        let parsed = status(r#"{"status":"processing","progress":42}"#).into_status(&job);
        assert_eq!(parsed, Ok(JobStatus::Processing { progress: 42 }));

        let parsed = status(r#"{"status":"processing","progress":180.4}"#).into_status(&job);
        assert_eq!(parsed, Ok(JobStatus::Processing { progress: 100 }));

        let parsed = status(r#"{"status":"queued"}"#).into_status(&job);
        assert_eq!(parsed, Ok(JobStatus::Processing { progress: 0 }));
    }

    #[test]
    fn test_error_status_carries_detail() {
        let job = JobId::new("j");
        let parsed = status(r#"{"status":"error","progress":10,"error":"decode failed"}"#)
            .into_status(&job);
        assert_eq!(
            parsed,
            Err(DomainError::RemoteProcessing {
                detail: "decode failed".to_string()
            })
        );

        let parsed = status(r#"{"status":"error"}"#).into_status(&job);
        assert_eq!(
            parsed,
            Err(DomainError::RemoteProcessing {
                detail: "Unknown error".to_string()
            })
        );
    }

    #[test]
    fn test_completed_parts_are_sorted_and_reindexed() {
        let job = JobId::new("j");
        let parsed = status(
            r#"{"status":"completed","progress":100,"files":[
                {"name":"clip_part2.mp4","partNumber":2},
                {"name":"../../etc/clip_part1.mp4","partNumber":1}
            ]}"#,
        )
        .into_status(&job)
        .unwrap();

        let JobStatus::Completed { segments } = parsed else {
            panic!("expected completed status");
        };
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].index, 1);
        assert_eq!(segments[0].name, "clip_part1.mp4");
        assert_eq!(segments[1].index, 2);
        assert_eq!(segments[1], Segment::remote(2, "clip_part2.mp4".to_string(), job.clone(), 2));
    }

    #[test]
    fn test_colliding_part_names_get_distinct_files() {
        let job = JobId::new("j");
        let parsed = status(
            r#"{"status":"completed","files":[
                {"name":"clip.mp4","partNumber":1},
                {"name":"x/clip.mp4","partNumber":2}
            ]}"#,
        )
        .into_status(&job)
        .unwrap();

        let JobStatus::Completed { segments } = parsed else {
            panic!("expected completed status");
        };
        let names: Vec<_> = segments.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["clip.mp4", "clip_part2.mp4"]);

        let out = std::path::Path::new("/out");
        assert_ne!(
            PathUtils::output_path(out, &segments[0].name, 1),
            PathUtils::output_path(out, &segments[1].name, 2)
        );
    }

    #[test]
    fn test_completed_without_parts_is_an_error() {
        let job = JobId::new("j");
        for body in [r#"{"status":"completed"}"#, r#"{"status":"completed","files":[]}"#] {
            assert_eq!(
                status(body).into_status(&job),
                Err(DomainError::RemoteProcessing {
                    detail: "job completed without output parts".to_string()
                })
            );
        }
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let adapter =
            HttpJobAdapter::new("http://localhost:3001/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            adapter.endpoint(&["status", "a b"]).as_str(),
            "http://localhost:3001/api/status/a%20b"
        );

        let adapter = HttpJobAdapter::new("http://localhost:3001", Duration::from_secs(1)).unwrap();
        assert_eq!(
            adapter.endpoint(&["download", "j1", "3"]).as_str(),
            "http://localhost:3001/download/j1/3"
        );
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        assert!(HttpJobAdapter::new("not a url", Duration::from_secs(1)).is_err());
        assert!(HttpJobAdapter::new("mailto:ops@example.com", Duration::from_secs(1)).is_err());
    }
}
