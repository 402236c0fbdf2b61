//! Local segmentation through an embedded codec runtime

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::{MediaFile, Segment, SegmentWindow, SplitSettings};
use crate::domain::rules::SegmentPlanner;
use crate::engine::progress::{ProgressPhase, ProgressTracker};
use crate::ports::{CodecRuntime, CodecRuntimeFactory};

/// Cuts a file into fixed-length parts with stream copy, all-or-nothing
pub struct LocalSegmentationEngine {
    runtimes: Arc<dyn CodecRuntimeFactory>,
    segment_duration: f64,
}

impl LocalSegmentationEngine {
    pub fn new(runtimes: Arc<dyn CodecRuntimeFactory>, settings: &SplitSettings) -> Self {
        Self {
            runtimes,
            segment_duration: settings.segment_duration,
        }
    }

    /// Transcode arguments for one window: stream copy, negative timestamps shifted to zero.
    ///
    /// Times are passed at full precision so a sub-millisecond tail never becomes `-t 0`.
    pub fn transcode_args(input: &str, output: &str, window: &SegmentWindow) -> Vec<String> {
        vec![
            "-ss".to_string(),
            window.start_secs.to_string(),
            "-i".to_string(),
            input.to_string(),
            "-t".to_string(),
            window.duration_secs.to_string(),
            "-c".to_string(),
            "copy".to_string(),
            "-avoid_negative_ts".to_string(),
            "make_zero".to_string(),
            output.to_string(),
        ]
    }

    /// Read the source file and split it
    pub async fn run(
        &self,
        file: &MediaFile,
        duration_secs: f64,
        progress: &ProgressTracker,
    ) -> Result<Vec<Segment>, DomainError> {
        let data = tokio::fs::read(&file.path).await.map_err(|e| {
            DomainError::LocalProcessing(format!("failed to read {}: {}", file.path.display(), e))
        })?;
        self.run_with_input(file, Bytes::from(data), duration_secs, progress)
            .await
    }

    /// Split already-loaded input bytes.
    ///
    /// Each call gets a fresh runtime; on failure every buffer written so far
    /// is released and no segment is returned.
    pub async fn run_with_input(
        &self,
        file: &MediaFile,
        input: Bytes,
        duration_secs: f64,
        progress: &ProgressTracker,
    ) -> Result<Vec<Segment>, DomainError> {
        let count = SegmentPlanner::segment_count(duration_secs, self.segment_duration);
        info!(
            "Splitting {} locally into {} segments of {}s",
            file.name, count, self.segment_duration
        );

        let mut runtime = self.runtimes.create();
        progress.set_phase(ProgressPhase::Initializing);
        if let Err(e) = runtime.load().await {
            progress.fail(&e.to_string());
            return Err(match e {
                DomainError::RuntimeLoad(_) => e,
                other => DomainError::RuntimeLoad(other.to_string()),
            });
        }

        let input_name = match file.extension() {
            Some(ext) => format!("input.{}", ext),
            None => "input".to_string(),
        };
        let mut live: Vec<String> = Vec::new();

        let result = self
            .cut_all(
                runtime.as_mut(),
                file,
                &input_name,
                input,
                duration_secs,
                progress,
                &mut live,
            )
            .await;

        release(runtime.as_mut(), &live).await;

        match result {
            Ok(segments) => {
                progress.finish();
                info!("Local split of {} produced {} segments", file.name, segments.len());
                Ok(segments)
            }
            Err(e) => {
                progress.fail(&e.to_string());
                Err(match e {
                    DomainError::LocalProcessing(_) => e,
                    other => DomainError::LocalProcessing(other.to_string()),
                })
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn cut_all(
        &self,
        runtime: &mut dyn CodecRuntime,
        file: &MediaFile,
        input_name: &str,
        input: Bytes,
        duration_secs: f64,
        progress: &ProgressTracker,
        live: &mut Vec<String>,
    ) -> Result<Vec<Segment>, DomainError> {
        progress.set_phase(ProgressPhase::Loading);
        live.push(input_name.to_string());
        runtime.write_file(input_name, input).await?;

        progress.set_phase(ProgressPhase::Processing);
        let count = SegmentPlanner::segment_count(duration_secs, self.segment_duration) as u64;
        let mut segments = Vec::with_capacity(count as usize);

        for window in SegmentPlanner::windows(duration_secs, self.segment_duration) {
            let unit = (window.index - 1) as u64;
            let name = SegmentPlanner::segment_name(file.base_name(), window.index);
            let output_name = format!("output_part{}.mp4", window.index);

            progress.begin_unit(unit, format!("Cutting segment {} of {}", window.index, count));
            debug!(
                "Segment {}: start={:.3}s duration={:.3}s",
                window.index, window.start_secs, window.duration_secs
            );

            live.push(output_name.clone());
            runtime
                .run(&Self::transcode_args(input_name, &output_name, &window))
                .await?;
            let data = runtime.read_file(&output_name).await?;
            runtime.delete_file(&output_name).await?;
            live.pop();

            segments.push(Segment::local(window.index, name, data));
            progress.complete_unit(unit, format!("Segment {} of {} done", window.index, count));
        }

        Ok(segments)
    }
}

/// Best-effort removal of buffers still held by the runtime
async fn release(runtime: &mut dyn CodecRuntime, names: &[String]) {
    for name in names {
        if let Err(e) = runtime.delete_file(name).await {
            warn!("Failed to release runtime buffer {}: {}", name, e);
        }
    }
}
