//! Command implementations

use anyhow::{Context, Result};
use futures::StreamExt;
use serde_json::json;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::app::{AppContainer, SessionPhase, SessionSnapshot};
use crate::cli::args::{CancelArgs, PlanArgs, SplitArgs, StatusArgs};
use crate::domain::model::{JobId, JobStatus, ProcessingPlan};
use crate::utils::time::DisplayFormat;

/// Execute the plan command
pub async fn plan(container: &dyn AppContainer, args: PlanArgs, json: bool) -> Result<()> {
    info!("Planning split of {}", args.input.display());

    let mut session = container.session();
    session.select_file(&args.input).await?;
    let snapshot = session.snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_plan(&snapshot);
    }
    Ok(())
}

/// Execute the split command
pub async fn split(container: &dyn AppContainer, args: SplitArgs, json: bool) -> Result<()> {
    info!("Splitting {} into {}", args.input.display(), args.out.display());

    let mut session = container.session();
    let plan = session.select_file(&args.input).await?;

    let interrupt = interrupt_on_ctrl_c(session.interrupt_handle());
    let reporter = (!json).then(|| {
        let mut updates = session.subscribe();
        tokio::spawn(async move {
            let mut last = None;
            while updates.changed().await.is_ok() {
                let (phase, percent) = {
                    let snapshot = updates.borrow_and_update();
                    (snapshot.phase, snapshot.progress.floor() as u8)
                };
                if phase == SessionPhase::Processing && last != Some(percent) {
                    eprintln!("Splitting... {}%", percent);
                    last = Some(percent);
                }
            }
        })
    });

    let result = session.start_split().await;
    interrupt.abort();
    if let Some(reporter) = reporter {
        reporter.abort();
    }
    if let Err(e) = result {
        session.reset().await;
        return Err(e).context("split failed");
    }

    let mut tasks = session.download_all(args.out.clone())?;
    let mut written = Vec::new();
    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined.context("download task panicked")? {
            Ok(path) => written.push(path),
            Err(e) => {
                warn!("{}", e);
                failures.push(e.to_string());
            }
        }
    }
    written.sort();
    session.reset().await;

    if json {
        let output = json!({
            "input": args.input,
            "plan": plan,
            "segments": written,
            "failures": failures,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for path in &written {
            println!("{}", path.display());
        }
    }

    if !failures.is_empty() {
        anyhow::bail!("{} of {} segments could not be written", failures.len(), plan.segment_count);
    }
    info!("Wrote {} segments to {}", written.len(), args.out.display());
    Ok(())
}

/// Execute the status command
pub async fn status(container: &dyn AppContainer, args: StatusArgs, json: bool) -> Result<()> {
    let client = container.remote_client();
    let job_id = JobId::new(args.job);

    if !args.watch {
        let status = client.poll(&job_id).await?;
        print_status(&job_id, &status, json)?;
        return Ok(());
    }

    let stop = CancellationToken::new();
    let interrupt = interrupt_on_ctrl_c(stop.clone());
    let mut updates = client.watch(job_id.clone(), stop);
    let mut outcome = Ok(());
    while let Some(update) = updates.next().await {
        match update {
            Ok(status) => print_status(&job_id, &status, json)?,
            Err(e) => {
                outcome = Err(e.into());
                break;
            }
        }
    }
    interrupt.abort();
    outcome
}

/// Execute the cancel command
pub async fn cancel(container: &dyn AppContainer, args: CancelArgs, json: bool) -> Result<()> {
    let job_id = JobId::new(args.job);
    container.remote_client().cancel(&job_id).await;

    if json {
        println!("{}", json!({ "jobId": job_id, "cancelRequested": true }));
    } else {
        println!("Cancellation requested for job {}", job_id);
    }
    Ok(())
}

/// Trigger `token` on Ctrl-C until the returned task is aborted
fn interrupt_on_ctrl_c(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping");
            token.cancel();
        }
    })
}

fn print_plan(snapshot: &SessionSnapshot) {
    if let Some(file) = &snapshot.file {
        println!("File:     {} ({})", file.name, DisplayFormat::format_size(file.size));
    }
    if let Some(duration) = snapshot.duration_secs {
        println!("Duration: {}", DisplayFormat::format_duration(duration));
    }
    if let Some(plan) = &snapshot.plan {
        println!("Plan:     {}", describe_plan(plan));
        if let Some(warning) = plan.warning {
            println!("Note:     {}", warning.message());
        }
    }
}

fn describe_plan(plan: &ProcessingPlan) -> String {
    match plan.path {
        Some(path) => format!("{} split into {} segments", path, plan.segment_count),
        None => "no split needed".to_string(),
    }
}

fn print_status(job_id: &JobId, status: &JobStatus, json: bool) -> Result<()> {
    if json {
        let output = match status {
            JobStatus::Processing { progress } => json!({
                "jobId": job_id,
                "status": "processing",
                "progress": progress,
            }),
            JobStatus::Completed { segments } => json!({
                "jobId": job_id,
                "status": "completed",
                "progress": 100,
                "segments": segments,
            }),
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    match status {
        JobStatus::Processing { progress } => println!("{}: processing {}%", job_id, progress),
        JobStatus::Completed { segments } => {
            println!("{}: completed with {} segments", job_id, segments.len());
            for segment in segments {
                println!("  {:>3}  {}", segment.index, segment.name);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{PlanWarning, ProcessingPath};

    #[test]
    fn test_describe_plan() {
        let plan = ProcessingPlan {
            path: Some(ProcessingPath::Local),
            warning: None,
            segment_count: 3,
            duration_secs: 300.0,
            file_size: 1024,
        };
        assert_eq!(describe_plan(&plan), "local split into 3 segments");

        let plan = ProcessingPlan {
            path: None,
            warning: Some(PlanWarning::NoSplitNeeded),
            segment_count: 1,
            duration_secs: 90.0,
            file_size: 1024,
        };
        assert_eq!(describe_plan(&plan), "no split needed");
    }
}
