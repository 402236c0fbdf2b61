//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Accepted range for `--segment-duration`, in whole seconds
fn segment_duration_range(s: &str) -> Result<u32, String> {
    clap_num::number_range(s, 1, 86_400)
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Input video file path
    #[arg(short, long = "in", value_name = "FILE")]
    pub input: PathBuf,

    /// Segment length in seconds
    #[arg(long, value_parser = segment_duration_range)]
    pub segment_duration: Option<u32>,
}

/// Arguments for the split command
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Input video file path
    #[arg(short, long = "in", value_name = "FILE")]
    pub input: PathBuf,

    /// Directory the segments are written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub out: PathBuf,

    /// Segment length in seconds
    #[arg(long, value_parser = segment_duration_range)]
    pub segment_duration: Option<u32>,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Remote job identifier
    #[arg(short, long)]
    pub job: String,

    /// Keep polling until the job completes or fails
    #[arg(short, long)]
    pub watch: bool,
}

/// Arguments for the cancel command
#[derive(Args, Debug)]
pub struct CancelArgs {
    /// Remote job identifier
    #[arg(short, long)]
    pub job: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_duration_range() {
        assert_eq!(segment_duration_range("120"), Ok(120));
        assert!(segment_duration_range("0").is_err());
        assert!(segment_duration_range("abc").is_err());
        assert!(segment_duration_range("100000").is_err());
    }
}
