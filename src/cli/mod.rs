//! CLI module for SplitX
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config_initialization::ConfigOverrides;
use crate::utils::logging::LogFormat;

pub mod args;
pub mod commands;

/// SplitX CLI Video Splitter
///
/// Splits long videos into fixed-length segments, locally with stream copy
/// or through a remote job service for large files.
#[derive(Parser, Debug)]
#[command(name = "splitter")]
#[command(about = "SplitX CLI Video Splitter - Cut long videos into fixed-length segments")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (overrides configuration)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    /// Configuration file (default: splitter.toml, config/splitter.toml)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Remote job service base URL
    #[arg(long, value_name = "URL", global = true)]
    pub service_url: Option<String>,

    /// ffmpeg binary used for local splitting
    #[arg(long, value_name = "PATH", global = true)]
    pub ffmpeg: Option<PathBuf>,

    /// ffprobe binary used for duration probing
    #[arg(long, value_name = "PATH", global = true)]
    pub ffprobe: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show how a file would be split
    Plan(args::PlanArgs),
    /// Split a file and write every segment
    Split(args::SplitArgs),
    /// Query a remote job
    Status(args::StatusArgs),
    /// Cancel a remote job
    Cancel(args::CancelArgs),
}

impl Cli {
    /// Command-line configuration overrides
    pub fn overrides(&self) -> ConfigOverrides {
        let segment_duration = match &self.command {
            Commands::Plan(args) => args.segment_duration,
            Commands::Split(args) => args.segment_duration,
            _ => None,
        };

        ConfigOverrides {
            config_path: self.config.clone(),
            service_url: self.service_url.clone(),
            segment_duration_secs: segment_duration.map(f64::from),
            ffmpeg_path: self.ffmpeg.clone(),
            ffprobe_path: self.ffprobe.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_split_overrides() {
        let cli = Cli::parse_from([
            "splitter",
            "--service-url",
            "http://jobs:9000",
            "split",
            "--in",
            "talk.mp4",
            "--segment-duration",
            "60",
        ]);
        let overrides = cli.overrides();
        assert_eq!(overrides.service_url.as_deref(), Some("http://jobs:9000"));
        assert_eq!(overrides.segment_duration_secs, Some(60.0));
        match cli.command {
            Commands::Split(args) => assert_eq!(args.out, PathBuf::from(".")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["splitter", "status", "--job", "abc", "--json"]);
        assert!(cli.json);
        assert_eq!(cli.overrides().segment_duration_secs, None);
    }
}
