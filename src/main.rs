//! SplitX CLI Video Splitter
//!
//! Cuts a long video into fixed-length parts. Small files are split locally
//! with ffmpeg stream copy; large ones go through the remote job service.
//!
//! # Usage
//!
//! ```bash
//! splitter plan --in lecture.mp4
//! splitter split --in lecture.mp4 --out parts/
//! splitter status --job 3f2a --watch
//! splitter cancel --job 3f2a
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use splitx_cli::cli::{commands, Cli, Commands};
use splitx_cli::config_initialization::initialize_configuration_hierarchy;
use splitx_cli::utils::logging::{init_logging, LogLevel, LoggingConfig};
use splitx_cli::DefaultAppContainer;

/// Main entry point for the SplitX CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = initialize_configuration_hierarchy(&cli.overrides())?;
    init_logging(&LoggingConfig {
        level: config.log_level.parse::<LogLevel>()?,
        format: cli.log_format,
        target: false,
    })?;

    info!("Starting SplitX CLI Video Splitter");
    let container = DefaultAppContainer::from_config(&config)?;

    let result = match cli.command {
        Commands::Plan(args) => commands::plan(&container, args, cli.json).await,
        Commands::Split(args) => commands::split(&container, args, cli.json).await,
        Commands::Status(args) => commands::status(&container, args, cli.json).await,
        Commands::Cancel(args) => commands::cancel(&container, args, cli.json).await,
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}
