// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod http_jobs;
pub mod probe_ffprobe;
#[cfg(feature = "libav")]
pub mod probe_libav;
pub mod toml_config;

// Re-export adapters
pub use exec_ffmpeg::{FFmpegRuntime, FFmpegRuntimeFactory};
pub use http_jobs::HttpJobAdapter;
pub use probe_ffprobe::FFprobeAdapter;
#[cfg(feature = "libav")]
pub use probe_libav::ProbeLibavAdapter;
pub use toml_config::{SplitterConfig, TomlConfigAdapter};
