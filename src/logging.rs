use std::path::PathBuf;

use anyhow::{Context, Result};
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};

use crate::config::LoggingConfig;

const LOG_BASENAME: &str = "gamedeals-tui";
const ROTATE_BYTES: u64 = 2 * 1024 * 1024;
const KEEP_FILES: usize = 5;

/// Where log files go. Falls back to the temp dir when no cache dir exists.
pub fn log_directory(cfg: &LoggingConfig) -> PathBuf {
    cfg.directory
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("gamedeals-tui").join("logs"))
}

/// Starts file logging. The terminal belongs to the TUI, so nothing is
/// written to stdout or stderr. `RUST_LOG` wins over the configured level.
/// The returned handle must be kept alive to flush on exit.
pub fn init(cfg: &LoggingConfig) -> Result<LoggerHandle> {
    let directory = log_directory(cfg);
    let level = if cfg.level.trim().is_empty() {
        "info"
    } else {
        cfg.level.trim()
    };

    Logger::try_with_env_or_str(level)
        .with_context(|| format!("invalid log level {level:?}"))?
        .log_to_file(FileSpec::default().directory(&directory).basename(LOG_BASENAME))
        .rotate(
            Criterion::Size(ROTATE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .with_context(|| format!("Failed to start logging in {}", directory.display()))
}
