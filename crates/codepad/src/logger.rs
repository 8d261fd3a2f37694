use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_FILTER: &str = "codepad=info,codepad_core=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Path of a fresh timestamped log file under `dir`.
pub fn log_file_path(dir: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("codepad_{}.log", timestamp))
}

/// Route logs to a file while the TUI owns the terminal. Returns the file path.
pub fn init_file_logging(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;
    let path = log_file_path(dir);
    let file = File::create(&path).with_context(|| format!("creating log file {}", path.display()))?;

    let layer = fmt::layer().with_writer(Mutex::new(file)).with_ansi(false);
    let _ = tracing_subscriber::registry().with(env_filter()).with(layer).try_init();

    tracing::info!(path = %path.display(), "=== codepad log started ===");
    Ok(path)
}

/// Log to stderr for headless subcommands.
pub fn init_stderr_logging() {
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let _ = tracing_subscriber::registry().with(env_filter()).with(layer).try_init();
}
