use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/opal.log";

/// Default filter when `TRACING_LEVEL` is unset: opal's own crates only.
const DEFAULT_FILTER: &str = "opal=info,opal_core=info";

/// Stdout plus an append-only log file. The returned guard flushes the file
/// writer and must live until the process exits.
pub fn init_logger() -> WorkerGuard {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    let filter_layer = EnvFilter::new(filter);

    let log_file = PathBuf::from(
        env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string()),
    );
    let (log_dir, file_name) = split_log_path(&log_file);
    let dir_error = fs::create_dir_all(&log_dir).err();

    let file_appender = tracing_appender::rolling::never(&log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .pretty()
                .with_file(false)
                .with_target(false)
                .without_time()
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_ansi(false),
        )
        .with(filter_layer)
        .init();

    match dir_error {
        Some(err) => warn!("Cannot create log directory {}: {}", log_dir.display(), err),
        None => debug!("Logging to {}", log_file.display()),
    }

    guard
}

/// Directory and file name of the log path; a bare name logs to `.`.
fn split_log_path(path: &Path) -> (PathBuf, String) {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "opal.log".to_string());
    (dir, name)
}
