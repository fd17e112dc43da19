//! Logging setup for binaries.
//!
//! The library only emits `tracing` events (targets `text_focuser.*`). A
//! terminal UI owns stdout, so binaries log to a file through a
//! non-blocking writer filtered by `RUST_LOG`.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;

/// Install a global subscriber writing to `dir/file_name`, replacing any
/// previous log file. Returns the writer guard; keep it alive until exit.
/// Returns `None` when a global subscriber is already installed.
pub fn init_file_logging(dir: &Path, file_name: &str) -> Option<WorkerGuard> {
    let log_path = dir.join(file_name);
    if log_path.exists() {
        if let Err(e) = std::fs::remove_file(&log_path) {
            tracing::warn!(
                target: "text_focuser.logging",
                path = %log_path.display(),
                error = %e,
                "could not remove previous log file"
            );
        }
    }

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Some(guard),
        // Already installed; dropping the guard shuts the writer down.
        Err(_) => None,
    }
}
