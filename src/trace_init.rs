use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "oiltype.log";

/// Install a file-backed subscriber. The terminal belongs to the trainer, so
/// nothing is written to stdout/stderr. Keep the guard alive until exit or
/// buffered lines are lost.
pub fn init_tracing(log_dir: &Path) -> Option<WorkerGuard> {
    std::fs::create_dir_all(log_dir).ok()?;

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("oiltype=info")),
        )
        .try_init()
        .ok()?;

    Some(guard)
}
