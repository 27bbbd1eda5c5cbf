//! File logging. The terminal belongs to the UI, so logs never go to stderr.

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const LOG_FILE_NAME: &str = "pokedex.log";
pub const DEFAULT_FILTER: &str = "pokedex=info";

/// Filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a subscriber writing to `<logs_dir>/pokedex.log`.
///
/// Logging stays off when no directory is given. The returned guard must be
/// held until exit so buffered lines are flushed.
pub fn init_logger(logs_dir: Option<&Path>) -> io::Result<Option<WorkerGuard>> {
    let Some(dir) = logs_dir else {
        return Ok(None);
    };
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .with_filter(env_filter());
    tracing_subscriber::registry()
        .with(file_layer)
        .try_init()
        .map_err(|err| io::Error::other(format!("failed to install logger: {err}")))?;
    Ok(Some(guard))
}
