// Diagnostic side channel: stderr plus an append-only log file

use anyhow::{Context, Result};
use std::io;
use std::path::Path;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{self, RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// `RUST_LOG` when set, otherwise `level`; an unparsable filter falls back to `warn`
fn log_filter(level: &str) -> EnvFilter {
    let directive = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => v,
        _ => level.to_string(),
    };
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn open_log_file(path: &Path) -> Result<RollingFileAppender, String> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| format!("{} is not a file path", path.display()))?;
    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    rolling::Builder::new()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .map_err(|err| err.to_string())
}

/// Install the global subscriber.
///
/// Logs go to stderr and, when it can be opened, to `log_file`. A log file
/// that cannot be opened only loses the file layer. Keep the returned guard
/// alive until exit so buffered lines reach the file. Fails only when a
/// global subscriber is already installed.
pub fn init(level: &str, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let mut open_error = None;
    let (file_layer, guard) = match log_file.map(open_log_file) {
        Some(Ok(appender)) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        Some(Err(err)) => {
            open_error = Some(err);
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(log_filter(level))
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    if let (Some(err), Some(path)) = (open_error, log_file) {
        warn!(path = %path.display(), error = %err, "log file unavailable, logging to stderr only");
    }
    Ok(guard)
}
