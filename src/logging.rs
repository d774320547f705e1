//! Logging sink construction.
//!
//! The subscriber is built once at process start and handed back to `main`
//! as a guard. Console output honours `--verbose` / `RUST_LOG`; an optional
//! secondary file destination receives the full debug stream as JSON lines.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Keeps the file appender's background worker alive for the process
/// lifetime. Dropping it flushes pending log lines.
pub(crate) struct LogGuard {
    _file_worker: Option<WorkerGuard>,
}

/// Installs the global tracing subscriber.
pub(crate) fn init(verbose: bool, log_file: Option<&Path>) -> Result<LogGuard> {
    let console_filter = if verbose {
        EnvFilter::new("triad=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("triad=info"))
    };
    let console_layer = fmt::layer().with_filter(console_filter);

    let (file_layer, file_worker) = match log_file {
        Some(path) => {
            let directory = path.parent().filter(|p| !p.as_os_str().is_empty());
            if let Some(directory) = directory {
                fs::create_dir_all(directory).with_context(|| {
                    format!("Failed to create log directory: {}", directory.display())
                })?;
            }
            let file_name = path
                .file_name()
                .context("Log file path has no file name")?;
            let appender = tracing_appender::rolling::never(
                directory.unwrap_or_else(|| Path::new(".")),
                file_name,
            );
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new("triad=debug"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(LogGuard {
        _file_worker: file_worker,
    })
}
