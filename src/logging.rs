//! Tracing subscriber setup
//!
//! Logs go to stderr by default, or to a file through a non-blocking
//! appender. `RUST_LOG` controls filtering (default `info`).

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Output format of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// When `log_file` is given, the returned guard must be kept alive for the
/// lifetime of the program so buffered lines are flushed.
pub fn init(log_file: Option<&Path>, format: LogFormat) -> anyhow::Result<Option<WorkerGuard>> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter());

    let Some(log_file) = log_file else {
        let installed = match format {
            LogFormat::Text => builder.with_writer(std::io::stderr).try_init(),
            LogFormat::Json => builder.json().with_writer(std::io::stderr).try_init(),
        };
        installed.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;
        return Ok(None);
    };

    if let Some(dir) = log_file.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let file_name = log_file
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid log file path: {:?}", log_file))?;
    let directory = log_file.parent().unwrap_or_else(|| Path::new("."));

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let installed = match format {
        LogFormat::Text => builder.with_ansi(false).with_writer(writer).try_init(),
        LogFormat::Json => builder.json().with_writer(writer).try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(Some(guard))
}
