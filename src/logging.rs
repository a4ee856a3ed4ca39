use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use snafu::{ResultExt, Snafu};
use tracing::Dispatch;
use tracing_subscriber::{fmt, prelude::*, registry};

use crate::application::LogOptions;
use crate::application::data::LogLevel;

/// Builds the dispatcher for a run: compact records on stdout and, when a
/// log file is configured, full records appended to it.
pub fn build_dispatch(options: &LogOptions) -> Result<Dispatch, LoggingError> {
    if options.level == LogLevel::Silent {
        return Ok(Dispatch::none());
    }

    let stdout_layer = fmt::layer()
        .with_ansi(supports_color::on(supports_color::Stream::Stdout).is_some())
        .with_target(false)
        .compact();

    let file_layer = match &options.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .context(OpenLogFileSnafu { path: path.clone() })?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let subscriber = registry()
        .with(options.level.to_level_filter())
        .with(stdout_layer)
        .with(file_layer);

    Ok(Dispatch::new(subscriber))
}

#[derive(Debug, Snafu)]
pub enum LoggingError {
    #[snafu(display("Failed to open log file {}", path.display()))]
    OpenLogFileError {
        path: PathBuf,
        source: std::io::Error,
    },
}
