use std::fmt;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

use crate::config::Settings;

/// Where log lines may go for the running front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// One-shot commands: stderr, or the log file when configured.
    Console,
    /// Full-screen TUI: the log file only; silent without one.
    FileOnly,
}

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    LogFile { path: PathBuf, source: std::io::Error },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(f, "invalid log level/filter '{value}': unable to build EnvFilter")
            }
            TelemetryError::LogFile { path, source } => {
                write!(f, "failed to open log file '{}': {source}", path.display())
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::LogFile { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `RADAR_LOG`. Returns `Ok(false)` when logging stays off
/// (TUI without a log file).
pub fn init(settings: &Settings, target: LogTarget) -> Result<bool, TelemetryError> {
    if target == LogTarget::FileOnly && settings.log_file.is_none() {
        return Ok(false);
    }

    let env_filter = build_filter(&settings.log_level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact();

    match &settings.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| TelemetryError::LogFile {
                    path: path.clone(),
                    source,
                })?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(TelemetryError::Subscriber)?;
        }
        None => {
            builder
                .with_ansi(false)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(TelemetryError::Subscriber)?;
        }
    }
    Ok(true)
}

fn build_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level).map_err(|source| TelemetryError::EnvFilter {
            value: level.to_string(),
            source,
        }),
    }
}
