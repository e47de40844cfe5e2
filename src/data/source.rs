//! Where the reference dataset comes from.
//!
//! The dataset is a static CSV: either a local file or a plain HTTP(S) URL.
//! The TUI loads it once on a background thread; CLI commands load it inline.

use std::fmt;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::error::AppError;
use crate::io::ingest::{IngestedData, load_reference_csv, read_reference_csv};

/// Default dataset location, relative to the working directory.
pub const DEFAULT_DATASET: &str = "data/Loan_approval_data_2025.csv";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Number of row errors echoed to the log before summarizing.
const LOGGED_ROW_ERRORS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    /// Interpret a path-or-URL string.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Url(raw.to_string())
        } else {
            DataSource::File(PathBuf::from(raw))
        }
    }
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::File(PathBuf::from(DEFAULT_DATASET))
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Load and validate the reference dataset.
pub fn load_reference_set(source: &DataSource) -> Result<IngestedData, AppError> {
    let data = match source {
        DataSource::File(path) => load_reference_csv(path)?,
        DataSource::Url(url) => fetch_reference_csv(url)?,
    };

    info!(
        source = %source,
        rows_read = data.rows_read,
        rows_used = data.rows_used,
        approval_rate = data.stats.approval_rate(),
        "reference dataset loaded"
    );
    for e in data.row_errors.iter().take(LOGGED_ROW_ERRORS) {
        warn!(line = e.line, id = e.id.as_deref().unwrap_or("-"), "skipped row: {}", e.message);
    }
    if data.row_errors.len() > LOGGED_ROW_ERRORS {
        warn!("{} more rows skipped", data.row_errors.len() - LOGGED_ROW_ERRORS);
    }

    Ok(data)
}

/// Start a one-shot background load. The receiver yields exactly one result.
pub fn spawn_loader(source: DataSource) -> Receiver<Result<IngestedData, AppError>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = load_reference_set(&source);
        // The UI may already be gone; nothing to do then.
        let _ = tx.send(result);
    });
    rx
}

fn fetch_reference_csv(url: &str) -> Result<IngestedData, AppError> {
    let client = Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| AppError::runtime(format!("Failed to build HTTP client: {e}")))?;

    let resp = client
        .get(url)
        .send()
        .map_err(|e| AppError::input(format!("Failed to fetch dataset '{url}': {e}")))?;

    if !resp.status().is_success() {
        return Err(AppError::input(format!(
            "Dataset request failed ({}) for '{url}'.",
            resp.status()
        )));
    }

    let body = resp
        .bytes()
        .map_err(|e| AppError::input(format!("Failed to read dataset body: {e}")))?;
    read_reference_csv(body.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_distinguishes_urls_from_paths() {
        assert_eq!(
            DataSource::parse("https://example.org/loans.csv"),
            DataSource::Url("https://example.org/loans.csv".to_string())
        );
        assert_eq!(
            DataSource::parse(" data/loans.csv "),
            DataSource::File(PathBuf::from("data/loans.csv"))
        );
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let source = DataSource::File(PathBuf::from("definitely/not/here.csv"));
        let err = load_reference_set(&source).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn background_loader_reports_once() {
        let rx = spawn_loader(DataSource::File(PathBuf::from("definitely/not/here.csv")));
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(result.is_err());
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }
}
