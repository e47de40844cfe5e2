//! Session snapshot export (JSON).
//!
//! A snapshot records what was on screen: the manual profile, loan parameters,
//! overlaid customers and the prediction with its neighbours. Snapshots are
//! write-only; the session never reads them back.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::info;

use crate::domain::{AttributeVector, LoanParameters};
use crate::error::AppError;
use crate::estimator::Estimate;
use crate::session::Session;

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot<'a> {
    pub tool: &'static str,
    pub generated_at: DateTime<Local>,
    pub dataset: &'a str,
    pub values: AttributeVector,
    pub loan: &'a LoanParameters,
    pub selected_customers: &'a [String],
    pub show_manual: bool,
    pub estimate: &'a Estimate,
}

impl<'a> SessionSnapshot<'a> {
    pub fn new(session: &'a Session, estimate: &'a Estimate, dataset: &'a str) -> Self {
        Self {
            tool: "radar",
            generated_at: Local::now(),
            dataset,
            values: session.values,
            loan: &session.loan,
            selected_customers: &session.selected,
            show_manual: session.show_manual,
            estimate,
        }
    }
}

/// Write a snapshot into `dir`, returning the file path.
pub fn write_snapshot(dir: &Path, snapshot: &SessionSnapshot<'_>) -> Result<PathBuf, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::runtime(format!("Failed to create snapshot dir '{}': {e}", dir.display())))?;

    let ts = snapshot.generated_at.format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("radar_snapshot_{ts}.json"));

    let file = File::create(&path)
        .map_err(|e| AppError::runtime(format!("Failed to create snapshot '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, snapshot)
        .map_err(|e| AppError::runtime(format!("Failed to write snapshot JSON: {e}")))?;

    info!(path = %path.display(), "session snapshot written");
    Ok(path)
}
