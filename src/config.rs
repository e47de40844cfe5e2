//! Runtime settings from the environment (`.env` supported).
//!
//! Variables:
//! - `RADAR_DATA`: dataset path or `http(s)://` URL
//! - `RADAR_LOG`: tracing filter used when `RUST_LOG` is unset (default `info`)
//! - `RADAR_LOG_FILE`: log file; required for the TUI to log at all
//! - `RADAR_K`: neighbour count (default 15)
//!
//! CLI flags override these values in `app`.

use std::path::PathBuf;

use crate::data::DataSource;
use crate::domain::DEFAULT_K;
use crate::error::AppError;

pub const ENV_DATA: &str = "RADAR_DATA";
pub const ENV_LOG: &str = "RADAR_LOG";
pub const ENV_LOG_FILE: &str = "RADAR_LOG_FILE";
pub const ENV_K: &str = "RADAR_K";

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data: DataSource,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub k: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data: DataSource::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: None,
            k: DEFAULT_K,
        }
    }
}

impl Settings {
    /// Load `.env` (if present) and read settings from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut settings = Settings::default();
        if let Some(raw) = get(ENV_DATA) {
            settings.data = DataSource::parse(&raw);
        }
        if let Some(level) = get(ENV_LOG) {
            settings.log_level = level;
        }
        settings.log_file = get(ENV_LOG_FILE).map(PathBuf::from);
        if let Some(raw) = get(ENV_K) {
            settings.k = parse_k(&raw)?;
        }
        Ok(settings)
    }
}

fn parse_k(raw: &str) -> Result<usize, AppError> {
    match raw.parse::<usize>() {
        Ok(k) if k > 0 => Ok(k),
        _ => Err(AppError::input(format!(
            "Invalid {ENV_K} '{raw}' (expected a positive integer)."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.k, 15);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn reads_all_variables() {
        let settings = Settings::from_lookup(lookup(&[
            (ENV_DATA, "https://example.org/loans.csv"),
            (ENV_LOG, "debug"),
            (ENV_LOG_FILE, "/tmp/radar.log"),
            (ENV_K, "7"),
        ]))
        .unwrap();
        assert_eq!(settings.data, DataSource::Url("https://example.org/loans.csv".into()));
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.log_file, Some(PathBuf::from("/tmp/radar.log")));
        assert_eq!(settings.k, 7);
    }

    #[test]
    fn blank_values_are_ignored() {
        let settings = Settings::from_lookup(lookup(&[(ENV_LOG, "  "), (ENV_LOG_FILE, "")])).unwrap();
        assert_eq!(settings.log_level, "info");
        assert!(settings.log_file.is_none());
    }

    #[test]
    fn invalid_k_is_an_input_error() {
        for raw in ["0", "-3", "many"] {
            let err = Settings::from_lookup(lookup(&[(ENV_K, raw)])).unwrap_err();
            assert_eq!(err.exit_code(), 2);
        }
    }
}
