//! CSV ingest for the reference dataset.
//!
//! This module turns a loan-approval CSV into validated `ReferenceRecord`s.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (rows keep file order; ties in the estimator
//!   depend on it)

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{Decision, ReferenceRecord, ReferenceSet};
use crate::error::AppError;

/// Columns every dataset must provide.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "customer_id",
    "credit_score",
    "annual_income",
    "current_debt",
    "years_employed",
    "savings_assets",
    "debt_to_income_ratio",
    "product_type",
    "loan_intent",
    "loan_amount",
    "loan_status",
];

/// Summary stats about the rows actually loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetStats {
    pub n_records: usize,
    pub n_approved: usize,
    pub n_product_types: usize,
    pub n_loan_intents: usize,
}

impl DatasetStats {
    pub fn approval_rate(&self) -> f64 {
        if self.n_records == 0 {
            return 0.0;
        }
        self.n_approved as f64 / self.n_records as f64
    }
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Ingest output: records + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: ReferenceSet,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load the reference dataset from a CSV file.
pub fn load_reference_csv(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_reference_csv(file)
}

/// Parse the reference dataset from any reader (file, HTTP body, test string).
pub fn read_reference_csv<R: Read>(input: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header line, then 1-based line numbers.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(row) => records.push(row),
            Err(message) => row_errors.push(RowError {
                line,
                id: get_optional(&record, &header_map, "customer_id").map(str::to_string),
                message,
            }),
        }
    }

    let rows_used = records.len();
    if rows_used == 0 {
        return Err(AppError::data("No valid rows in the reference dataset."));
    }

    let records = ReferenceSet::new(records);
    let stats = compute_stats(&records);

    Ok(IngestedData {
        records,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !header_map.contains_key(*c))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::input(format!(
        "Missing required column(s): {}",
        missing
            .iter()
            .map(|c| format!("`{c}`"))
            .collect::<Vec<_>>()
            .join(", ")
    )))
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<ReferenceRecord, String> {
    let customer_id = get_required(record, header_map, "customer_id")?.to_string();

    let status_raw = get_required(record, header_map, "loan_status")?;
    let outcome = parse_status(status_raw)
        .ok_or_else(|| format!("Invalid `loan_status` '{status_raw}' (expected 0 or 1)."))?;

    Ok(ReferenceRecord {
        customer_id,
        credit_score: get_f64(record, header_map, "credit_score")?,
        annual_income: get_f64(record, header_map, "annual_income")?,
        current_debt: get_f64(record, header_map, "current_debt")?,
        years_employed: get_f64(record, header_map, "years_employed")?,
        savings_assets: get_f64(record, header_map, "savings_assets")?,
        debt_to_income_ratio: get_f64(record, header_map, "debt_to_income_ratio")?,
        product_type: get_required(record, header_map, "product_type")?.to_string(),
        loan_intent: get_required(record, header_map, "loan_intent")?.to_string(),
        loan_amount: get_f64(record, header_map, "loan_amount")?,
        interest_rate: parse_opt_f64(get_optional(record, header_map, "interest_rate")),
        outcome,
    })
}

/// Status codes are integers; tolerate `1.0`-style exports.
fn parse_status(raw: &str) -> Option<Decision> {
    let code = match raw.parse::<i64>() {
        Ok(code) => code,
        Err(_) => {
            let v = raw.parse::<f64>().ok()?;
            if v.fract() != 0.0 {
                return None;
            }
            v as i64
        }
    };
    Decision::from_status_code(code)
}

/// Summary stats for an in-memory reference set.
pub fn compute_stats(records: &ReferenceSet) -> DatasetStats {
    DatasetStats {
        n_records: records.len(),
        n_approved: records.records().iter().filter(|r| r.outcome.is_approved()).count(),
        n_product_types: records.product_types().len(),
        n_loan_intents: records.loan_intents().len(),
    }
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn get_f64(record: &StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Result<f64, String> {
    let raw = get_required(record, header_map, name)?;
    parse_opt_f64(Some(raw)).ok_or_else(|| format!("Invalid `{name}` value '{raw}'."))
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let s = s?;
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
