//! Export reference records to CSV.
//!
//! The output uses the ingest schema, so an exported file can be loaded back
//! as a reference dataset (this is how synthetic demo datasets are produced).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::ReferenceRecord;
use crate::error::AppError;

const HEADER: [&str; 13] = [
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
    "interest_rate",
    "loan_status",
    "source",
];

/// Write records to a CSV file.
pub fn write_reference_csv(path: &Path, records: &[ReferenceRecord], source: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::input(format!("Failed to create '{}': {e}", parent.display())))?;
    }
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_reference_records(file, records, source)
}

/// Write records as CSV to any writer.
pub fn write_reference_records<W: Write>(out: W, records: &[ReferenceRecord], source: &str) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);

    writer
        .write_record(HEADER)
        .map_err(|e| AppError::input(format!("Failed to write export CSV header: {e}")))?;

    for r in records {
        writer
            .write_record([
                r.customer_id.clone(),
                format!("{:.0}", r.credit_score),
                format!("{:.0}", r.annual_income),
                format!("{:.0}", r.current_debt),
                format!("{:.1}", r.years_employed),
                format!("{:.0}", r.savings_assets),
                format!("{:.3}", r.debt_to_income_ratio),
                r.product_type.clone(),
                r.loan_intent.clone(),
                format!("{:.0}", r.loan_amount),
                r.interest_rate.map(|v| format!("{v:.2}")).unwrap_or_default(),
                r.outcome.status_code().to_string(),
                source.to_string(),
            ])
            .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
