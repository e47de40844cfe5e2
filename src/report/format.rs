//! Text formatting for values, predictions and customer details.
//!
//! Shared by the TUI widgets and the one-shot CLI commands, so both front-ends
//! display numbers the same way.

use crate::domain::{AXES, AttributeVector, AxisId, LoanParameters, ReferenceRecord, ValueFormat};
use crate::estimator::Estimate;
use crate::io::ingest::DatasetStats;

pub const APPROVED_LABEL: &str = "✓ Likely to be APPROVED";
pub const REJECTED_LABEL: &str = "✗ Likely to be REJECTED";

/// Format an axis value for display.
pub fn format_value(value: f64, axis: AxisId) -> String {
    match axis.axis().format {
        ValueFormat::Currency => format_currency(value),
        ValueFormat::Years => format!("{value:.1}"),
        ValueFormat::Percent => format!("{value:.1}%"),
        ValueFormat::Plain => format!("{value}"),
    }
}

/// `$` plus whole dollars with thousands separators.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(rounded.abs() as u64))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn prediction_label(estimate: &Estimate) -> &'static str {
    if estimate.decision.is_approved() {
        APPROVED_LABEL
    } else {
        REJECTED_LABEL
    }
}

/// Horizontal probability bar, `width` cells wide.
pub fn probability_bar(probability: f64, width: usize) -> String {
    let p = if probability.is_finite() { probability.clamp(0.0, 1.0) } else { 0.0 };
    let filled = (p * width as f64).round() as usize;
    let mut out = "█".repeat(filled);
    out.push_str(&"░".repeat(width - filled));
    out
}

/// Per-axis tags for a reference customer, e.g. `Credit Score: 712`.
pub fn customer_tags(record: &ReferenceRecord) -> Vec<String> {
    AXES.iter()
        .map(|axis| format!("{}: {}", axis.name, format_value(record.axis_value(axis.id), axis.id)))
        .collect()
}

/// Detail lines shown when a selected customer is expanded.
pub fn customer_details(record: &ReferenceRecord) -> Vec<String> {
    let rate = record
        .interest_rate
        .map(|r| format!("{r:.2}%"))
        .unwrap_or_else(|| "n/a".to_string());
    vec![
        format!("Status: {}", record.outcome.display_name()),
        format!("Product Type: {}", record.product_type),
        format!("Loan Intent: {}", record.loan_intent),
        format!("Loan Amount: {}", format_currency(record.loan_amount)),
        format!("Interest Rate: {rate}"),
    ]
}

/// Full text report for `radar predict`.
pub fn format_prediction_report(
    values: &AttributeVector,
    loan: &LoanParameters,
    estimate: &Estimate,
    stats: &DatasetStats,
    show_neighbors: bool,
) -> String {
    let mut out = String::new();

    out.push_str("=== radar - Loan Approval Estimate ===\n");
    out.push_str(&format!(
        "Dataset: n={} | approved={:.1}% | products={} | intents={}\n",
        stats.n_records,
        stats.approval_rate() * 100.0,
        stats.n_product_types,
        stats.n_loan_intents,
    ));

    out.push_str("\nApplicant:\n");
    for (axis, value) in values.iter() {
        out.push_str(&format!("  {:<15} {}\n", axis.axis().name, format_value(value, axis)));
    }
    out.push_str(&format!(
        "  {:<15} {} / {} / {}\n",
        "Loan",
        loan.product_type,
        loan.loan_intent,
        format_currency(loan.loan_amount)
    ));

    out.push_str(&format!(
        "\nApproval: {}% {}\n",
        estimate.percentage(),
        probability_bar(estimate.probability, 20)
    ));
    out.push_str(prediction_label(estimate));
    out.push('\n');
    out.push_str(&format!("k={} | candidates={}", estimate.k, estimate.candidates));
    if estimate.fallback {
        out.push_str(" (no rows matched the loan parameters; used all rows)");
    }
    out.push('\n');

    if show_neighbors && !estimate.neighbors.is_empty() {
        out.push_str("\nNearest neighbours:\n");
        out.push_str(&format!("{:>3}  {:<16} {:>9}  {}\n", "#", "Customer", "Distance", "Outcome"));
        for (i, n) in estimate.neighbors.iter().enumerate() {
            out.push_str(&format!(
                "{:>3}  {:<16} {:>9.4}  {}\n",
                i + 1,
                n.customer_id,
                n.distance,
                n.outcome.display_name()
            ));
        }
    }

    out
}

/// Text block for `radar customer <ID>`.
pub fn format_customer(record: &ReferenceRecord) -> String {
    let mut out = format!("Customer {}\n", record.customer_id);
    for line in customer_details(record) {
        out.push_str(&format!("  {line}\n"));
    }
    for tag in customer_tags(record) {
        out.push_str(&format!("  {tag}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Decision;
    use crate::estimator::KnnEstimator;

    fn record() -> ReferenceRecord {
        ReferenceRecord {
            customer_id: "CUST-42".to_string(),
            credit_score: 712.0,
            annual_income: 64_000.0,
            current_debt: 12_500.0,
            years_employed: 4.5,
            savings_assets: 9_000.0,
            debt_to_income_ratio: 0.318,
            product_type: "Personal Loan".to_string(),
            loan_intent: "Medical".to_string(),
            loan_amount: 22_000.0,
            interest_rate: Some(11.5),
            outcome: Decision::Rejected,
        }
    }

    #[test]
    fn values_format_per_axis() {
        assert_eq!(format_value(75_000.0, AxisId::AnnualIncome), "$75,000");
        assert_eq!(format_value(0.0, AxisId::CurrentDebt), "$0");
        assert_eq!(format_value(5.0, AxisId::YearsEmployed), "5.0");
        assert_eq!(format_value(40.0, AxisId::DtiRatio), "40.0%");
        assert_eq!(format_value(650.0, AxisId::CreditScore), "650");
        assert_eq!(format_currency(1_234_567.0), "$1,234,567");
        assert_eq!(format_currency(999.4), "$999");
    }

    #[test]
    fn details_and_tags() {
        let r = record();
        let details = customer_details(&r);
        assert_eq!(details[0], "Status: Rejected");
        assert_eq!(details[3], "Loan Amount: $22,000");
        assert_eq!(details[4], "Interest Rate: 11.50%");

        let tags = customer_tags(&r);
        assert_eq!(tags.len(), 6);
        assert_eq!(tags[0], "Credit Score: 712");
        assert_eq!(tags[5], "DTI Ratio: 31.8%");
    }

    #[test]
    fn bar_width_is_fixed() {
        assert_eq!(probability_bar(0.5, 10).chars().count(), 10);
        assert_eq!(probability_bar(1.0, 4), "████");
        assert_eq!(probability_bar(f64::NAN, 3), "░░░");
    }

    #[test]
    fn neutral_report_reads_approved() {
        let estimate = KnnEstimator::default().estimate(&[], &AttributeVector::DEFAULT, &LoanParameters::default());
        let text = format_prediction_report(
            &AttributeVector::DEFAULT,
            &LoanParameters::default(),
            &estimate,
            &DatasetStats::default(),
            true,
        );
        assert!(text.contains("Approval: 50%"));
        assert!(text.contains(APPROVED_LABEL));
        assert!(text.contains("Credit Card / Business / $50,000"));
    }
}
