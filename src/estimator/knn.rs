//! k-nearest-neighbours approval estimator.
//!
//! Workflow per query:
//! 1) keep reference rows with the same product type and loan intent
//!    (all rows when nothing matches)
//! 2) normalize query and rows into the 7-D feature space (unclamped, so
//!    rows beyond an axis range stay distinguishable)
//! 3) stable-sort by Euclidean distance and keep the first `k`
//! 4) probability = approved neighbours / `k`
//!
//! The divisor is the nominal `k`, not the number of neighbours actually found,
//! so small candidate pools pull the probability towards zero.

use serde::Serialize;
use tracing::debug;

use crate::domain::{
    AttributeVector, DEFAULT_K, Decision, LoanParameters, NEUTRAL_PROBABILITY, ReferenceRecord,
};
use crate::estimator::distance::euclidean;
use crate::geometry::feature_vector;

/// One selected neighbour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub customer_id: String,
    pub distance: f64,
    pub outcome: Decision,
}

/// Full estimator output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub probability: f64,
    pub decision: Decision,
    pub k: usize,
    /// Rows the neighbours were drawn from (after filtering or fallback).
    pub candidates: usize,
    /// True when no row matched the loan filter and the full set was used.
    pub fallback: bool,
    /// Nearest rows, closest first (at most `k`).
    pub neighbors: Vec<Neighbor>,
}

impl Estimate {
    fn neutral(k: usize) -> Self {
        Self {
            probability: NEUTRAL_PROBABILITY,
            decision: Decision::from_probability(NEUTRAL_PROBABILITY),
            k,
            candidates: 0,
            fallback: false,
            neighbors: Vec::new(),
        }
    }

    /// Probability as a whole percentage.
    pub fn percentage(&self) -> u8 {
        (self.probability * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Unweighted KNN classifier with a fixed neighbour count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnnEstimator {
    k: usize,
}

impl Default for KnnEstimator {
    fn default() -> Self {
        Self { k: DEFAULT_K }
    }
}

impl KnnEstimator {
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Approval probability in `[0, 1]`.
    pub fn predict(&self, records: &[ReferenceRecord], query: &AttributeVector, params: &LoanParameters) -> f64 {
        self.estimate(records, query, params).probability
    }

    /// Approval probability plus the neighbours it was computed from.
    ///
    /// An empty reference set (or `k == 0`) yields the neutral 0.5.
    pub fn estimate(&self, records: &[ReferenceRecord], query: &AttributeVector, params: &LoanParameters) -> Estimate {
        if records.is_empty() || self.k == 0 {
            return Estimate::neutral(self.k);
        }

        let filtered: Vec<&ReferenceRecord> = records.iter().filter(|r| r.matches_loan(params)).collect();
        let fallback = filtered.is_empty();
        let candidates: Vec<&ReferenceRecord> = if fallback {
            debug!(
                product_type = %params.product_type,
                loan_intent = %params.loan_intent,
                "no reference rows match loan parameters; using full set"
            );
            records.iter().collect()
        } else {
            filtered
        };

        let target = feature_vector(query.values(), params.loan_amount);
        let mut scored: Vec<Neighbor> = candidates
            .iter()
            .map(|r| Neighbor {
                customer_id: r.customer_id.clone(),
                distance: euclidean(&target, &feature_vector(&r.raw_values(), r.loan_amount)),
                outcome: r.outcome,
            })
            .collect();

        // `sort_by` is stable: equal distances keep dataset order.
        scored.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.k);

        let approved = scored.iter().filter(|n| n.outcome.is_approved()).count();
        let probability = approved as f64 / self.k as f64;

        Estimate {
            probability,
            decision: Decision::from_probability(probability),
            k: self.k,
            candidates: candidates.len(),
            fallback,
            neighbors: scored,
        }
    }
}

/// Approval probability with the default `k` (15).
pub fn predict(records: &[ReferenceRecord], query: &AttributeVector, params: &LoanParameters) -> f64 {
    KnnEstimator::default().predict(records, query, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AxisId;

    fn record(id: &str, credit: f64, product: &str, intent: &str, outcome: Decision) -> ReferenceRecord {
        ReferenceRecord {
            customer_id: id.to_string(),
            credit_score: credit,
            annual_income: 75_000.0,
            current_debt: 30_000.0,
            years_employed: 5.0,
            savings_assets: 15_000.0,
            debt_to_income_ratio: 0.40,
            product_type: product.to_string(),
            loan_intent: intent.to_string(),
            loan_amount: 50_000.0,
            interest_rate: Some(12.0),
            outcome,
        }
    }

    fn params(product: &str, intent: &str) -> LoanParameters {
        LoanParameters {
            product_type: product.to_string(),
            loan_intent: intent.to_string(),
            loan_amount: 50_000.0,
        }
    }

    #[test]
    fn empty_reference_set_is_neutral() {
        let p = predict(&[], &AttributeVector::DEFAULT, &LoanParameters::default());
        assert_eq!(p, 0.5);
    }

    #[test]
    fn zero_k_is_neutral() {
        let records = vec![record("A", 650.0, "Credit Card", "Business", Decision::Approved)];
        let p = KnnEstimator::new(0).predict(&records, &AttributeVector::DEFAULT, &LoanParameters::default());
        assert_eq!(p, 0.5);
    }

    #[test]
    fn exact_match_has_zero_distance_and_is_selected() {
        let mut records: Vec<ReferenceRecord> = (0..40)
            .map(|i| record(&format!("R{i}"), 300.0 + i as f64 * 13.0, "Credit Card", "Business", Decision::Rejected))
            .collect();
        let target = record("TARGET", 712.0, "Credit Card", "Business", Decision::Approved);
        records.insert(17, target.clone());

        let est = KnnEstimator::default().estimate(&records, &AttributeVector::new(target.raw_values()), &target.loan());
        assert_eq!(est.neighbors[0].customer_id, "TARGET");
        assert_eq!(est.neighbors[0].distance, 0.0);
        assert_eq!(est.neighbors.len(), 15);
        assert!(!est.fallback);
    }

    #[test]
    fn filter_keeps_matching_product_and_intent() {
        let records = vec![
            record("A", 650.0, "Credit Card", "Business", Decision::Approved),
            record("B", 650.0, "Personal Loan", "Business", Decision::Rejected),
            record("C", 650.0, "Credit Card", "Education", Decision::Rejected),
        ];
        let est = KnnEstimator::default().estimate(&records, &AttributeVector::DEFAULT, &params("Credit Card", "Business"));
        assert_eq!(est.candidates, 1);
        assert_eq!(est.neighbors.len(), 1);
        assert_eq!(est.neighbors[0].customer_id, "A");
    }

    #[test]
    fn unmatched_filter_falls_back_to_full_set() {
        let records: Vec<ReferenceRecord> = (0..20)
            .map(|i| {
                let outcome = if i % 2 == 0 { Decision::Approved } else { Decision::Rejected };
                record(&format!("R{i}"), 400.0 + i as f64 * 20.0, "Credit Card", "Business", outcome)
            })
            .collect();
        let est = KnnEstimator::default().estimate(&records, &AttributeVector::DEFAULT, &params("Mortgage", "Home Improvement"));
        assert!(est.fallback);
        assert_eq!(est.candidates, 20);
        assert!((0.0..=1.0).contains(&est.probability));
    }

    #[test]
    fn probability_divides_by_nominal_k() {
        // Only 3 candidates, all approved: 3 / 15, not 3 / 3.
        let records: Vec<ReferenceRecord> = (0..3)
            .map(|i| record(&format!("R{i}"), 600.0 + i as f64, "Credit Card", "Business", Decision::Approved))
            .collect();
        let est = KnnEstimator::default().estimate(&records, &AttributeVector::DEFAULT, &LoanParameters::default());
        assert!((est.probability - 3.0 / 15.0).abs() < 1e-12);
        assert_eq!(est.decision, Decision::Rejected);
    }

    #[test]
    fn majority_of_nearest_decides() {
        // Approved rows sit right at the query; rejected rows are far away.
        let mut records = Vec::new();
        for i in 0..15 {
            records.push(record(&format!("near{i}"), 650.0 + (i % 3) as f64, "Credit Card", "Business", Decision::Approved));
        }
        for i in 0..30 {
            records.push(record(&format!("far{i}"), 320.0 + i as f64, "Credit Card", "Business", Decision::Rejected));
        }
        let est = KnnEstimator::default().estimate(&records, &AttributeVector::DEFAULT, &LoanParameters::default());
        assert_eq!(est.probability, 1.0);
        assert_eq!(est.decision, Decision::Approved);
        assert_eq!(est.percentage(), 100);
        assert!(est.neighbors.iter().all(|n| n.customer_id.starts_with("near")));
    }

    #[test]
    fn ties_keep_input_order() {
        let records: Vec<ReferenceRecord> = (0..20)
            .map(|i| record(&format!("T{i:02}"), 650.0, "Credit Card", "Business", Decision::Rejected))
            .collect();
        let est = KnnEstimator::new(5).estimate(&records, &AttributeVector::DEFAULT, &LoanParameters::default());
        let ids: Vec<&str> = est.neighbors.iter().map(|n| n.customer_id.as_str()).collect();
        assert_eq!(ids, vec!["T00", "T01", "T02", "T03", "T04"]);
    }

    #[test]
    fn rows_beyond_axis_range_keep_their_distance() {
        let mut query = AttributeVector::DEFAULT;
        query.set(AxisId::AnnualIncome, 175_000.0);
        let mut far = record("FAR", 650.0, "Credit Card", "Business", Decision::Approved);
        far.annual_income = 500_000.0;
        let mut near = record("NEAR", 650.0, "Credit Card", "Business", Decision::Rejected);
        near.annual_income = 175_000.0;

        let est = KnnEstimator::new(1).estimate(&[far, near], &query, &LoanParameters::default());
        assert_eq!(est.neighbors[0].customer_id, "NEAR");
        assert_eq!(est.neighbors[0].distance, 0.0);
        assert_eq!(est.probability, 0.0);
    }

    #[test]
    fn loan_amount_above_normalization_range_is_not_saturated() {
        let mut smaller = record("SMALLER", 650.0, "Credit Card", "Business", Decision::Approved);
        smaller.loan_amount = 250_000.0;
        let mut same = record("SAME", 650.0, "Credit Card", "Business", Decision::Rejected);
        same.loan_amount = 600_000.0;
        let mut query_loan = params("Credit Card", "Business");
        query_loan.loan_amount = 600_000.0;

        let est = KnnEstimator::new(1).estimate(&[smaller, same], &AttributeVector::DEFAULT, &query_loan);
        assert_eq!(est.neighbors[0].customer_id, "SAME");
        assert_eq!(est.neighbors[0].distance, 0.0);
    }

    #[test]
    fn reference_dti_is_scaled_before_normalization() {
        // DTI 0.40 in the dataset equals 40 on the axis; the row must match the default query.
        let records = vec![record("A", 650.0, "Credit Card", "Business", Decision::Approved)];
        let mut query = AttributeVector::DEFAULT;
        query.set(AxisId::DtiRatio, 40.0);
        let est = KnnEstimator::default().estimate(&records, &query, &LoanParameters::default());
        assert!(est.neighbors[0].distance.abs() < 1e-12);
    }
}
