//! Explicit session state and the events that mutate it.
//!
//! Front-ends own *when* things happen (key presses, mouse drags, the
//! dataset arriving); this module owns *what* each event does. Everything here
//! is synchronous and free of IO, so each interaction can be unit-tested.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{
    AttributeVector, AxisId, DEFAULT_LOAN_AMOUNT, LoanParameters, MAX_RECOMMENDED_CUSTOMERS, ReferenceSet,
};
use crate::estimator::{Estimate, KnnEstimator};
use crate::geometry::{ChartGeometry, ChartPoint, constrain, constrain_and_round};

pub mod list;

pub use list::VirtualWindow;

/// Errors surfaced to the caller instead of being absorbed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Customer ID \"{0}\" not found!")]
    CustomerNotFound(String),
}

/// One user interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Live typing into an axis field: clamp only.
    ValueInput { axis: AxisId, raw: f64 },
    /// The axis field lost focus / Enter: clamp and round.
    ValueCommit { axis: AxisId, raw: f64 },
    /// A handle was dragged to `cursor` (chart space).
    Drag { axis: AxisId, cursor: ChartPoint },
    ProductType(String),
    LoanIntent(String),
    /// Live typing into the loan amount; unparsable text counts as 0.
    LoanAmountInput(String),
    /// Loan amount committed; unparsable text or zero resets to the default amount.
    LoanAmountCommit(String),
    ToggleCustomer(String),
    /// Search box submit: add a customer by id (case-insensitive).
    AddCustomer(String),
    ClearAll,
    ToggleManualData,
    ToggleExpanded(String),
}

/// Everything the presentation layer needs to draw a frame.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub values: AttributeVector,
    pub loan: LoanParameters,
    /// Selected customer ids; position is the color index.
    pub selected: Vec<String>,
    #[serde(skip)]
    pub expanded: HashSet<String>,
    pub show_manual: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            values: AttributeVector::DEFAULT,
            loan: LoanParameters::default(),
            selected: Vec::new(),
            expanded: HashSet::new(),
            show_manual: true,
        }
    }
}

impl Session {
    /// Apply one event. Returns whether anything changed.
    pub fn apply(&mut self, event: SessionEvent, refs: &ReferenceSet, geometry: &ChartGeometry) -> Result<bool, SessionError> {
        let changed = match event {
            SessionEvent::ValueInput { axis, raw } => self.store_value(axis, raw, constrain),
            SessionEvent::ValueCommit { axis, raw } => self.store_value(axis, raw, constrain_and_round),
            SessionEvent::Drag { axis, cursor } => {
                if !self.handles_enabled() {
                    return Ok(false);
                }
                let raw = geometry.from_point(axis, cursor);
                self.store_value(axis, raw, constrain_and_round)
            }
            SessionEvent::ProductType(value) => replace(&mut self.loan.product_type, value),
            SessionEvent::LoanIntent(value) => replace(&mut self.loan.loan_intent, value),
            SessionEvent::LoanAmountInput(text) => self.store_amount(parse_amount(&text).unwrap_or(0.0)),
            SessionEvent::LoanAmountCommit(text) => {
                self.store_amount(parse_amount(&text).unwrap_or(DEFAULT_LOAN_AMOUNT))
            }
            SessionEvent::ToggleCustomer(id) => {
                self.toggle_customer(&id);
                true
            }
            SessionEvent::AddCustomer(query) => self.add_customer(refs, &query)?,
            SessionEvent::ClearAll => {
                let changed = !self.selected.is_empty();
                self.selected.clear();
                self.expanded.clear();
                changed
            }
            SessionEvent::ToggleManualData => {
                self.show_manual = !self.show_manual;
                true
            }
            SessionEvent::ToggleExpanded(id) => {
                if !self.is_selected(&id) {
                    return Ok(false);
                }
                if !self.expanded.remove(&id) {
                    self.expanded.insert(id);
                }
                true
            }
        };
        Ok(changed)
    }

    /// Drag handles are only live while no customer is selected.
    pub fn handles_enabled(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_selected(&self, customer_id: &str) -> bool {
        self.selected.iter().any(|id| id == customer_id)
    }

    /// Color index of a selected customer.
    pub fn selection_index(&self, customer_id: &str) -> Option<usize> {
        self.selected.iter().position(|id| id == customer_id)
    }

    /// Readability warning once too many customers are overlaid.
    pub fn selection_warning(&self) -> Option<String> {
        let count = self.selected.len();
        (count > MAX_RECOMMENDED_CUSTOMERS).then(|| {
            format!(
                "⚠️ {count} customers selected. Consider selecting fewer ({MAX_RECOMMENDED_CUSTOMERS} or less) for better clarity."
            )
        })
    }

    /// Current estimate for the manual profile.
    pub fn estimate(&self, refs: &ReferenceSet, estimator: &KnnEstimator) -> Estimate {
        estimator.estimate(refs.records(), &self.values, &self.loan)
    }

    fn store_value(&mut self, axis: AxisId, raw: f64, constrain_fn: fn(f64, AxisId) -> f64) -> bool {
        if raw.is_nan() {
            return false;
        }
        let value = constrain_fn(raw, axis);
        if self.values[axis] == value {
            return false;
        }
        self.values.set(axis, value);
        true
    }

    fn store_amount(&mut self, amount: f64) -> bool {
        if self.loan.loan_amount == amount {
            return false;
        }
        self.loan.loan_amount = amount;
        true
    }

    fn toggle_customer(&mut self, customer_id: &str) {
        match self.selection_index(customer_id) {
            Some(idx) => {
                self.selected.remove(idx);
                self.expanded.remove(customer_id);
            }
            None => self.selected.push(customer_id.to_string()),
        }
    }

    fn add_customer(&mut self, refs: &ReferenceSet, query: &str) -> Result<bool, SessionError> {
        let Some(record) = refs.find(query) else {
            warn!(customer_id = query.trim(), "customer lookup missed");
            return Err(SessionError::CustomerNotFound(query.trim().to_string()));
        };
        if self.is_selected(&record.customer_id) {
            return Ok(false);
        }
        debug!(customer_id = %record.customer_id, "customer selected");
        self.toggle_customer(&record.customer_id);
        Ok(true)
    }
}

fn replace(slot: &mut String, value: String) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// Parse a loan amount; accepts `$` and thousands separators.
///
/// Only the leading number counts (`"120abc"` is 120). Zero, like text
/// with no leading number, yields `None` so the caller's fallback applies.
fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != '$' && *c != ',').collect();
    let end = numeric_prefix_len(&cleaned);
    cleaned[..end]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v != 0.0)
}

/// Byte length of the longest `[+-]digits[.digits][e[+-]digits]` prefix.
fn numeric_prefix_len(s: &str) -> usize {
    let b = s.as_bytes();
    let digits = |mut i: usize| {
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = 0;
    if matches!(b.first(), Some(b'+' | b'-')) {
        i = 1;
    }
    let int_end = digits(i);
    let mut end = int_end;
    if b.get(end) == Some(&b'.') {
        let frac_end = digits(end + 1);
        if frac_end > end + 1 || int_end > i {
            end = frac_end;
        }
    }
    if end == i {
        return 0;
    }
    if matches!(b.get(end), Some(b'e' | b'E')) {
        let mut j = end + 1;
        if matches!(b.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_end = digits(j);
        if exp_end > j {
            end = exp_end;
        }
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decision, ReferenceRecord};
    use nalgebra::Point2;

    fn refs() -> ReferenceSet {
        let rows = ["CUST-001", "CUST-002", "CUST-003"]
            .iter()
            .map(|id| ReferenceRecord {
                customer_id: id.to_string(),
                credit_score: 700.0,
                annual_income: 90_000.0,
                current_debt: 20_000.0,
                years_employed: 6.0,
                savings_assets: 25_000.0,
                debt_to_income_ratio: 0.22,
                product_type: "Credit Card".to_string(),
                loan_intent: "Business".to_string(),
                loan_amount: 40_000.0,
                interest_rate: Some(9.5),
                outcome: Decision::Approved,
            })
            .collect();
        ReferenceSet::new(rows)
    }

    fn apply(session: &mut Session, event: SessionEvent) -> Result<bool, SessionError> {
        session.apply(event, &refs(), &ChartGeometry::default())
    }

    #[test]
    fn nan_input_keeps_previous_value() {
        let mut s = Session::default();
        let before = s.values;
        assert_eq!(apply(&mut s, SessionEvent::ValueInput { axis: AxisId::CreditScore, raw: f64::NAN }), Ok(false));
        assert_eq!(apply(&mut s, SessionEvent::ValueCommit { axis: AxisId::CreditScore, raw: f64::NAN }), Ok(false));
        assert_eq!(s.values, before);
    }

    #[test]
    fn typing_clamps_and_commit_rounds() {
        let mut s = Session::default();
        apply(&mut s, SessionEvent::ValueInput { axis: AxisId::AnnualIncome, raw: 76_499.0 }).unwrap();
        assert_eq!(s.values[AxisId::AnnualIncome], 76_499.0);
        apply(&mut s, SessionEvent::ValueInput { axis: AxisId::AnnualIncome, raw: 9_000_000.0 }).unwrap();
        assert_eq!(s.values[AxisId::AnnualIncome], 175_000.0);
        apply(&mut s, SessionEvent::ValueCommit { axis: AxisId::AnnualIncome, raw: 76_499.0 }).unwrap();
        assert_eq!(s.values[AxisId::AnnualIncome], 76_000.0);
    }

    #[test]
    fn drag_projects_and_rounds() {
        let mut s = Session::default();
        // Halfway up axis 0 (up is -y) with some sideways wobble.
        let changed = apply(&mut s, SessionEvent::Drag { axis: AxisId::CreditScore, cursor: Point2::new(13.0, -100.0) }).unwrap();
        assert!(changed);
        assert_eq!(s.values[AxisId::CreditScore], 575.0);
    }

    #[test]
    fn drag_is_ignored_while_customers_are_selected() {
        let mut s = Session::default();
        apply(&mut s, SessionEvent::AddCustomer("cust-001".to_string())).unwrap();
        assert!(!s.handles_enabled());
        let before = s.values;
        let changed = apply(&mut s, SessionEvent::Drag { axis: AxisId::CreditScore, cursor: Point2::new(0.0, -200.0) }).unwrap();
        assert!(!changed);
        assert_eq!(s.values, before);
    }

    #[test]
    fn unknown_customer_is_reported() {
        let mut s = Session::default();
        let err = apply(&mut s, SessionEvent::AddCustomer("nobody".to_string())).unwrap_err();
        assert_eq!(err, SessionError::CustomerNotFound("nobody".to_string()));
        assert!(s.selected.is_empty());
    }

    #[test]
    fn add_customer_uses_canonical_id_and_is_idempotent() {
        let mut s = Session::default();
        assert_eq!(apply(&mut s, SessionEvent::AddCustomer(" cust-002 ".to_string())), Ok(true));
        assert_eq!(apply(&mut s, SessionEvent::AddCustomer("CUST-002".to_string())), Ok(false));
        assert_eq!(s.selected, vec!["CUST-002".to_string()]);
    }

    #[test]
    fn toggling_off_collapses_details() {
        let mut s = Session::default();
        apply(&mut s, SessionEvent::ToggleCustomer("CUST-001".to_string())).unwrap();
        apply(&mut s, SessionEvent::ToggleExpanded("CUST-001".to_string())).unwrap();
        assert!(s.expanded.contains("CUST-001"));
        apply(&mut s, SessionEvent::ToggleCustomer("CUST-001".to_string())).unwrap();
        assert!(s.selected.is_empty());
        assert!(s.expanded.is_empty());
        // Unselected rows cannot be expanded.
        assert_eq!(apply(&mut s, SessionEvent::ToggleExpanded("CUST-001".to_string())), Ok(false));
    }

    #[test]
    fn clear_all_resets_selection() {
        let mut s = Session::default();
        apply(&mut s, SessionEvent::ToggleCustomer("CUST-001".to_string())).unwrap();
        apply(&mut s, SessionEvent::ToggleCustomer("CUST-003".to_string())).unwrap();
        assert_eq!(s.selection_index("CUST-003"), Some(1));
        assert_eq!(apply(&mut s, SessionEvent::ClearAll), Ok(true));
        assert!(s.handles_enabled());
        assert_eq!(apply(&mut s, SessionEvent::ClearAll), Ok(false));
    }

    #[test]
    fn loan_amount_defaults_differ_between_typing_and_commit() {
        let mut s = Session::default();
        apply(&mut s, SessionEvent::LoanAmountInput("abc".to_string())).unwrap();
        assert_eq!(s.loan.loan_amount, 0.0);
        apply(&mut s, SessionEvent::LoanAmountCommit("abc".to_string())).unwrap();
        assert_eq!(s.loan.loan_amount, 50_000.0);
        apply(&mut s, SessionEvent::LoanAmountCommit("$120,000".to_string())).unwrap();
        assert_eq!(s.loan.loan_amount, 120_000.0);
        apply(&mut s, SessionEvent::LoanAmountCommit("0".to_string())).unwrap();
        assert_eq!(s.loan.loan_amount, 50_000.0);
        apply(&mut s, SessionEvent::LoanAmountInput("0".to_string())).unwrap();
        assert_eq!(s.loan.loan_amount, 0.0);
    }

    #[test]
    fn warning_appears_above_recommended_count() {
        let mut s = Session::default();
        for i in 0..MAX_RECOMMENDED_CUSTOMERS {
            s.selected.push(format!("C{i}"));
        }
        assert!(s.selection_warning().is_none());
        s.selected.push("extra".to_string());
        let warning = s.selection_warning().unwrap();
        assert!(warning.contains("11 customers selected"));
    }

    #[test]
    fn estimate_reflects_loan_parameters() {
        let s = Session::default();
        let est = s.estimate(&refs(), &KnnEstimator::default());
        // Three approved rows, nominal k = 15.
        assert!((est.probability - 0.2).abs() < 1e-12);
        assert!(!est.fallback);
        let empty = s.estimate(&ReferenceSet::default(), &KnnEstimator::default());
        assert_eq!(empty.probability, 0.5);
    }

    #[test]
    fn amount_parsing_takes_the_leading_number() {
        assert_eq!(parse_amount("120abc"), Some(120.0));
        assert_eq!(parse_amount(" $1,500.5k"), Some(1_500.5));
        assert_eq!(parse_amount(".5"), Some(0.5));
        assert_eq!(parse_amount("2e3 dollars"), Some(2_000.0));
        assert_eq!(parse_amount("7e"), Some(7.0));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("."), None);
        assert_eq!(parse_amount("-"), None);
        assert_eq!(parse_amount("0.0"), None);
        assert_eq!(parse_amount(""), None);
    }
}
