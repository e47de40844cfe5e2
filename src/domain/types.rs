//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the estimator and the chart geometry
//! - exported to CSV (synthetic datasets) and JSON (session snapshots)

use std::ops::Index;

use serde::{Deserialize, Serialize};

/// Number of radar axes.
pub const AXIS_COUNT: usize = 6;

/// Loan amount range used when normalizing the 7th estimator dimension.
pub const LOAN_AMOUNT_MIN: f64 = 0.0;
pub const LOAN_AMOUNT_MAX: f64 = 200_000.0;

/// Loan amount used when a committed amount does not parse.
pub const DEFAULT_LOAN_AMOUNT: f64 = 50_000.0;

/// Neighbour count used by the estimator unless configured otherwise.
pub const DEFAULT_K: usize = 15;

/// Probability returned when there is nothing to compare against.
pub const NEUTRAL_PROBABILITY: f64 = 0.5;

/// Probabilities at or above this are labelled "approved".
pub const APPROVAL_THRESHOLD: f64 = 0.5;

/// Above this many selected customers the chart gets hard to read.
pub const MAX_RECOMMENDED_CUSTOMERS: usize = 10;

/// Identity of a radar axis. The discriminant is the axis index (0 points up,
/// subsequent axes proceed clockwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisId {
    CreditScore,
    AnnualIncome,
    CurrentDebt,
    YearsEmployed,
    SavingsAssets,
    DtiRatio,
}

impl AxisId {
    pub const ALL: [AxisId; AXIS_COUNT] = [
        AxisId::CreditScore,
        AxisId::AnnualIncome,
        AxisId::CurrentDebt,
        AxisId::YearsEmployed,
        AxisId::SavingsAssets,
        AxisId::DtiRatio,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Static description (range, rounding, display) of this axis.
    pub fn axis(self) -> &'static Axis {
        &AXES[self.index()]
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % AXIS_COUNT]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + AXIS_COUNT - 1) % AXIS_COUNT]
    }
}

/// Per-axis rounding rule applied after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Nearest integer.
    Unit,
    /// Nearest 0.5.
    Half,
    /// Nearest 1000.
    Thousand,
}

impl Rounding {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Rounding::Unit => value.round(),
            Rounding::Half => (value * 2.0).round() / 2.0,
            Rounding::Thousand => (value / 1000.0).round() * 1000.0,
        }
    }

    /// Step used for keyboard nudges in the TUI.
    pub fn step(self) -> f64 {
        match self {
            Rounding::Unit => 1.0,
            Rounding::Half => 0.5,
            Rounding::Thousand => 1000.0,
        }
    }
}

/// How an axis value is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    Plain,
    Currency,
    Years,
    Percent,
}

/// One fixed radar dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    pub id: AxisId,
    pub name: &'static str,
    /// Column name in the reference dataset.
    pub column: &'static str,
    pub min: f64,
    pub max: f64,
    pub rounding: Rounding,
    pub format: ValueFormat,
}

impl Axis {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Clamp into `[min, max]`. NaN maps to `min`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }
}

/// The six radar axes, in chart order.
pub const AXES: [Axis; AXIS_COUNT] = [
    Axis {
        id: AxisId::CreditScore,
        name: "Credit Score",
        column: "credit_score",
        min: 300.0,
        max: 850.0,
        rounding: Rounding::Unit,
        format: ValueFormat::Plain,
    },
    Axis {
        id: AxisId::AnnualIncome,
        name: "Annual Income",
        column: "annual_income",
        min: 25_000.0,
        max: 175_000.0,
        rounding: Rounding::Thousand,
        format: ValueFormat::Currency,
    },
    Axis {
        id: AxisId::CurrentDebt,
        name: "Current Debt",
        column: "current_debt",
        min: 0.0,
        max: 100_000.0,
        rounding: Rounding::Thousand,
        format: ValueFormat::Currency,
    },
    Axis {
        id: AxisId::YearsEmployed,
        name: "Years Employed",
        column: "years_employed",
        min: 0.0,
        max: 20.0,
        rounding: Rounding::Half,
        format: ValueFormat::Years,
    },
    Axis {
        id: AxisId::SavingsAssets,
        name: "Savings Assets",
        column: "savings_assets",
        min: 0.0,
        max: 150_000.0,
        rounding: Rounding::Thousand,
        format: ValueFormat::Currency,
    },
    Axis {
        id: AxisId::DtiRatio,
        name: "DTI Ratio",
        column: "debt_to_income_ratio",
        min: 0.0,
        max: 100.0,
        rounding: Rounding::Unit,
        format: ValueFormat::Percent,
    },
];

/// Applicant profile: one value per axis, each clamped to its axis range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeVector([f64; AXIS_COUNT]);

impl AttributeVector {
    /// Starting profile for the manual applicant.
    pub const DEFAULT: AttributeVector = AttributeVector([650.0, 75_000.0, 30_000.0, 5.0, 15_000.0, 40.0]);

    /// Build a vector, clamping each value into its axis range.
    pub fn new(values: [f64; AXIS_COUNT]) -> Self {
        let mut out = values;
        for (value, axis) in out.iter_mut().zip(AXES.iter()) {
            *value = axis.clamp(*value);
        }
        Self(out)
    }

    pub fn get(&self, axis: AxisId) -> f64 {
        self.0[axis.index()]
    }

    /// Store a value for one axis (clamped to its range).
    pub fn set(&mut self, axis: AxisId, value: f64) {
        self.0[axis.index()] = axis.axis().clamp(value);
    }

    pub fn values(&self) -> &[f64; AXIS_COUNT] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (AxisId, f64)> + '_ {
        AxisId::ALL.iter().map(move |&axis| (axis, self.0[axis.index()]))
    }
}

impl Default for AttributeVector {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Index<AxisId> for AttributeVector {
    type Output = f64;

    fn index(&self, axis: AxisId) -> &f64 {
        &self.0[axis.index()]
    }
}

/// Loan product parameters the applicant is asking about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    pub product_type: String,
    pub loan_intent: String,
    pub loan_amount: f64,
}

impl Default for LoanParameters {
    fn default() -> Self {
        Self {
            product_type: "Credit Card".to_string(),
            loan_intent: "Business".to_string(),
            loan_amount: DEFAULT_LOAN_AMOUNT,
        }
    }
}

/// Binary loan outcome, both for dataset rows and for predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    /// Parse a dataset status code (`1` approved, `0` rejected).
    pub fn from_status_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Decision::Approved),
            0 => Some(Decision::Rejected),
            _ => None,
        }
    }

    pub fn from_probability(probability: f64) -> Self {
        if probability >= APPROVAL_THRESHOLD {
            Decision::Approved
        } else {
            Decision::Rejected
        }
    }

    pub fn status_code(self) -> u8 {
        match self {
            Decision::Approved => 1,
            Decision::Rejected => 0,
        }
    }

    pub fn is_approved(self) -> bool {
        self == Decision::Approved
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Decision::Approved => "Approved",
            Decision::Rejected => "Rejected",
        }
    }
}

/// One historical applicant row from the reference dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub customer_id: String,
    pub credit_score: f64,
    pub annual_income: f64,
    pub current_debt: f64,
    pub years_employed: f64,
    pub savings_assets: f64,
    /// Stored as a fraction (`0.4` means 40%).
    pub debt_to_income_ratio: f64,
    pub product_type: String,
    pub loan_intent: String,
    pub loan_amount: f64,
    pub interest_rate: Option<f64>,
    pub outcome: Decision,
}

impl ReferenceRecord {
    /// Raw value on an axis scale. DTI is converted from a fraction to percent.
    pub fn axis_value(&self, axis: AxisId) -> f64 {
        match axis {
            AxisId::CreditScore => self.credit_score,
            AxisId::AnnualIncome => self.annual_income,
            AxisId::CurrentDebt => self.current_debt,
            AxisId::YearsEmployed => self.years_employed,
            AxisId::SavingsAssets => self.savings_assets,
            AxisId::DtiRatio => self.debt_to_income_ratio * 100.0,
        }
    }

    /// Unclamped axis-scale values, in axis order.
    pub fn raw_values(&self) -> [f64; AXIS_COUNT] {
        let mut values = [0.0; AXIS_COUNT];
        for axis in AxisId::ALL {
            values[axis.index()] = self.axis_value(axis);
        }
        values
    }

    /// Loan parameters this record was decided under.
    pub fn loan(&self) -> LoanParameters {
        LoanParameters {
            product_type: self.product_type.clone(),
            loan_intent: self.loan_intent.clone(),
            loan_amount: self.loan_amount,
        }
    }

    pub fn matches_loan(&self, params: &LoanParameters) -> bool {
        self.product_type == params.product_type && self.loan_intent == params.loan_intent
    }
}

/// The loaded reference dataset. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    records: Vec<ReferenceRecord>,
}

impl ReferenceSet {
    pub fn new(records: Vec<ReferenceRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ReferenceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Case-insensitive lookup by customer id.
    pub fn find(&self, customer_id: &str) -> Option<&ReferenceRecord> {
        let wanted = customer_id.trim();
        self.records
            .iter()
            .find(|r| r.customer_id.eq_ignore_ascii_case(wanted))
    }

    /// Distinct product types in dataset order.
    pub fn product_types(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.product_type.as_str()))
    }

    /// Distinct loan intents in dataset order.
    pub fn loan_intents(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.loan_intent.as_str()))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values {
        if !out.iter().any(|seen| seen == v) {
            out.push(v.to_string());
        }
    }
    out
}
