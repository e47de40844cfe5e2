//! Min-max normalization against the fixed axis ranges.
//!
//! The estimator works in a 7-D space: the six axes followed by the loan
//! amount. The transform is affine and unclamped, so a value beyond its
//! axis range lands outside `[0, 1]` and keeps its distance from in-range
//! values.

use nalgebra::SVector;

use crate::domain::{AXES, AXIS_COUNT, LOAN_AMOUNT_MAX, LOAN_AMOUNT_MIN};

/// Dimensions of the estimator feature space (6 axes + loan amount).
pub const FEATURE_DIMS: usize = AXIS_COUNT + 1;

/// Normalized vector; in-range inputs give components in `[0, 1]`.
pub type NormalizedVector<const D: usize> = SVector<f64, D>;

/// 7-D estimator feature vector.
pub type FeatureVector = NormalizedVector<FEATURE_DIMS>;

/// Affine min-max transform. A zero-width range maps everything to 0.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        return 0.0;
    }
    (value - min) / (max - min)
}

/// Build the 7-D estimator vector from raw axis-scale values and a loan amount.
pub fn feature_vector(values: &[f64; AXIS_COUNT], loan_amount: f64) -> FeatureVector {
    FeatureVector::from_fn(|i, _| match AXES.get(i) {
        Some(axis) => normalize(values[i], axis.min, axis.max),
        None => normalize(loan_amount, LOAN_AMOUNT_MIN, LOAN_AMOUNT_MAX),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AttributeVector, AxisId};

    #[test]
    fn zero_range_normalizes_to_zero() {
        assert_eq!(normalize(5.0, 3.0, 3.0), 0.0);
    }

    #[test]
    fn normalize_is_affine() {
        assert!((normalize(575.0, 300.0, 850.0) - 0.5).abs() < 1e-12);
        assert!((normalize(300.0, 300.0, 850.0)).abs() < 1e-12);
        assert!((normalize(850.0, 300.0, 850.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_values_are_not_clamped() {
        assert!((normalize(600_000.0, LOAN_AMOUNT_MIN, LOAN_AMOUNT_MAX) - 3.0).abs() < 1e-12);
        assert!((normalize(250_000.0, LOAN_AMOUNT_MIN, LOAN_AMOUNT_MAX) - 1.25).abs() < 1e-12);
        assert!(normalize(-20_000.0, LOAN_AMOUNT_MIN, LOAN_AMOUNT_MAX) < 0.0);
    }

    #[test]
    fn feature_vector_appends_loan_amount() {
        let f = feature_vector(AttributeVector::DEFAULT.values(), 50_000.0);
        assert!((f[6] - 0.25).abs() < 1e-12);
        // credit score 650 over [300, 850]
        assert!((f[0] - 350.0 / 550.0).abs() < 1e-12);
        for c in f.iter() {
            assert!((0.0..=1.0).contains(c));
        }
    }

    #[test]
    fn feature_vector_keeps_out_of_range_axes() {
        let mut raw = *AttributeVector::DEFAULT.values();
        // DTI 120% on a [0, 100] axis.
        raw[AxisId::DtiRatio.index()] = 120.0;
        let f = feature_vector(&raw, 400_000.0);
        assert!((f[AxisId::DtiRatio.index()] - 1.2).abs() < 1e-12);
        assert!((f[6] - 2.0).abs() < 1e-12);
    }
}
