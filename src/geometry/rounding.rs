//! Value constraints for manual input and drag gestures.

use crate::domain::{AXIS_COUNT, AttributeVector, AxisId};

/// Clamp `value` into the axis range, then apply the axis rounding rule.
///
/// Rounding table:
/// - annual income, current debt, savings assets: nearest 1000
/// - years employed: nearest 0.5
/// - credit score, DTI ratio: nearest integer
///
/// NaN is treated as the axis minimum; callers that must ignore malformed
/// input check for it before calling (see `session`).
pub fn constrain_and_round(value: f64, axis: AxisId) -> f64 {
    let spec = axis.axis();
    spec.rounding.apply(spec.clamp(value))
}

/// Clamp only; used while the user is still typing.
pub fn constrain(value: f64, axis: AxisId) -> f64 {
    axis.axis().clamp(value)
}

/// `constrain_and_round` applied to every axis; how a stored customer is drawn.
pub fn round_attributes(raw: &[f64; AXIS_COUNT]) -> AttributeVector {
    let mut out = *raw;
    for axis in AxisId::ALL {
        out[axis.index()] = constrain_and_round(raw[axis.index()], axis);
    }
    AttributeVector::new(out)
}
