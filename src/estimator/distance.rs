//! Distance in the normalized feature space.

use nalgebra::SVector;

/// Unweighted Euclidean distance between two normalized vectors.
#[inline]
pub fn euclidean<const D: usize>(a: &SVector<f64, D>, b: &SVector<f64, D>) -> f64 {
    (a - b).norm()
}
