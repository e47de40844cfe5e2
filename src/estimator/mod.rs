//! Approval estimation against the reference dataset.

pub mod distance;
pub mod knn;

pub use distance::*;
pub use knn::*;
