//! Chart geometry and normalization.
//!
//! Pure functions shared by every renderer and by the estimator:
//! data value <-> polygon vertex, and value clamping/rounding.

pub mod normalize;
pub mod polar;
pub mod rounding;

pub use normalize::*;
pub use polar::*;
pub use rounding::*;
