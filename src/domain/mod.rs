//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - the fixed radar axes (`Axis`, `AxisId`, `AXES`) and their rounding rules
//! - applicant inputs (`AttributeVector`, `LoanParameters`)
//! - the reference dataset (`ReferenceRecord`, `ReferenceSet`)

pub mod types;

pub use types::*;
