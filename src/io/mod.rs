//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - reference record CSV export (`export`)
//! - session snapshot JSON export (`snapshot`)

pub mod export;
pub mod ingest;
pub mod snapshot;

pub use export::*;
pub use ingest::*;
pub use snapshot::*;
