//! Presentation helpers shared by the TUI and the CLI.
//!
//! Formatting lives here so the estimator and geometry code stay free of
//! display concerns.

pub mod format;
pub mod palette;

pub use format::*;
pub use palette::*;
