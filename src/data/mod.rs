//! Reference dataset sources: CSV file/URL loading and synthetic generation.

pub mod sample;
pub mod source;

pub use sample::{SampleConfig, generate_sample};
pub use source::{DEFAULT_DATASET, DataSource, load_reference_set, spawn_loader};
