//! Command-line parsing for the loan approval radar.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! session/estimator code; `app` turns parsed arguments into session events.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "radar", version, about = "Loan approval radar (KNN estimate over a reference dataset)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive radar TUI (default).
    Tui(TuiArgs),
    /// Estimate the approval probability for one applicant profile.
    Predict(PredictArgs),
    /// Show one reference customer.
    Customer(CustomerArgs),
    /// Render the radar chart as ASCII.
    Plot(PlotArgs),
    /// Write a synthetic reference dataset (CSV, ingest schema).
    Sample(SampleArgs),
}

/// Dataset and estimator options shared by every command that loads data.
#[derive(Debug, Args, Clone, Default)]
pub struct DataArgs {
    /// Reference dataset: CSV path or http(s) URL (overrides RADAR_DATA).
    #[arg(short = 'd', long, value_name = "PATH|URL")]
    pub data: Option<String>,

    /// Neighbour count (overrides RADAR_K).
    #[arg(short = 'k', long)]
    pub k: Option<usize>,
}

/// Applicant profile flags. Unset values keep the default profile.
#[derive(Debug, Args, Clone)]
pub struct ProfileArgs {
    /// Credit score (300-850).
    #[arg(long)]
    pub credit_score: Option<f64>,

    /// Annual income in dollars (25,000-175,000).
    #[arg(long)]
    pub annual_income: Option<f64>,

    /// Current debt in dollars (0-100,000).
    #[arg(long)]
    pub current_debt: Option<f64>,

    /// Years employed (0-20).
    #[arg(long)]
    pub years_employed: Option<f64>,

    /// Savings and assets in dollars (0-150,000).
    #[arg(long)]
    pub savings_assets: Option<f64>,

    /// Debt-to-income ratio in percent (0-100).
    #[arg(long)]
    pub dti: Option<f64>,

    /// Loan product type (exact match against the dataset).
    #[arg(long, default_value = "Credit Card")]
    pub product_type: String,

    /// Loan intent (exact match against the dataset).
    #[arg(long, default_value = "Business")]
    pub loan_intent: String,

    /// Requested loan amount; `$` and `,` are accepted.
    #[arg(long, default_value = "50000")]
    pub amount: String,
}

#[derive(Debug, Args, Clone, Default)]
pub struct TuiArgs {
    #[command(flatten)]
    pub data: DataArgs,
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub profile: ProfileArgs,

    /// List the nearest neighbours behind the estimate.
    #[arg(long)]
    pub neighbors: bool,

    /// Print the estimate as JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Also write a JSON session snapshot into this directory.
    #[arg(long, value_name = "DIR")]
    pub snapshot: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct CustomerArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Customer id (case-insensitive).
    pub id: String,
}

#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Overlay a reference customer (repeatable).
    #[arg(short = 'c', long = "customer", value_name = "ID")]
    pub customers: Vec<String>,

    /// Hide the manual applicant polygon.
    #[arg(long)]
    pub no_manual: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 61)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Number of synthetic records.
    #[arg(short = 'n', long, default_value_t = 2000)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV path.
    #[arg(short = 'o', long, default_value = "data/synthetic_loans.csv")]
    pub out: PathBuf,
}
