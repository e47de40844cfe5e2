//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads settings and installs logging
//! - loads the reference dataset
//! - dispatches to the TUI or a one-shot command

use clap::Parser;
use tracing::info;

use crate::cli::{Command, CustomerArgs, DataArgs, PlotArgs, PredictArgs, SampleArgs, TuiArgs};
use crate::config::Settings;
use crate::data::{SampleConfig, generate_sample};
use crate::error::AppError;
use crate::geometry::{ChartGeometry, round_attributes};
use crate::io::{SessionSnapshot, write_reference_csv, write_snapshot};
use crate::plot::{RadarSeries, render_ascii_radar};
use crate::session::{SessionError, SessionEvent};
use crate::telemetry::LogTarget;

pub mod pipeline;

/// Entry point for the `radar` binary.
pub fn run() -> Result<(), AppError> {
    // `radar` and `radar --data x.csv` behave like `radar tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let target = match cli.command {
        Command::Tui(_) => LogTarget::FileOnly,
        _ => LogTarget::Console,
    };
    let settings = Settings::from_env()?;
    crate::telemetry::init(&settings, target)?;

    match cli.command {
        Command::Tui(args) => handle_tui(settings, args),
        Command::Predict(args) => handle_predict(settings, args),
        Command::Customer(args) => handle_customer(settings, args),
        Command::Plot(args) => handle_plot(settings, args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_tui(settings: Settings, args: TuiArgs) -> Result<(), AppError> {
    let settings = pipeline::apply_overrides(settings, &args.data)?;
    crate::tui::run(settings)
}

fn handle_predict(settings: Settings, args: PredictArgs) -> Result<(), AppError> {
    let workspace = load(settings, &args.data)?;
    let session = pipeline::session_from_profile(&args.profile, &workspace)?;
    let estimate = workspace.estimate(&session);
    let dataset = workspace.source.to_string();
    let snapshot = SessionSnapshot::new(&session, &estimate, &dataset);

    if args.json {
        let text = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| AppError::runtime(format!("Failed to encode estimate JSON: {e}")))?;
        println!("{text}");
    } else {
        println!(
            "{}",
            crate::report::format_prediction_report(
                &session.values,
                &session.loan,
                &estimate,
                &workspace.data.stats,
                args.neighbors,
            )
        );
    }

    if let Some(dir) = &args.snapshot {
        let path = write_snapshot(dir, &snapshot)?;
        eprintln!("Snapshot written to {}", path.display());
    }
    Ok(())
}

fn handle_customer(settings: Settings, args: CustomerArgs) -> Result<(), AppError> {
    let workspace = load(settings, &args.data)?;
    let record = workspace
        .data
        .records
        .find(&args.id)
        .ok_or_else(|| SessionError::CustomerNotFound(args.id.trim().to_string()))?;
    print!("{}", crate::report::format_customer(record));
    Ok(())
}

fn handle_plot(settings: Settings, args: PlotArgs) -> Result<(), AppError> {
    let workspace = load(settings, &args.data)?;
    let mut session = pipeline::session_from_profile(&args.profile, &workspace)?;
    let refs = &workspace.data.records;
    let geometry = ChartGeometry::default();

    for id in &args.customers {
        session.apply(SessionEvent::AddCustomer(id.clone()), refs, &geometry)?;
    }
    if args.no_manual {
        session.apply(SessionEvent::ToggleManualData, refs, &geometry)?;
    }

    let series: Vec<RadarSeries> = session
        .selected
        .iter()
        .filter_map(|id| refs.find(id))
        .map(|r| RadarSeries {
            label: r.customer_id.clone(),
            values: round_attributes(&r.raw_values()),
        })
        .collect();
    let manual = session.show_manual.then_some(&session.values);

    print!("{}", render_ascii_radar(manual, &series, args.width, args.height));
    if let Some(warning) = session.selection_warning() {
        eprintln!("{warning}");
    }
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        count: args.count,
        seed: args.seed,
    };
    let records = generate_sample(&config)?;
    write_reference_csv(&args.out, &records, "synthetic")?;

    let approved = records.iter().filter(|r| r.outcome.is_approved()).count();
    info!(path = %args.out.display(), count = records.len(), "synthetic dataset written");
    println!(
        "Wrote {} synthetic records ({} approved) to {}",
        records.len(),
        approved,
        args.out.display()
    );
    Ok(())
}

fn load(settings: Settings, args: &DataArgs) -> Result<pipeline::Workspace, AppError> {
    let settings = pipeline::apply_overrides(settings, args)?;
    pipeline::load_workspace(&settings)
}

/// Rewrite argv so `radar` defaults to `radar tui`.
///
/// Rules:
/// - `radar`                     -> `radar tui`
/// - `radar --data x.csv ...`    -> `radar tui --data x.csv ...`
/// - `radar --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "predict" | "customer" | "plot" | "sample");
    if is_subcommand {
        return argv;
    }

    // A leading flag is treated as a TUI flag.
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
