//! Shared "load -> session -> estimate" logic used by the CLI commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! settings -> dataset load -> session events from flags -> KNN estimate
//!
//! The command handlers in `app` then only deal with presentation.

use tracing::warn;

use crate::cli::{DataArgs, ProfileArgs};
use crate::config::Settings;
use crate::data::{DataSource, load_reference_set};
use crate::domain::AxisId;
use crate::error::AppError;
use crate::estimator::{Estimate, KnnEstimator};
use crate::geometry::ChartGeometry;
use crate::io::ingest::IngestedData;
use crate::session::{Session, SessionEvent};

/// A loaded dataset plus the estimator configured for it.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub source: DataSource,
    pub data: IngestedData,
    pub estimator: KnnEstimator,
}

impl Workspace {
    pub fn estimate(&self, session: &Session) -> Estimate {
        session.estimate(&self.data.records, &self.estimator)
    }
}

/// Apply command-line overrides on top of environment settings.
pub fn apply_overrides(mut settings: Settings, args: &DataArgs) -> Result<Settings, AppError> {
    if let Some(raw) = &args.data {
        settings.data = DataSource::parse(raw);
    }
    if let Some(k) = args.k {
        if k == 0 {
            return Err(AppError::input("--k must be > 0."));
        }
        settings.k = k;
    }
    Ok(settings)
}

/// Load the dataset named by `settings`.
pub fn load_workspace(settings: &Settings) -> Result<Workspace, AppError> {
    let data = load_reference_set(&settings.data)?;
    Ok(Workspace {
        source: settings.data.clone(),
        data,
        estimator: KnnEstimator::new(settings.k),
    })
}

/// Build a session from profile flags by replaying them as commit events.
///
/// Values go through the same clamp-and-round path as the TUI fields.
pub fn session_from_profile(profile: &ProfileArgs, workspace: &Workspace) -> Result<Session, AppError> {
    let refs = &workspace.data.records;
    let geometry = ChartGeometry::default();
    let mut session = Session::default();

    let axis_values = [
        (AxisId::CreditScore, profile.credit_score),
        (AxisId::AnnualIncome, profile.annual_income),
        (AxisId::CurrentDebt, profile.current_debt),
        (AxisId::YearsEmployed, profile.years_employed),
        (AxisId::SavingsAssets, profile.savings_assets),
        (AxisId::DtiRatio, profile.dti),
    ];
    let mut events: Vec<SessionEvent> = axis_values
        .into_iter()
        .filter_map(|(axis, raw)| raw.map(|raw| SessionEvent::ValueCommit { axis, raw }))
        .collect();
    events.push(SessionEvent::ProductType(profile.product_type.trim().to_string()));
    events.push(SessionEvent::LoanIntent(profile.loan_intent.trim().to_string()));
    events.push(SessionEvent::LoanAmountCommit(profile.amount.clone()));

    for event in events {
        session.apply(event, refs, &geometry)?;
    }

    if !refs.product_types().contains(&session.loan.product_type) {
        warn!(product_type = %session.loan.product_type, "product type not present in dataset");
    }
    if !refs.loan_intents().contains(&session.loan.loan_intent) {
        warn!(loan_intent = %session.loan.loan_intent, "loan intent not present in dataset");
    }

    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::{SampleConfig, generate_sample};
    use crate::domain::ReferenceSet;
    use crate::io::ingest::compute_stats;

    fn workspace() -> Workspace {
        let records = ReferenceSet::new(generate_sample(&SampleConfig { count: 200, seed: 5 }).unwrap());
        let stats = compute_stats(&records);
        let n = records.len();
        Workspace {
            source: DataSource::default(),
            data: IngestedData {
                records,
                stats,
                row_errors: Vec::new(),
                rows_read: n,
                rows_used: n,
            },
            estimator: KnnEstimator::default(),
        }
    }

    fn profile() -> ProfileArgs {
        ProfileArgs {
            credit_score: None,
            annual_income: Some(76_499.0),
            current_debt: None,
            years_employed: Some(3.3),
            savings_assets: None,
            dti: Some(1000.0),
            product_type: " Personal Loan ".to_string(),
            loan_intent: "Medical".to_string(),
            amount: "$12,500".to_string(),
        }
    }

    #[test]
    fn profile_flags_are_clamped_and_rounded() {
        let session = session_from_profile(&profile(), &workspace()).unwrap();
        assert_eq!(session.values[AxisId::CreditScore], 650.0);
        assert_eq!(session.values[AxisId::AnnualIncome], 76_000.0);
        assert_eq!(session.values[AxisId::YearsEmployed], 3.5);
        assert_eq!(session.values[AxisId::DtiRatio], 100.0);
        assert_eq!(session.loan.product_type, "Personal Loan");
        assert_eq!(session.loan.loan_amount, 12_500.0);
    }

    #[test]
    fn bad_amount_falls_back_to_default() {
        let mut p = profile();
        p.amount = "lots".to_string();
        let session = session_from_profile(&p, &workspace()).unwrap();
        assert_eq!(session.loan.loan_amount, 50_000.0);
    }

    #[test]
    fn overrides_win_over_environment() {
        let args = DataArgs {
            data: Some("https://example.org/x.csv".to_string()),
            k: Some(5),
        };
        let settings = apply_overrides(Settings::default(), &args).unwrap();
        assert_eq!(settings.k, 5);
        assert!(matches!(settings.data, DataSource::Url(_)));

        let zero = DataArgs { data: None, k: Some(0) };
        assert_eq!(apply_overrides(Settings::default(), &zero).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn workspace_estimate_is_a_probability() {
        let ws = workspace();
        let session = session_from_profile(&profile(), &ws).unwrap();
        let estimate = ws.estimate(&session);
        assert!((0.0..=1.0).contains(&estimate.probability));
        assert_eq!(estimate.k, 15);
    }
}
