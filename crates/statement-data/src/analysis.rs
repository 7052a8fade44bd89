//! Top-level report pipeline.
//!
//! Discovers the monthly exports, registers and loads them into a
//! [`MonthlyBatchStore`], then aggregates each year. A bad file or a bad year
//! is recorded as a [`ReportFailure`] and the rest of the run carries on; only
//! an unusable input path aborts.

use std::fmt;
use std::path::PathBuf;

use statement_core::error::{Result, StatementError};
use statement_core::settings::DEFAULT_HEADER_TOKEN;
use tracing::{info, warn};

use crate::aggregator::{YearAggregator, YearSummary};
use crate::reader::discover_statements;
use crate::store::MonthlyBatchStore;

// ── Public types ──────────────────────────────────────────────────────────────

/// Inputs for [`run_report`].
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub input_path: PathBuf,
    pub header_token: String,
}

impl ReportOptions {
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            header_token: DEFAULT_HEADER_TOKEN.to_string(),
        }
    }
}

/// Pipeline step a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Load,
    Aggregate,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Load => write!(f, "load"),
            FailureStage::Aggregate => write!(f, "aggregate"),
        }
    }
}

/// A file or year that dropped out of the report.
#[derive(Debug)]
pub struct ReportFailure {
    pub stage: FailureStage,
    /// `"<year>-<month>"` for loads, `"<year>"` for aggregation.
    pub label: String,
    pub error: StatementError,
}

/// The complete output of [`run_report`].
#[derive(Debug)]
pub struct ReportOutcome {
    /// One summary per year that aggregated, ascending by year.
    pub summaries: Vec<YearSummary>,
    pub failures: Vec<ReportFailure>,
    /// Files that matched the `<year>_<month>` naming convention.
    pub files_registered: usize,
    /// Files that were listed but did not match the naming convention.
    pub files_skipped: usize,
}

impl ReportOutcome {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full pipeline.
///
/// 1. Discover `<year>_<month>*.csv` files under `options.input_path`.
/// 2. Register each in a [`MonthlyBatchStore`].
/// 3. Load every entry; failures are recorded, siblings continue.
/// 4. Aggregate every year; failures are recorded, other years continue.
///
/// Errors only when the input path is not a readable directory.
pub fn run_report(options: &ReportOptions) -> Result<ReportOutcome> {
    let discovery = discover_statements(&options.input_path)?;

    let mut store = MonthlyBatchStore::new(options.header_token.clone());
    for file in &discovery.statements {
        store.register(&file.year, &file.month, file.path.clone());
    }

    let mut failures = Vec::new();

    for (year, month) in store.keys() {
        if let Err(error) = store.load(&year, &month) {
            warn!("Skipping {}-{}: {}", year, month, error);
            failures.push(ReportFailure {
                stage: FailureStage::Load,
                label: format!("{}-{}", year, month),
                error,
            });
        }
    }

    let mut summaries = Vec::new();
    for (year, result) in YearAggregator::aggregate_all(&store) {
        match result {
            Ok(summary) => summaries.push(summary),
            Err(error) => {
                warn!("No summary for {}: {}", year, error);
                failures.push(ReportFailure {
                    stage: FailureStage::Aggregate,
                    label: year,
                    error,
                });
            }
        }
    }

    info!(
        "Report: {} years summarised from {} batches, {} files skipped, {} failures",
        summaries.len(),
        store.len(),
        discovery.skipped.len(),
        failures.len()
    );

    Ok(ReportOutcome {
        summaries,
        failures,
        files_registered: discovery.statements.len(),
        files_skipped: discovery.skipped.len(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
