use crate::catalog::ReportId;
use crate::dataset::Dataset;
use crate::definitions::run_report;
use crate::error::ReportError;
use configuration::{ReportSettings, TopCutPolicy};
use core_types::Table;
use rayon::prelude::*;
use std::time::Instant;

/// The result of one report in a run.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub id: ReportId,
    pub result: Result<Table, ReportError>,
}

impl ReportOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs a selection of reports over one dataset.
#[derive(Debug, Clone, Copy)]
pub struct ReportPipeline {
    top_cut: TopCutPolicy,
    parallel: bool,
}

impl ReportPipeline {
    pub fn new(top_cut: TopCutPolicy, parallel: bool) -> Self {
        Self { top_cut, parallel }
    }

    pub fn from_settings(settings: &ReportSettings) -> Self {
        Self::new(settings.top_cut, settings.parallel)
    }

    /// Runs every report in `reports` and returns one outcome per report, in
    /// the order given.
    ///
    /// A failing report never stops the others. Parallel and sequential runs
    /// return the same outcomes.
    pub fn run(&self, dataset: &Dataset, reports: &[ReportId]) -> Vec<ReportOutcome> {
        tracing::info!(
            reports = reports.len(),
            parallel = self.parallel,
            top_cut = ?self.top_cut,
            "Starting report run."
        );
        let outcomes: Vec<ReportOutcome> = if self.parallel {
            reports
                .par_iter()
                .map(|&id| self.run_one(dataset, id))
                .collect()
        } else {
            reports.iter().map(|&id| self.run_one(dataset, id)).collect()
        };

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        tracing::info!(
            succeeded = outcomes.len() - failed,
            failed,
            "Report run complete."
        );
        outcomes
    }

    /// Runs a single report, logging its start, row count and any failure.
    pub fn run_one(&self, dataset: &Dataset, id: ReportId) -> ReportOutcome {
        tracing::debug!(report = %id, "Report started.");
        let started = Instant::now();
        let result = run_report(id, dataset, self.top_cut)
            .map_err(|source| ReportError::Failed { report: id, source });

        match &result {
            Ok(table) => tracing::info!(
                report = %id,
                rows = table.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Report finished."
            ),
            Err(e) => tracing::error!(report = %id, error = %e, "Report failed."),
        }
        ReportOutcome { id, result }
    }
}
