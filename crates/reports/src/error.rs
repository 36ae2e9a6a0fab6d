use crate::catalog::ReportId;
use analytics::AnalyticsError;
use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    #[error("Report '{report}' failed: {source}")]
    Failed {
        report: ReportId,
        #[source]
        source: AnalyticsError,
    },

    #[error("Invalid input data: {0}")]
    Input(#[from] CoreError),

    #[error("Failed to derive columns: {0}")]
    Derive(#[from] AnalyticsError),
}
