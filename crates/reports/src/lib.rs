//! # Sales Reports
//!
//! The named business reports over the four sales snapshots, and the pipeline
//! that runs them.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Logic:** Reports are compositions of the `analytics` primitives.
//!   This crate never reads files; it is handed a `Dataset`.
//! - **Isolation:** Each report is a pure function of the shared, read-only
//!   `Dataset` and owns its intermediate tables. A failing report yields an `Err`
//!   outcome and never affects the others.
//! - **Deterministic:** Outcomes come back in canonical report order whether the
//!   pipeline runs on the rayon pool or sequentially.
//!
//! ## Public API
//!
//! - `Dataset`: the schema-checked inputs with derived columns.
//! - `ReportId` / `select_reports`: the report catalog and configured selection.
//! - `ReportPipeline` / `ReportOutcome`: runs reports and collects per-report results.
//! - `top_cut`: the configurable top-N cut shared by the ranking reports.
//! - `ReportError`: the specific error types that can be returned from this crate.

pub mod catalog;
pub mod dataset;
pub mod definitions;
pub mod error;
pub mod pipeline;

pub use catalog::{ReportId, select_reports};
pub use dataset::Dataset;
pub use definitions::{output, run_report, top_cut};
pub use error::ReportError;
pub use pipeline::{ReportOutcome, ReportPipeline};
