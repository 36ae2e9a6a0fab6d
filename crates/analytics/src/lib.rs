//! # Analytics Engine
//!
//! The join, aggregate and rank primitives that every sales report is built from.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of files,
//!   configuration or rendering. It depends only on `core-types` (Layer 0).
//! - **Eager and Pure:** Every operation takes tables by reference and returns a new
//!   `Table`. Inputs are never mutated, so the same snapshot can be shared by any
//!   number of reports running at once.
//! - **Deterministic:** Output row order is fully defined (first appearance, input
//!   order, or stable sort), so parallel and sequential runs agree row for row.
//!
//! ## Public API
//!
//! - `derive`: Revenue, Year and Month columns.
//! - `inner_join` / `JoinSpec`: multi-key equality joins.
//! - `group_by` / `Aggregation`: grouped sum, mean, count, count-distinct and max.
//! - `dense_rank`: tie-preserving ranking within partitions.
//! - `ops`: filter, select, sort, limit and distinct.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

pub mod aggregate;
pub mod derive;
pub mod error;
pub mod join;
pub mod ops;
pub mod rank;

pub use aggregate::{AggregateFunction, Aggregation, GroupedTable, group_by};
pub use error::AnalyticsError;
pub use join::{JoinSpec, inner_join};
pub use ops::{Comparison, Operand, Predicate, SortKey, distinct, filter, limit, select, select_columns, sort};
pub use rank::{SortDirection, dense_rank};
