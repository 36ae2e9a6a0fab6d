//! # Table Loader
//!
//! Reads the four CSV exports (items, daily sales, daily wholesale prices and item
//! loss rates) into typed `Table`s.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** This crate is the only place that touches the file system for
//!   input data. The analytics engine and the reports only ever see `Table`s.
//! - **Fail Fast:** Header names and cell types are checked while reading. Data
//!   that does not fit the schema is rejected with `SchemaMismatch` rather than
//!   coerced.
//!
//! ## Public API
//!
//! - `load_inputs`: Loads all four tables from the configured paths.
//! - `load_table` / `load_file`: Load a single table from a reader or a path.
//! - `LoaderError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod csv_source;
pub mod error;

// Re-export the key components to create a clean, public-facing API.
pub use csv_source::{load_file, load_table};
pub use error::LoaderError;

use configuration::DataPaths;
use core_types::{Item, ItemLossRecord, SalesRecord, Table, WholesalePriceRecord};

/// The four base snapshots, as loaded.
#[derive(Debug, Clone)]
pub struct InputTables {
    pub items: Table,
    pub daily_sales: Table,
    pub wholesale_prices: Table,
    pub item_loss: Table,
}

/// Loads all four input tables from the configured paths.
pub fn load_inputs(paths: &DataPaths) -> Result<InputTables, LoaderError> {
    Ok(InputTables {
        items: load_file::<Item>(&paths.items)?,
        daily_sales: load_file::<SalesRecord>(&paths.daily_sales)?,
        wholesale_prices: load_file::<WholesalePriceRecord>(&paths.wholesale_prices)?,
        item_loss: load_file::<ItemLossRecord>(&paths.item_loss)?,
    })
}
