pub mod enums;
pub mod error;
pub mod records;
pub mod table;
pub mod value;

// Re-export the core types to provide a clean public API.
pub use enums::{DataType, Discount, SaleOrReturn};
pub use error::CoreError;
pub use records::{Item, ItemLossRecord, SalesRecord, Tabular, WholesalePriceRecord, columns};
pub use table::{Field, Row, Schema, Table};
pub use value::{Value, round_fixed};
