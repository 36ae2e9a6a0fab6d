use serde::{Deserialize, Serialize};
use std::fmt;

/// The column types a table cell can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    Decimal,
    Text,
    Date,
}

impl DataType {
    /// Whether `sum` and `mean` are defined over this type.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Decimal)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Integer => "integer",
            DataType::Decimal => "decimal",
            DataType::Text => "text",
            DataType::Date => "date",
        };
        f.write_str(name)
    }
}

/// Whether a sales row is a sale or a customer return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaleOrReturn {
    #[serde(rename = "sale")]
    Sale,
    #[serde(rename = "return")]
    Return,
}

impl SaleOrReturn {
    /// The text stored in the `SaleOrReturn` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleOrReturn::Sale => "sale",
            SaleOrReturn::Return => "return",
        }
    }
}

/// Whether a sale was made at a discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Discount {
    Yes,
    No,
}

impl Discount {
    /// The text stored in the `Discount` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Discount::Yes => "Yes",
            Discount::No => "No",
        }
    }
}
