//! The four input record types and their canonical table schemas.
//!
//! Field renames match the header row of the source CSV exports. Every field
//! is optional because an empty cell loads as `Null`.

use crate::enums::{DataType, Discount, SaleOrReturn};
use crate::error::CoreError;
use crate::table::{Field, Row, Schema, Table};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Canonical column names shared by the engine and the reports.
pub mod columns {
    pub const ITEM_CODE: &str = "ItemCode";
    pub const ITEM_NAME: &str = "ItemName";
    pub const CATEGORY_CODE: &str = "CategoryCode";
    pub const CATEGORY_NAME: &str = "CategoryName";
    pub const DATE: &str = "Date";
    pub const TIME: &str = "Time";
    pub const QUANTITY_SOLD_KG: &str = "QuantitySoldKg";
    pub const UNIT_PRICE: &str = "UnitPriceRMBPerKg";
    pub const SALE_OR_RETURN: &str = "SaleOrReturn";
    pub const DISCOUNT: &str = "Discount";
    pub const WHOLESALE_PRICE: &str = "WholesalePriceRMBPerKg";
    pub const LOSS_RATE: &str = "LossRatePercent";
    pub const REVENUE: &str = "Revenue";
    pub const YEAR: &str = "Year";
    pub const MONTH: &str = "Month";
}

/// A record type that loads into a `Table` with a fixed schema.
pub trait Tabular: Sized {
    /// Human name of the table, used in schema errors.
    const TABLE: &'static str;

    /// Header names of the source file, in column order.
    const SOURCE_HEADERS: &'static [&'static str];

    /// `(column, type)` pairs of the canonical schema, in column order.
    const COLUMNS: &'static [(&'static str, DataType)];

    fn into_row(self) -> Row;

    fn schema() -> Schema {
        let fields = Self::COLUMNS
            .iter()
            .map(|(name, data_type)| Field::new(*name, *data_type))
            .collect();
        // Column constants are unique, so this cannot fail.
        Schema::new(fields).unwrap_or_else(|_| unreachable!("duplicate column in {}", Self::TABLE))
    }

    /// Converts loaded records into a table with the canonical schema.
    fn into_table(records: Vec<Self>) -> Result<Table, CoreError> {
        let rows = records.into_iter().map(Self::into_row).collect();
        Table::new(Self::schema(), rows)
    }
}

/// A row of the item catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "Item Code", default, deserialize_with = "opt_code")]
    pub item_code: Option<i64>,
    #[serde(rename = "Item Name", default)]
    pub item_name: Option<String>,
    #[serde(rename = "Category Code", default, deserialize_with = "opt_code")]
    pub category_code: Option<i64>,
    #[serde(rename = "Category Name", default)]
    pub category_name: Option<String>,
}

impl Item {
    pub fn new(item_code: i64, item_name: &str, category_code: i64, category_name: &str) -> Self {
        Self {
            item_code: Some(item_code),
            item_name: Some(item_name.to_string()),
            category_code: Some(category_code),
            category_name: Some(category_name.to_string()),
        }
    }
}

impl Tabular for Item {
    const TABLE: &'static str = "Items";
    const SOURCE_HEADERS: &'static [&'static str] =
        &["Item Code", "Item Name", "Category Code", "Category Name"];
    const COLUMNS: &'static [(&'static str, DataType)] = &[
        (columns::ITEM_CODE, DataType::Integer),
        (columns::ITEM_NAME, DataType::Text),
        (columns::CATEGORY_CODE, DataType::Integer),
        (columns::CATEGORY_NAME, DataType::Text),
    ];

    fn into_row(self) -> Row {
        vec![
            self.item_code.into(),
            self.item_name.into(),
            self.category_code.into(),
            self.category_name.into(),
        ]
    }
}

/// A single sale or return line from the till.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(rename = "Date", default)]
    pub date: Option<NaiveDate>,
    #[serde(rename = "Time", default)]
    pub time: Option<String>,
    #[serde(rename = "Item Code", default, deserialize_with = "opt_code")]
    pub item_code: Option<i64>,
    #[serde(rename = "Quantity Sold(kilo)", default, deserialize_with = "opt_decimal")]
    pub quantity_sold_kg: Option<Decimal>,
    #[serde(rename = "Unit Selling Price (RMB/kg)", default, deserialize_with = "opt_decimal")]
    pub unit_price: Option<Decimal>,
    #[serde(rename = "Sale or Return", default)]
    pub sale_or_return: Option<SaleOrReturn>,
    #[serde(rename = "Discount (Yes/No)", default)]
    pub discount: Option<Discount>,
}

impl SalesRecord {
    pub fn new(
        date: NaiveDate,
        time: &str,
        item_code: i64,
        quantity_sold_kg: Decimal,
        unit_price: Decimal,
        sale_or_return: SaleOrReturn,
        discount: Discount,
    ) -> Self {
        Self {
            date: Some(date),
            time: Some(time.to_string()),
            item_code: Some(item_code),
            quantity_sold_kg: Some(quantity_sold_kg),
            unit_price: Some(unit_price),
            sale_or_return: Some(sale_or_return),
            discount: Some(discount),
        }
    }
}

impl Tabular for SalesRecord {
    const TABLE: &'static str = "DailySales";
    const SOURCE_HEADERS: &'static [&'static str] = &[
        "Date",
        "Time",
        "Item Code",
        "Quantity Sold(kilo)",
        "Unit Selling Price (RMB/kg)",
        "Sale or Return",
        "Discount (Yes/No)",
    ];
    const COLUMNS: &'static [(&'static str, DataType)] = &[
        (columns::DATE, DataType::Date),
        (columns::TIME, DataType::Text),
        (columns::ITEM_CODE, DataType::Integer),
        (columns::QUANTITY_SOLD_KG, DataType::Decimal),
        (columns::UNIT_PRICE, DataType::Decimal),
        (columns::SALE_OR_RETURN, DataType::Text),
        (columns::DISCOUNT, DataType::Text),
    ];

    fn into_row(self) -> Row {
        vec![
            self.date.into(),
            self.time.into(),
            self.item_code.into(),
            self.quantity_sold_kg.into(),
            self.unit_price.into(),
            self.sale_or_return.map(|s| s.as_str()).into(),
            self.discount.map(|d| d.as_str()).into(),
        ]
    }
}

/// The wholesale price of an item on a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WholesalePriceRecord {
    #[serde(rename = "Date", default)]
    pub date: Option<NaiveDate>,
    #[serde(rename = "Item Code", default, deserialize_with = "opt_code")]
    pub item_code: Option<i64>,
    #[serde(rename = "Wholesale Price (RMB/kg)", default, deserialize_with = "opt_decimal")]
    pub wholesale_price: Option<Decimal>,
}

impl WholesalePriceRecord {
    pub fn new(date: NaiveDate, item_code: i64, wholesale_price: Decimal) -> Self {
        Self {
            date: Some(date),
            item_code: Some(item_code),
            wholesale_price: Some(wholesale_price),
        }
    }
}

impl Tabular for WholesalePriceRecord {
    const TABLE: &'static str = "DailyWholesalePrice";
    const SOURCE_HEADERS: &'static [&'static str] =
        &["Date", "Item Code", "Wholesale Price (RMB/kg)"];
    const COLUMNS: &'static [(&'static str, DataType)] = &[
        (columns::DATE, DataType::Date),
        (columns::ITEM_CODE, DataType::Integer),
        (columns::WHOLESALE_PRICE, DataType::Decimal),
    ];

    fn into_row(self) -> Row {
        vec![
            self.date.into(),
            self.item_code.into(),
            self.wholesale_price.into(),
        ]
    }
}

/// The spoilage rate of an item, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemLossRecord {
    #[serde(rename = "Item Code", default, deserialize_with = "opt_code")]
    pub item_code: Option<i64>,
    #[serde(rename = "Item Name", default)]
    pub item_name: Option<String>,
    #[serde(rename = "Loss Rate (%)", default, deserialize_with = "opt_decimal")]
    pub loss_rate: Option<Decimal>,
}

impl ItemLossRecord {
    pub fn new(item_code: i64, item_name: &str, loss_rate: Decimal) -> Self {
        Self {
            item_code: Some(item_code),
            item_name: Some(item_name.to_string()),
            loss_rate: Some(loss_rate),
        }
    }
}

impl Tabular for ItemLossRecord {
    const TABLE: &'static str = "ItemLoss";
    const SOURCE_HEADERS: &'static [&'static str] = &["Item Code", "Item Name", "Loss Rate (%)"];
    const COLUMNS: &'static [(&'static str, DataType)] = &[
        (columns::ITEM_CODE, DataType::Integer),
        (columns::ITEM_NAME, DataType::Text),
        (columns::LOSS_RATE, DataType::Decimal),
    ];

    fn into_row(self) -> Row {
        vec![self.item_code.into(), self.item_name.into(), self.loss_rate.into()]
    }
}

// --- CSV cell parsers ---

/// Parses a decimal cell. Accepts plain and scientific notation.
pub fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| format!("'{}' is not a decimal number: {}", raw, e))
}

/// Parses a numeric id. Ids exported as floats (`102900005115168.0`, `1e14`)
/// are accepted as long as they are integral.
pub fn parse_code(raw: &str) -> Result<i64, String> {
    let raw = raw.trim();
    if let Ok(code) = raw.parse::<i64>() {
        return Ok(code);
    }
    let decimal = parse_decimal(raw)?;
    if !decimal.fract().is_zero() {
        return Err(format!("'{}' is not an integral id", raw));
    }
    decimal
        .to_i64()
        .ok_or_else(|| format!("'{}' is out of range for an id", raw))
}

fn opt_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_decimal(s).map(Some).map_err(serde::de::Error::custom),
    }
}

fn opt_code<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_code(s).map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_code_accepts_float_exports() {
        assert_eq!(parse_code("102900005115168"), Ok(102900005115168));
        assert_eq!(parse_code("102900005115168.0"), Ok(102900005115168));
        assert_eq!(parse_code("1e3"), Ok(1000));
        assert!(parse_code("12.5").is_err());
        assert!(parse_code("abc").is_err());
    }

    #[test]
    fn parse_decimal_keeps_exact_digits() {
        assert_eq!(parse_decimal(" 0.396 "), Ok(dec!(0.396)));
        assert!(parse_decimal("n/a").is_err());
    }

    #[test]
    fn sales_row_stores_enum_text() {
        let record = SalesRecord::new(
            NaiveDate::from_ymd_opt(2020, 7, 1).unwrap(),
            "09:15:07.924",
            102900005117056,
            dec!(0.396),
            dec!(7.6),
            SaleOrReturn::Return,
            Discount::No,
        );
        let row = record.into_row();
        assert_eq!(row[5], Value::from("return"));
        assert_eq!(row[6], Value::from("No"));
    }

    #[test]
    fn into_table_uses_canonical_schema() {
        let table = Item::into_table(vec![Item::new(1, "Niushou Shengcai", 1011010101, "Flower/Leaf Vegetables")]).unwrap();
        assert_eq!(
            table.schema().names(),
            vec!["ItemCode", "ItemName", "CategoryCode", "CategoryName"]
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn missing_fields_become_nulls() {
        let record = WholesalePriceRecord {
            date: None,
            item_code: Some(7),
            wholesale_price: None,
        };
        assert_eq!(record.into_row(), vec![Value::Null, Value::Integer(7), Value::Null]);
    }
}
