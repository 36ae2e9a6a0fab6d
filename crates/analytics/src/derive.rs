//! Derived columns added once per run: Revenue, Year and Month.

use crate::error::AnalyticsError;
use crate::ops::expect_type;
use chrono::Datelike;
use core_types::{DataType, Table, Value, columns};

/// Adds `Revenue = QuantitySoldKg * UnitPriceRMBPerKg`, unrounded.
pub fn with_revenue(sales: &Table) -> Result<Table, AnalyticsError> {
    let qty = expect_type(sales, columns::QUANTITY_SOLD_KG, DataType::Decimal)?;
    let price = expect_type(sales, columns::UNIT_PRICE, DataType::Decimal)?;

    // Check overflow up front so the row closure can stay infallible.
    for row in sales.rows() {
        if let (Some(q), Some(p)) = (row[qty].as_decimal(), row[price].as_decimal()) {
            if q.checked_mul(p).is_none() {
                return Err(AnalyticsError::ArithmeticOverflow(columns::REVENUE.to_string()));
            }
        }
    }

    Ok(sales.with_column(columns::REVENUE, DataType::Decimal, |row| {
        match (row[qty].as_decimal(), row[price].as_decimal()) {
            (Some(q), Some(p)) => Value::Decimal(q * p),
            _ => Value::Null,
        }
    })?)
}

/// Adds the calendar year of `date_column` as `Year`.
pub fn with_year(table: &Table, date_column: &str) -> Result<Table, AnalyticsError> {
    let date = expect_type(table, date_column, DataType::Date)?;
    Ok(table.with_column(columns::YEAR, DataType::Integer, |row| {
        row[date]
            .as_date()
            .map_or(Value::Null, |d| Value::Integer(i64::from(d.year())))
    })?)
}

/// Adds the month (1-12) of `date_column` as `Month`.
pub fn with_month(table: &Table, date_column: &str) -> Result<Table, AnalyticsError> {
    let date = expect_type(table, date_column, DataType::Date)?;
    Ok(table.with_column(columns::MONTH, DataType::Integer, |row| {
        row[date]
            .as_date()
            .map_or(Value::Null, |d| Value::Integer(i64::from(d.month())))
    })?)
}

/// Sales with Revenue, Year and Month appended.
pub fn derive_sales(sales: &Table) -> Result<Table, AnalyticsError> {
    let with_revenue = with_revenue(sales)?;
    let with_year = with_year(&with_revenue, columns::DATE)?;
    with_month(&with_year, columns::DATE)
}

/// Wholesale prices with Year appended.
pub fn derive_wholesale(wholesale: &Table) -> Result<Table, AnalyticsError> {
    with_year(wholesale, columns::DATE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::{Discount, SaleOrReturn, SalesRecord, Tabular, WholesalePriceRecord};
    use rust_decimal_macros::dec;

    fn sale(date: (i32, u32, u32), qty: rust_decimal::Decimal, price: rust_decimal::Decimal) -> SalesRecord {
        SalesRecord::new(
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            "10:00:00",
            1,
            qty,
            price,
            SaleOrReturn::Sale,
            Discount::No,
        )
    }

    #[test]
    fn revenue_is_exact_product() {
        let sales = SalesRecord::into_table(vec![sale((2023, 1, 5), dec!(0.396), dec!(7.6))]).unwrap();
        let derived = derive_sales(&sales).unwrap();
        let revenue = derived.column(columns::REVENUE).unwrap()[0].clone();
        assert_eq!(revenue, Value::Decimal(dec!(3.0096)));
    }

    #[test]
    fn year_and_month_come_from_date() {
        let sales = SalesRecord::into_table(vec![sale((2022, 12, 31), dec!(1), dec!(1))]).unwrap();
        let derived = derive_sales(&sales).unwrap();
        let names = derived.schema().names();
        assert_eq!(&names[names.len() - 3..], &["Revenue", "Year", "Month"]);
        assert_eq!(derived.rows()[0][8], Value::Integer(2022));
        assert_eq!(derived.rows()[0][9], Value::Integer(12));
    }

    #[test]
    fn source_table_is_unchanged() {
        let sales = SalesRecord::into_table(vec![sale((2023, 1, 5), dec!(2), dec!(3))]).unwrap();
        let before = sales.clone();
        let _ = derive_sales(&sales).unwrap();
        assert_eq!(sales, before);
    }

    #[test]
    fn missing_inputs_give_null() {
        let mut record = sale((2023, 1, 5), dec!(2), dec!(3));
        record.unit_price = None;
        record.date = None;
        let derived = derive_sales(&SalesRecord::into_table(vec![record]).unwrap()).unwrap();
        assert_eq!(derived.rows()[0][7..], [Value::Null, Value::Null, Value::Null]);
    }

    #[test]
    fn wholesale_gets_year_only() {
        let wholesale = WholesalePriceRecord::into_table(vec![WholesalePriceRecord::new(
            NaiveDate::from_ymd_opt(2021, 3, 9).unwrap(),
            1,
            dec!(4.2),
        )])
        .unwrap();
        let derived = derive_wholesale(&wholesale).unwrap();
        assert_eq!(derived.schema().names(), vec!["Date", "ItemCode", "WholesalePriceRMBPerKg", "Year"]);
        assert_eq!(derived.rows()[0][3], Value::Integer(2021));
    }

    #[test]
    fn rejects_non_date_column() {
        let sales = SalesRecord::into_table(vec![]).unwrap();
        let err = with_year(&sales, columns::TIME).unwrap_err();
        assert!(matches!(err, AnalyticsError::ColumnTypeMismatch { .. }));
    }
}
