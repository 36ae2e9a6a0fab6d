use crate::error::LoaderError;
use core_types::{CoreError, Tabular, Table};
use csv::{ErrorKind, ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Loads one table from CSV text with a header row.
///
/// The header must list `T::SOURCE_HEADERS` in order. Names are compared
/// ignoring case and whitespace, so `Quantity Sold (kilo)` matches
/// `Quantity Sold(kilo)`. Empty cells load
/// as null. A cell that does not parse as its column type, or a row with the
/// wrong number of fields, is a schema mismatch naming the line.
pub fn load_table<T, R>(reader: R) -> Result<Table, LoaderError>
where
    T: Tabular + DeserializeOwned,
    R: Read,
{
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(|e| csv_error(T::TABLE, e))?;
    let found: Vec<&str> = headers.iter().collect();
    let matches = found.len() == T::SOURCE_HEADERS.len()
        && found
            .iter()
            .zip(T::SOURCE_HEADERS)
            .all(|(f, e)| normalize_header(f) == normalize_header(e));
    if !matches {
        return Err(CoreError::schema_mismatch(
            T::TABLE,
            format!(
                "expected headers [{}], found [{}]",
                T::SOURCE_HEADERS.join(", "),
                found.join(", ")
            ),
        )
        .into());
    }
    // Records bind to fields by the canonical names.
    csv_reader.set_headers(StringRecord::from(T::SOURCE_HEADERS.to_vec()));

    let mut records = Vec::new();
    for result in csv_reader.deserialize::<T>() {
        records.push(result.map_err(|e| csv_error(T::TABLE, e))?);
    }

    let table = T::into_table(records)?;
    tracing::info!(table = T::TABLE, rows = table.len(), "Loaded table.");
    Ok(table)
}

/// Loads one table from a CSV file.
pub fn load_file<T>(path: &Path) -> Result<Table, LoaderError>
where
    T: Tabular + DeserializeOwned,
{
    let file = File::open(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(table = T::TABLE, path = %path.display(), "Reading CSV.");
    load_table::<T, _>(file)
}

fn normalize_header(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Type and shape problems become `SchemaMismatch`; anything else is a CSV error.
fn csv_error(table: &str, err: csv::Error) -> LoaderError {
    let line = err.position().map(|p| p.line());
    match err.kind() {
        ErrorKind::Deserialize { err: de, .. } => {
            let column = de.field().map_or_else(String::new, |f| format!(" field {}", f + 1));
            CoreError::schema_mismatch(
                table,
                format!("line {}{}: {}", line.unwrap_or(0), column, de.kind()),
            )
            .into()
        }
        ErrorKind::UnequalLengths { expected_len, len, .. } => CoreError::schema_mismatch(
            table,
            format!(
                "line {}: expected {} fields, found {}",
                line.unwrap_or(0),
                expected_len,
                len
            ),
        )
        .into(),
        _ => LoaderError::Csv {
            table: table.to_string(),
            source: err,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::{Item, ItemLossRecord, SalesRecord, Value, WholesalePriceRecord};
    use rust_decimal_macros::dec;

    const SALES_CSV: &str = "\
Date,Time,Item Code,Quantity Sold(kilo),Unit Selling Price (RMB/kg),Sale or Return,Discount (Yes/No)
2020-07-01,09:15:07.924,102900005117056,0.396,7.6,sale,No
2020-07-01,09:17:27.295,102900005115960,0.849,3.2,return,Yes
2020-07-02,10:01:00.000,102900005115960,,3.2,sale,No
";

    #[test]
    fn loads_sales_with_canonical_columns() {
        let table = load_table::<SalesRecord, _>(SALES_CSV.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.schema().names(),
            vec![
                "Date",
                "Time",
                "ItemCode",
                "QuantitySoldKg",
                "UnitPriceRMBPerKg",
                "SaleOrReturn",
                "Discount"
            ]
        );
        let first = &table.rows()[0];
        assert_eq!(first[0], Value::Date(NaiveDate::from_ymd_opt(2020, 7, 1).unwrap()));
        assert_eq!(first[2], Value::Integer(102900005117056));
        assert_eq!(first[3], Value::Decimal(dec!(0.396)));
        assert_eq!(table.rows()[1][5], Value::from("return"));
    }

    #[test]
    fn header_spacing_and_case_are_ignored() {
        let csv = "\
date,Time,Item Code,Quantity Sold (kilo),Unit Selling Price (RMB/kg),Sale or Return,Discount (Yes/No)
2020-07-01,09:15:07.924,102900005117056,0.396,7.6,sale,No
";
        let table = load_table::<SalesRecord, _>(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0][3], Value::Decimal(dec!(0.396)));
    }

    #[test]
    fn empty_cell_loads_as_null() {
        let table = load_table::<SalesRecord, _>(SALES_CSV.as_bytes()).unwrap();
        assert_eq!(table.rows()[2][3], Value::Null);
    }

    #[test]
    fn renamed_header_is_schema_mismatch() {
        let csv = "Item Code,Item Name,Category,Category Name\n1,a,2,b\n";
        let err = load_table::<Item, _>(csv.as_bytes()).unwrap_err();
        match err {
            LoaderError::Schema(CoreError::SchemaMismatch { table, detail }) => {
                assert_eq!(table, "Items");
                assert!(detail.contains("Category Code"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn bad_number_is_schema_mismatch_with_line() {
        let csv = "Item Code,Item Name,Loss Rate (%)\n1,a,4.39\n2,b,lots\n";
        let err = load_table::<ItemLossRecord, _>(csv.as_bytes()).unwrap_err();
        match err {
            LoaderError::Schema(CoreError::SchemaMismatch { table, detail }) => {
                assert_eq!(table, "ItemLoss");
                assert!(detail.starts_with("line 3"), "{}", detail);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn unknown_sale_kind_is_schema_mismatch() {
        let csv = "\
Date,Time,Item Code,Quantity Sold(kilo),Unit Selling Price (RMB/kg),Sale or Return,Discount (Yes/No)
2020-07-01,09:15:07.924,1,1,1,refund,No
";
        let err = load_table::<SalesRecord, _>(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoaderError::Schema(CoreError::SchemaMismatch { .. })));
    }

    #[test]
    fn short_row_is_schema_mismatch() {
        let csv = "Date,Item Code,Wholesale Price (RMB/kg)\n2020-07-01,1\n";
        let err = load_table::<WholesalePriceRecord, _>(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoaderError::Schema(CoreError::SchemaMismatch { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_file::<Item>(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoaderError::Io { .. }));
    }
}
