//! Row-level relational helpers: filter, projection, sort, limit and distinct.

use crate::error::AnalyticsError;
use crate::rank::SortDirection;
use core_types::{DataType, Field, Row, Schema, Table, Value};
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Comparison::Eq => ordering == Ordering::Equal,
            Comparison::Ne => ordering != Ordering::Equal,
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Le => ordering != Ordering::Greater,
            Comparison::Gt => ordering == Ordering::Greater,
            Comparison::Ge => ordering != Ordering::Less,
        }
    }
}

/// The right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(String),
    Literal(Value),
}

/// A single comparison `column <op> operand`.
///
/// Comparisons involving a null never hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    column: String,
    comparison: Comparison,
    operand: Operand,
}

impl Predicate {
    pub fn new(column: &str, comparison: Comparison, operand: Operand) -> Self {
        Self {
            column: column.to_string(),
            comparison,
            operand,
        }
    }

    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Self::new(column, Comparison::Eq, Operand::Literal(value.into()))
    }

    pub fn le(column: &str, value: impl Into<Value>) -> Self {
        Self::new(column, Comparison::Le, Operand::Literal(value.into()))
    }

    /// `column > other`, both columns of the same row.
    pub fn gt_column(column: &str, other: &str) -> Self {
        Self::new(column, Comparison::Gt, Operand::Column(other.to_string()))
    }
}

/// Resolves and checks the predicate once, before any row is touched.
enum BoundOperand<'a> {
    Column(usize),
    Literal(&'a Value),
}

fn bind<'a>(table: &Table, predicate: &'a Predicate) -> Result<(usize, BoundOperand<'a>), AnalyticsError> {
    let idx = table.column_index(&predicate.column)?;
    let column_type = table.schema().fields()[idx].data_type;
    let operand = match &predicate.operand {
        Operand::Column(name) => {
            let other = table.column_index(name)?;
            let other_type = table.schema().fields()[other].data_type;
            if other_type != column_type {
                return Err(AnalyticsError::PredicateTypeMismatch {
                    column: predicate.column.clone(),
                    column_type,
                    operand: format!("column '{}' ({})", name, other_type),
                });
            }
            BoundOperand::Column(other)
        }
        Operand::Literal(value) => {
            if value.data_type() != Some(column_type) {
                return Err(AnalyticsError::PredicateTypeMismatch {
                    column: predicate.column.clone(),
                    column_type,
                    operand: format!("literal '{}'", value),
                });
            }
            BoundOperand::Literal(value)
        }
    };
    Ok((idx, operand))
}

/// Keeps the rows for which the predicate holds, in input order.
pub fn filter(table: &Table, predicate: &Predicate) -> Result<Table, AnalyticsError> {
    let (idx, operand) = bind(table, predicate)?;
    let rows = table
        .rows()
        .iter()
        .filter(|row| {
            let left = &row[idx];
            let right = match &operand {
                BoundOperand::Column(other) => &row[*other],
                BoundOperand::Literal(value) => *value,
            };
            !left.is_null() && !right.is_null() && predicate.comparison.holds(left.cmp(right))
        })
        .cloned()
        .collect();
    Ok(Table::new(table.schema().clone(), rows)?)
}

/// Projects and renames columns: each pair is `(source, output name)`.
pub fn select(table: &Table, columns: &[(&str, &str)]) -> Result<Table, AnalyticsError> {
    let mut indices = Vec::with_capacity(columns.len());
    let mut fields = Vec::with_capacity(columns.len());
    for (source, alias) in columns {
        let idx = table.column_index(source)?;
        indices.push(idx);
        fields.push(Field::new(*alias, table.schema().fields()[idx].data_type));
    }
    let rows = table
        .rows()
        .iter()
        .map(|row| indices.iter().map(|&i| row[i].clone()).collect::<Row>())
        .collect();
    Ok(Table::new(Schema::new(fields)?, rows)?)
}

/// Projects columns without renaming them.
pub fn select_columns(table: &Table, columns: &[&str]) -> Result<Table, AnalyticsError> {
    let pairs: Vec<(&str, &str)> = columns.iter().map(|c| (*c, *c)).collect();
    select(table, &pairs)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            direction: SortDirection::Descending,
        }
    }
}

/// Stable multi-key sort: rows with equal keys keep their input order.
pub fn sort(table: &Table, keys: &[SortKey]) -> Result<Table, AnalyticsError> {
    let bound = keys
        .iter()
        .map(|k| Ok((table.column_index(&k.column)?, k.direction)))
        .collect::<Result<Vec<_>, AnalyticsError>>()?;

    let mut rows = table.rows().to_vec();
    rows.sort_by(|a, b| {
        bound
            .iter()
            .map(|&(idx, direction)| direction.apply(a[idx].cmp(&b[idx])))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    Ok(Table::new(table.schema().clone(), rows)?)
}

/// The first `n` rows.
pub fn limit(table: &Table, n: usize) -> Table {
    table.head(n)
}

/// Removes duplicate rows, keeping the first occurrence of each.
pub fn distinct(table: &Table) -> Result<Table, AnalyticsError> {
    let mut seen: HashSet<&Row> = HashSet::new();
    let rows = table
        .rows()
        .iter()
        .filter(|row| seen.insert(*row))
        .cloned()
        .collect();
    Ok(Table::new(table.schema().clone(), rows)?)
}

/// Fails unless `column` exists and has the given type.
pub fn expect_type(table: &Table, column: &str, expected: DataType) -> Result<usize, AnalyticsError> {
    let idx = table.column_index(column)?;
    let found = table.schema().fields()[idx].data_type;
    if found != expected {
        return Err(AnalyticsError::ColumnTypeMismatch {
            column: column.to_string(),
            expected,
            found,
        });
    }
    Ok(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn prices() -> Table {
        let schema = Schema::new(vec![
            Field::new("ItemCode", DataType::Integer),
            Field::new("Unit", DataType::Decimal),
            Field::new("Wholesale", DataType::Decimal),
            Field::new("Kind", DataType::Text),
        ])
        .unwrap();
        Table::new(
            schema,
            vec![
                vec![1i64.into(), dec!(5).into(), dec!(3).into(), "sale".into()],
                vec![2i64.into(), dec!(2).into(), dec!(3).into(), "return".into()],
                vec![3i64.into(), Value::Null, dec!(1).into(), "sale".into()],
                vec![4i64.into(), dec!(4).into(), dec!(4).into(), "sale".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn filter_literal_equality() {
        let out = filter(&prices(), &Predicate::eq("Kind", "sale")).unwrap();
        let codes: Vec<_> = out.column("ItemCode").unwrap().into_iter().cloned().collect();
        assert_eq!(codes, vec![Value::from(1i64), Value::from(3i64), Value::from(4i64)]);
    }

    #[test]
    fn filter_column_comparison_skips_nulls_and_is_strict() {
        let out = filter(&prices(), &Predicate::gt_column("Unit", "Wholesale")).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.rows()[0][0], Value::from(1i64));
    }

    #[test]
    fn filter_rejects_mistyped_literal() {
        let err = filter(&prices(), &Predicate::eq("ItemCode", "1")).unwrap_err();
        assert!(matches!(err, AnalyticsError::PredicateTypeMismatch { .. }));
    }

    #[test]
    fn select_renames() {
        let out = select(&prices(), &[("ItemCode", "Code"), ("Kind", "Kind")]).unwrap();
        assert_eq!(out.schema().names(), vec!["Code", "Kind"]);
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn sort_is_stable_and_puts_nulls_last_when_descending() {
        let out = sort(&prices(), &[SortKey::desc("Wholesale")]).unwrap();
        let codes: Vec<_> = out.column("ItemCode").unwrap().into_iter().cloned().collect();
        // 4 (4), then 1 and 2 tie on 3 and keep input order, then 3 (1).
        assert_eq!(
            codes,
            vec![Value::from(4i64), Value::from(1i64), Value::from(2i64), Value::from(3i64)]
        );

        let by_unit = sort(&prices(), &[SortKey::desc("Unit")]).unwrap();
        assert_eq!(by_unit.rows()[3][0], Value::from(3i64));
    }

    #[test]
    fn distinct_keeps_first_occurrence() {
        let kinds = select_columns(&prices(), &["Kind"]).unwrap();
        let out = distinct(&kinds).unwrap();
        assert_eq!(out.rows(), &[vec![Value::from("sale")], vec![Value::from("return")]]);
    }

    #[test]
    fn limit_past_end_returns_everything() {
        assert_eq!(limit(&prices(), 10).len(), 4);
        assert_eq!(limit(&prices(), 0).len(), 0);
    }
}
