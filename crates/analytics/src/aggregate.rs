use crate::error::AnalyticsError;
use core_types::{DataType, Field, Row, Schema, Table, Value, round_fixed};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Sum,
    Mean,
    Count,
    CountDistinct,
    Max,
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregateFunction::Sum => "sum",
            AggregateFunction::Mean => "mean",
            AggregateFunction::Count => "count",
            AggregateFunction::CountDistinct => "count_distinct",
            AggregateFunction::Max => "max",
        };
        f.write_str(name)
    }
}

/// Parses a function name from text. Unknown names raise
/// `InvalidAggregateFunction`.
impl FromStr for AggregateFunction {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(AggregateFunction::Sum),
            "mean" | "avg" => Ok(AggregateFunction::Mean),
            "count" => Ok(AggregateFunction::Count),
            "count_distinct" | "countdistinct" => Ok(AggregateFunction::CountDistinct),
            "max" => Ok(AggregateFunction::Max),
            _ => Err(AnalyticsError::InvalidAggregateFunction {
                function: s.to_string(),
                column: String::new(),
                reason: "unknown function".to_string(),
            }),
        }
    }
}

/// One output column of an aggregation: `output = function(input)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub output: String,
    pub function: AggregateFunction,
    pub input: String,
    /// Decimal places to round a decimal result to, half away from zero.
    pub round_dp: Option<u32>,
}

impl Aggregation {
    pub fn new(function: AggregateFunction, input: &str, output: &str) -> Self {
        Self {
            output: output.to_string(),
            function,
            input: input.to_string(),
            round_dp: None,
        }
    }

    pub fn sum(input: &str, output: &str) -> Self {
        Self::new(AggregateFunction::Sum, input, output)
    }

    pub fn mean(input: &str, output: &str) -> Self {
        Self::new(AggregateFunction::Mean, input, output)
    }

    pub fn count(input: &str, output: &str) -> Self {
        Self::new(AggregateFunction::Count, input, output)
    }

    pub fn count_distinct(input: &str, output: &str) -> Self {
        Self::new(AggregateFunction::CountDistinct, input, output)
    }

    pub fn max(input: &str, output: &str) -> Self {
        Self::new(AggregateFunction::Max, input, output)
    }

    pub fn rounded(mut self, dp: u32) -> Self {
        self.round_dp = Some(dp);
        self
    }

    /// The result type for an input column of `input_type`.
    fn output_type(&self, input_type: DataType) -> Result<DataType, AnalyticsError> {
        match self.function {
            AggregateFunction::Sum | AggregateFunction::Mean if !input_type.is_numeric() => {
                Err(AnalyticsError::InvalidAggregateFunction {
                    function: self.function.to_string(),
                    column: self.input.clone(),
                    reason: format!("needs a numeric column, found {}", input_type),
                })
            }
            AggregateFunction::Sum | AggregateFunction::Max => Ok(input_type),
            AggregateFunction::Mean => Ok(DataType::Decimal),
            AggregateFunction::Count | AggregateFunction::CountDistinct => Ok(DataType::Integer),
        }
    }
}

/// Rows of a table partitioned by a key tuple, in order of first appearance.
#[derive(Debug)]
pub struct GroupedTable<'a> {
    table: &'a Table,
    key_fields: Vec<Field>,
    groups: Vec<(Vec<Value>, Vec<usize>)>,
}

/// Groups `table` by the given key columns.
///
/// A group exists only if at least one row carries its key; null is a key
/// value like any other.
pub fn group_by<'a>(table: &'a Table, keys: &[&str]) -> Result<GroupedTable<'a>, AnalyticsError> {
    let key_idx = keys
        .iter()
        .map(|k| table.column_index(k))
        .collect::<Result<Vec<_>, _>>()?;
    let key_fields = key_idx
        .iter()
        .map(|&i| table.schema().fields()[i].clone())
        .collect();

    let mut positions: HashMap<Vec<&Value>, usize> = HashMap::new();
    let mut groups: Vec<(Vec<Value>, Vec<usize>)> = Vec::new();
    for (i, row) in table.rows().iter().enumerate() {
        let key: Vec<&Value> = key_idx.iter().map(|&k| &row[k]).collect();
        match positions.get(&key) {
            Some(&g) => groups[g].1.push(i),
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push((key.into_iter().cloned().collect(), vec![i]));
            }
        }
    }

    Ok(GroupedTable {
        table,
        key_fields,
        groups,
    })
}

impl GroupedTable<'_> {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// One row per group: the key columns, then one column per aggregation.
    ///
    /// Column types are checked before any group is evaluated, so an invalid
    /// aggregation fails even on an empty table.
    pub fn aggregate(&self, aggregations: &[Aggregation]) -> Result<Table, AnalyticsError> {
        let mut fields = self.key_fields.clone();
        let mut inputs = Vec::with_capacity(aggregations.len());
        for agg in aggregations {
            let idx = self.table.column_index(&agg.input)?;
            let input_type = self.table.schema().fields()[idx].data_type;
            fields.push(Field::new(agg.output.clone(), agg.output_type(input_type)?));
            inputs.push((idx, input_type));
        }
        let schema = Schema::new(fields)?;

        // Each group reduces independently; collect keeps group order.
        let rows = self
            .groups
            .par_iter()
            .map(|(key, members)| {
                let mut row: Row = key.clone();
                for (agg, &(idx, input_type)) in aggregations.iter().zip(&inputs) {
                    let values = members.iter().map(|&m| &self.table.rows()[m][idx]);
                    let value = evaluate(agg, input_type, values)?;
                    row.push(match (value, agg.round_dp) {
                        (Value::Decimal(d), Some(dp)) => Value::Decimal(round_fixed(d, dp)),
                        (other, _) => other,
                    });
                }
                Ok(row)
            })
            .collect::<Result<Vec<Row>, AnalyticsError>>()?;

        tracing::debug!(groups = rows.len(), "Aggregation complete.");
        Ok(Table::new(schema, rows)?)
    }
}

fn evaluate<'v>(
    agg: &Aggregation,
    input_type: DataType,
    values: impl Iterator<Item = &'v Value>,
) -> Result<Value, AnalyticsError> {
    let mut present = values.filter(|v| !v.is_null()).peekable();
    let has_values = present.peek().is_some();
    let overflow = || AnalyticsError::ArithmeticOverflow(format!("{}({})", agg.function, agg.input));

    match agg.function {
        AggregateFunction::Count => Ok(Value::Integer(present.count() as i64)),
        AggregateFunction::CountDistinct => {
            let distinct: HashSet<&Value> = present.collect();
            Ok(Value::Integer(distinct.len() as i64))
        }
        AggregateFunction::Max => Ok(present.max().cloned().unwrap_or(Value::Null)),
        _ if !has_values => Ok(Value::Null),
        AggregateFunction::Sum if input_type == DataType::Integer => {
            let mut total: i64 = 0;
            for v in present {
                total = total.checked_add(v.as_i64().unwrap_or(0)).ok_or_else(overflow)?;
            }
            Ok(Value::Integer(total))
        }
        AggregateFunction::Sum => Ok(Value::Decimal(decimal_sum(present).ok_or_else(overflow)?.0)),
        AggregateFunction::Mean => {
            let (total, n) = decimal_sum(present).ok_or_else(overflow)?;
            let mean = total.checked_div(Decimal::from(n)).ok_or_else(overflow)?;
            Ok(Value::Decimal(mean))
        }
    }
}

/// Sum and count of the numeric values, or `None` on overflow.
fn decimal_sum<'v>(values: impl Iterator<Item = &'v Value>) -> Option<(Decimal, u64)> {
    let mut total = Decimal::ZERO;
    let mut n = 0u64;
    for v in values {
        let Some(d) = v.as_decimal() else { continue };
        total = total.checked_add(d)?;
        n += 1;
    }
    Some((total, n))
}
