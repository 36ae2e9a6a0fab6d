use crate::error::AnalyticsError;
use core_types::{DataType, Field, Schema, Table, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    /// Maps an ascending comparison onto this direction.
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Parses `asc`/`desc` (or the long forms). Any other text raises
/// `InvalidRankDirection`.
impl FromStr for SortDirection {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(AnalyticsError::InvalidRankDirection(s.to_string())),
        }
    }
}

/// Appends a dense rank of `order_by` within each partition.
///
/// Rank 1 goes to the best value in the partition under `direction`; rows with
/// equal values share a rank and the next distinct value gets the next integer,
/// so ranks are contiguous. Rows keep their input order. An empty `partition`
/// ranks the whole table as one partition.
pub fn dense_rank(
    table: &Table,
    partition: &[&str],
    order_by: &str,
    direction: SortDirection,
    output: &str,
) -> Result<Table, AnalyticsError> {
    let partition_idx = partition
        .iter()
        .map(|c| table.column_index(c))
        .collect::<Result<Vec<_>, _>>()?;
    let order_idx = table.column_index(order_by)?;

    let mut partitions: HashMap<Vec<&Value>, Vec<usize>> = HashMap::new();
    for (i, row) in table.rows().iter().enumerate() {
        let key = partition_idx.iter().map(|&p| &row[p]).collect();
        partitions.entry(key).or_default().push(i);
    }

    let mut ranks = vec![0i64; table.len()];
    for members in partitions.values() {
        let mut ordered = members.clone();
        ordered.sort_by(|&a, &b| {
            direction.apply(table.rows()[a][order_idx].cmp(&table.rows()[b][order_idx]))
        });

        let mut rank = 0i64;
        let mut previous: Option<&Value> = None;
        for &i in &ordered {
            let value = &table.rows()[i][order_idx];
            if previous != Some(value) {
                rank += 1;
                previous = Some(value);
            }
            ranks[i] = rank;
        }
    }

    let mut fields = table.schema().fields().to_vec();
    fields.push(Field::new(output, DataType::Integer));
    let rows = table
        .rows()
        .iter()
        .zip(ranks)
        .map(|(row, rank)| {
            let mut out = row.clone();
            out.push(Value::Integer(rank));
            out
        })
        .collect();

    tracing::debug!(partitions = partitions.len(), order_by, "Computed dense rank.");
    Ok(Table::new(Schema::new(fields)?, rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn revenue_by_category() -> Table {
        let schema = Schema::new(vec![
            Field::new("Month", DataType::Integer),
            Field::new("CategoryName", DataType::Text),
            Field::new("Revenue", DataType::Decimal),
        ])
        .unwrap();
        Table::new(
            schema,
            vec![
                vec![1i64.into(), "A".into(), dec!(200).into()],
                vec![1i64.into(), "B".into(), dec!(200.00).into()],
                vec![1i64.into(), "C".into(), dec!(50).into()],
                vec![1i64.into(), "D".into(), dec!(10).into()],
                vec![2i64.into(), "A".into(), dec!(5).into()],
                vec![2i64.into(), "B".into(), dec!(90).into()],
            ],
        )
        .unwrap()
    }

    fn ranks(table: &Table) -> Vec<i64> {
        table
            .column("Rank")
            .unwrap()
            .into_iter()
            .map(|v| v.as_i64().unwrap())
            .collect()
    }

    #[test]
    fn ties_share_rank_without_gaps() {
        let ranked = dense_rank(
            &revenue_by_category(),
            &["Month"],
            "Revenue",
            SortDirection::Descending,
            "Rank",
        )
        .unwrap();
        assert_eq!(ranks(&ranked), vec![1, 1, 2, 3, 2, 1]);
    }

    #[test]
    fn every_partition_starts_at_one_and_is_contiguous() {
        let ranked = dense_rank(
            &revenue_by_category(),
            &["Month"],
            "Revenue",
            SortDirection::Ascending,
            "Rank",
        )
        .unwrap();
        for month in [1i64, 2] {
            let mut seen: Vec<i64> = ranked
                .rows()
                .iter()
                .filter(|r| r[0] == Value::Integer(month))
                .map(|r| r[3].as_i64().unwrap())
                .collect();
            seen.sort();
            seen.dedup();
            let expected: Vec<i64> = (1..=seen.len() as i64).collect();
            assert_eq!(seen, expected);
        }
    }

    #[test]
    fn empty_partition_ranks_whole_table() {
        let ranked = dense_rank(
            &revenue_by_category(),
            &[],
            "Revenue",
            SortDirection::Descending,
            "Rank",
        )
        .unwrap();
        assert_eq!(ranks(&ranked), vec![1, 1, 3, 4, 5, 2]);
    }

    #[test]
    fn parses_direction() {
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Descending);
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Ascending);
        assert_eq!(
            "sideways".parse::<SortDirection>().unwrap_err(),
            AnalyticsError::InvalidRankDirection("sideways".to_string())
        );
    }

    #[test]
    fn empty_table_gets_rank_column() {
        let empty = Table::empty(revenue_by_category().schema().clone());
        let ranked = dense_rank(&empty, &["Month"], "Revenue", SortDirection::Descending, "Rank").unwrap();
        assert!(ranked.is_empty());
        assert_eq!(ranked.schema().names().last(), Some(&"Rank"));
    }
}
