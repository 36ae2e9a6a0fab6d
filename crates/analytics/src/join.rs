use crate::error::AnalyticsError;
use core_types::{Field, Row, Schema, Table, Value};
use std::collections::HashMap;

/// Equality conditions for an inner join, plus the aliases used to qualify
/// column names that appear on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    left_alias: String,
    right_alias: String,
    keys: Vec<(String, String)>,
}

impl JoinSpec {
    pub fn new(left_alias: &str, right_alias: &str) -> Self {
        Self {
            left_alias: left_alias.to_string(),
            right_alias: right_alias.to_string(),
            keys: Vec::new(),
        }
    }

    /// Adds the condition `left.left_column = right.right_column`.
    pub fn on(mut self, left_column: &str, right_column: &str) -> Self {
        self.keys.push((left_column.to_string(), right_column.to_string()));
        self
    }

    /// The same join with the sides swapped.
    pub fn flipped(&self) -> Self {
        Self {
            left_alias: self.right_alias.clone(),
            right_alias: self.left_alias.clone(),
            keys: self.keys.iter().map(|(l, r)| (r.clone(), l.clone())).collect(),
        }
    }
}

/// Relational inner join.
///
/// Emits one row per (left, right) pair whose key columns are all equal; rows
/// without a partner are dropped and null keys never match. The output has the
/// left columns followed by the right columns. A name present on both sides is
/// qualified as `alias.Name` on each side. Rows come out in left order, and in
/// right order within one left row.
pub fn inner_join(left: &Table, right: &Table, spec: &JoinSpec) -> Result<Table, AnalyticsError> {
    if spec.keys.is_empty() {
        return Err(AnalyticsError::EmptyJoinKeys);
    }

    let mut left_keys = Vec::with_capacity(spec.keys.len());
    let mut right_keys = Vec::with_capacity(spec.keys.len());
    for (l, r) in &spec.keys {
        let li = left.column_index(l)?;
        let ri = right.column_index(r)?;
        let left_type = left.schema().fields()[li].data_type;
        let right_type = right.schema().fields()[ri].data_type;
        if left_type != right_type {
            return Err(AnalyticsError::JoinKeyTypeMismatch {
                left: l.clone(),
                left_type,
                right: r.clone(),
                right_type,
            });
        }
        left_keys.push(li);
        right_keys.push(ri);
    }

    let schema = joined_schema(left.schema(), right.schema(), spec)?;

    // Build on the right side, probe with the left.
    let mut index: HashMap<Vec<&Value>, Vec<&Row>> = HashMap::new();
    for row in right.rows() {
        let key: Vec<&Value> = right_keys.iter().map(|&i| &row[i]).collect();
        if key.iter().any(|v| v.is_null()) {
            continue;
        }
        index.entry(key).or_default().push(row);
    }

    let mut rows = Vec::new();
    for row in left.rows() {
        let key: Vec<&Value> = left_keys.iter().map(|&i| &row[i]).collect();
        if key.iter().any(|v| v.is_null()) {
            continue;
        }
        if let Some(matches) = index.get(&key) {
            for partner in matches {
                let mut out = Vec::with_capacity(row.len() + partner.len());
                out.extend(row.iter().cloned());
                out.extend(partner.iter().cloned());
                rows.push(out);
            }
        }
    }

    tracing::debug!(
        left_rows = left.len(),
        right_rows = right.len(),
        output_rows = rows.len(),
        "Inner join complete."
    );
    Ok(Table::new(schema, rows)?)
}

fn joined_schema(left: &Schema, right: &Schema, spec: &JoinSpec) -> Result<Schema, AnalyticsError> {
    let qualify = |field: &Field, other: &Schema, alias: &str| {
        if other.contains(&field.name) {
            Field::new(format!("{}.{}", alias, field.name), field.data_type)
        } else {
            field.clone()
        }
    };
    let fields = left
        .fields()
        .iter()
        .map(|f| qualify(f, right, &spec.left_alias))
        .chain(right.fields().iter().map(|f| qualify(f, left, &spec.right_alias)))
        .collect();
    Ok(Schema::new(fields)?)
}
