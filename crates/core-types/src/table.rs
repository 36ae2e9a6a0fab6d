use crate::enums::DataType;
use crate::error::CoreError;
use crate::value::Value;
use serde::Serialize;
use std::collections::HashSet;

/// A single row: one value per schema field, in schema order.
pub type Row = Vec<Value>;

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// An ordered list of uniquely named fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Result<Self, CoreError> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(CoreError::DuplicateColumn(field.name.clone()));
            }
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Resolves a column name to its position.
    pub fn index_of(&self, name: &str) -> Result<usize, CoreError> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| CoreError::UnknownColumn {
                column: name.to_string(),
                available: self.names().join(", "),
            })
    }

    /// Checks that this schema has exactly the expected names and types, in order.
    pub fn conform(&self, expected: &Schema, table: &str) -> Result<(), CoreError> {
        if self.len() != expected.len() {
            return Err(CoreError::schema_mismatch(
                table,
                format!(
                    "expected {} columns [{}], found {} [{}]",
                    expected.len(),
                    expected.names().join(", "),
                    self.len(),
                    self.names().join(", ")
                ),
            ));
        }
        for (actual, wanted) in self.fields.iter().zip(&expected.fields) {
            if actual != wanted {
                return Err(CoreError::schema_mismatch(
                    table,
                    format!(
                        "expected column '{}' of type {}, found '{}' of type {}",
                        wanted.name, wanted.data_type, actual.name, actual.data_type
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// An immutable, in-memory table. Every operation returns a new table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    schema: Schema,
    rows: Vec<Row>,
}

impl Table {
    /// Builds a table, checking every row against the schema.
    ///
    /// A cell must be `Null` or hold the type of its field.
    pub fn new(schema: Schema, rows: Vec<Row>) -> Result<Self, CoreError> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != schema.len() {
                return Err(CoreError::schema_mismatch(
                    "<derived>",
                    format!("row {} has {} values, schema has {}", i, row.len(), schema.len()),
                ));
            }
            for (value, field) in row.iter().zip(schema.fields()) {
                if let Some(actual) = value.data_type() {
                    if actual != field.data_type {
                        return Err(CoreError::schema_mismatch(
                            "<derived>",
                            format!(
                                "row {} column '{}' holds {} but the field is {}",
                                i, field.name, actual, field.data_type
                            ),
                        ));
                    }
                }
            }
        }
        Ok(Self { schema, rows })
    }

    pub fn empty(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, CoreError> {
        self.schema.index_of(name)
    }

    /// All values of one column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&Value>, CoreError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Returns a copy with `name` computed from each row.
    ///
    /// An existing column of the same name is replaced in place; otherwise the
    /// column is appended.
    pub fn with_column<F>(&self, name: &str, data_type: DataType, compute: F) -> Result<Table, CoreError>
    where
        F: Fn(&[Value]) -> Value,
    {
        let existing = self.schema.index_of(name).ok();
        let mut fields = self.schema.fields().to_vec();
        match existing {
            Some(idx) => fields[idx] = Field::new(name, data_type),
            None => fields.push(Field::new(name, data_type)),
        }

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let value = compute(row);
                let mut out = row.clone();
                match existing {
                    Some(idx) => out[idx] = value,
                    None => out.push(value),
                }
                out
            })
            .collect();

        Table::new(Schema::new(fields)?, rows)
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        Table {
            schema: self.schema.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    pub fn conform(&self, expected: &Schema, table: &str) -> Result<(), CoreError> {
        self.schema.conform(expected, table)
    }
}
