use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Schema mismatch in table '{table}': {detail}")]
    SchemaMismatch { table: String, detail: String },

    #[error("Unknown column '{column}'. Available columns: {available}")]
    UnknownColumn { column: String, available: String },

    #[error("Duplicate column '{0}' in schema")]
    DuplicateColumn(String),
}

impl CoreError {
    pub fn schema_mismatch(table: impl Into<String>, detail: impl Into<String>) -> Self {
        CoreError::SchemaMismatch {
            table: table.into(),
            detail: detail.into(),
        }
    }
}
