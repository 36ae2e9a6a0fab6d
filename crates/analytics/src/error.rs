use core_types::{CoreError, DataType};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Join key type mismatch: left '{left}' is {left_type}, right '{right}' is {right_type}")]
    JoinKeyTypeMismatch {
        left: String,
        left_type: DataType,
        right: String,
        right_type: DataType,
    },

    #[error("A join needs at least one key pair")]
    EmptyJoinKeys,

    #[error("Invalid aggregate function '{function}' for column '{column}': {reason}")]
    InvalidAggregateFunction {
        function: String,
        column: String,
        reason: String,
    },

    #[error("Invalid rank direction '{0}', expected 'asc' or 'desc'")]
    InvalidRankDirection(String),

    #[error("Column '{column}' must be {expected}, found {found}")]
    ColumnTypeMismatch {
        column: String,
        expected: DataType,
        found: DataType,
    },

    #[error("Cannot compare column '{column}' ({column_type}) with {operand}")]
    PredicateTypeMismatch {
        column: String,
        column_type: DataType,
        operand: String,
    },

    #[error("Arithmetic overflow while computing {0}")]
    ArithmeticOverflow(String),
}
