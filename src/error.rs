//! Error types for column, table and tuple operations.

use crate::value::DataType;
use thiserror::Error;

/// Errors that can occur while reading or writing table data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Row index out of bounds: {row} (size: {size})")]
    OutOfBounds { row: usize, size: usize },

    #[error("Column is read-only")]
    ReadOnly,

    #[error("Type mismatch: cannot use {found} as {expected}")]
    TypeMismatch { expected: DataType, found: String },

    #[error("Column of type {0} does not accept null values")]
    NullRejected(DataType),

    #[error("This tuple is no longer valid. It has been deleted from its table")]
    InvalidTuple,

    #[error("Duplicate field name in schema: {0}")]
    SchemaConflict(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Column index {index} out of bounds for table with {count} columns")]
    ColumnIndexOutOfBounds { index: usize, count: usize },

    #[error("Row {0} is not a valid row")]
    InvalidRow(usize),

    #[error("Capacity {capacity} can not be less than the row count {rows}")]
    InvalidCapacity { rows: usize, capacity: usize },
}

impl DataError {
    pub(crate) fn mismatch(expected: DataType, found: impl Into<String>) -> Self {
        DataError::TypeMismatch {
            expected,
            found: found.into(),
        }
    }
}

/// Result type for data operations.
pub type DataResult<T> = Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DataError::OutOfBounds { row: 4, size: 3 };
        assert_eq!(err.to_string(), "Row index out of bounds: 4 (size: 3)");

        let err = DataError::NullRejected(DataType::Int);
        assert_eq!(
            err.to_string(),
            "Column of type int does not accept null values"
        );

        let err = DataError::mismatch(DataType::String, "boolean");
        assert_eq!(
            err.to_string(),
            "Type mismatch: cannot use boolean as string"
        );

        let err = DataError::InvalidTuple;
        assert!(err.to_string().contains("no longer valid"));
    }
}
