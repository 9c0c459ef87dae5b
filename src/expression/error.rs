//! Error types for expression evaluation.

use crate::error::DataError;
use crate::value::DataType;
use std::fmt;

/// Errors that can occur during expression evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// Field lookup or cell access failed
    Data(DataError),

    /// Operand of the wrong type in a context that requires one type
    TypeMismatch {
        expected: DataType,
        actual: Option<DataType>,
        context: String,
    },

    /// Invalid operand types for operator
    InvalidOperandTypes {
        operator: String,
        left_type: Option<DataType>,
        right_type: Option<DataType>,
    },

    /// Integer division or modulo by zero
    DivisionByZero,

    /// Invalid function name
    UnknownFunction { name: String },

    /// Wrong number of function arguments
    FunctionArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Type checking failed
    TypeCheckFailed { expression: String, reason: String },
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |t: &Option<DataType>| t.map_or("null", |t| t.as_str());
        match self {
            ExpressionError::Data(err) => write!(f, "{}", err),

            ExpressionError::TypeMismatch {
                expected,
                actual,
                context,
            } => {
                write!(
                    f,
                    "Type mismatch in {}: expected {}, got {}",
                    context,
                    expected,
                    name(actual)
                )
            }

            ExpressionError::InvalidOperandTypes {
                operator,
                left_type,
                right_type,
            } => {
                write!(
                    f,
                    "Invalid operand types for operator {}: left={}, right={}",
                    operator,
                    name(left_type),
                    name(right_type)
                )
            }

            ExpressionError::DivisionByZero => write!(f, "Division by zero"),

            ExpressionError::UnknownFunction { name } => {
                write!(f, "Unknown function: {}", name)
            }

            ExpressionError::FunctionArgumentCount {
                function,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Function {} expects {} arguments, got {}",
                    function, expected, actual
                )
            }

            ExpressionError::TypeCheckFailed { expression, reason } => {
                write!(
                    f,
                    "Type check failed for expression '{}': {}",
                    expression, reason
                )
            }
        }
    }
}

impl std::error::Error for ExpressionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExpressionError::Data(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DataError> for ExpressionError {
    fn from(err: DataError) -> Self {
        ExpressionError::Data(err)
    }
}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;
