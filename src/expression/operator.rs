//! Operator and function definitions for expressions.

use crate::value::DataType;
use std::cmp::Ordering;

/// Binary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOperator {
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Sub
                | BinaryOperator::Mul
                | BinaryOperator::Div
                | BinaryOperator::Mod
        )
    }

    pub fn is_comparison(&self) -> bool {
        !self.is_arithmetic()
    }

    /// Get the output type of this operator given input types.
    ///
    /// `Object` operands are only known at evaluation time and are accepted.
    pub fn output_type(&self, left: DataType, right: DataType) -> Option<DataType> {
        if self.is_arithmetic() {
            if left == DataType::Object || right == DataType::Object {
                return Some(DataType::Object);
            }
            return promote(left, right);
        }

        if comparable(left, right) {
            Some(DataType::Boolean)
        } else {
            None
        }
    }

    /// Whether a comparison holds for the given ordering of its operands.
    /// Unordered operands (`None`) only satisfy `!=`; arithmetic operators
    /// never hold.
    pub fn holds_for(&self, ordering: Option<Ordering>) -> bool {
        match self {
            BinaryOperator::Eq => ordering == Some(Ordering::Equal),
            BinaryOperator::Ne => ordering != Some(Ordering::Equal),
            BinaryOperator::Lt => ordering == Some(Ordering::Less),
            BinaryOperator::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            BinaryOperator::Gt => ordering == Some(Ordering::Greater),
            BinaryOperator::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
            _ => false,
        }
    }

    /// Get the display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Eq => "=",
            BinaryOperator::Ne => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
        }
    }
}

/// Wider of two numeric types under int < long < float < double.
pub fn promote(left: DataType, right: DataType) -> Option<DataType> {
    let l = left.numeric_rank()?;
    let r = right.numeric_rank()?;
    Some(if l >= r { left } else { right })
}

/// Numerics compare with each other; other types only with themselves.
pub fn comparable(left: DataType, right: DataType) -> bool {
    left == right
        || left == DataType::Object
        || right == DataType::Object
        || (left.is_numeric() && right.is_numeric())
}

/// Unary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    Negate,
    IsNull,
    IsNotNull,
}

impl UnaryOperator {
    /// Get the output type of this operator given input type
    pub fn output_type(&self, operand: DataType) -> Option<DataType> {
        match self {
            UnaryOperator::Not => match operand {
                DataType::Boolean | DataType::Object => Some(DataType::Boolean),
                _ => None,
            },

            UnaryOperator::Negate if operand.is_numeric() || operand == DataType::Object => {
                Some(operand)
            }
            UnaryOperator::Negate => None,

            UnaryOperator::IsNull | UnaryOperator::IsNotNull => Some(DataType::Boolean),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Not => "NOT",
            UnaryOperator::Negate => "-",
            UnaryOperator::IsNull => "IS NULL",
            UnaryOperator::IsNotNull => "IS NOT NULL",
        }
    }

    /// Whether the operator is written after its operand.
    pub fn is_postfix(&self) -> bool {
        matches!(self, UnaryOperator::IsNull | UnaryOperator::IsNotNull)
    }
}

/// N-ary boolean connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeOperator {
    And,
    Or,
    Xor,
}

impl CompositeOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositeOperator::And => "AND",
            CompositeOperator::Or => "OR",
            CompositeOperator::Xor => "XOR",
        }
    }
}

/// Built-in functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Abs,
    Min,
    Max,
    Round,
    Sqrt,
    Concat,
    Length,
    Lower,
    Upper,
    Coalesce,
}

impl Function {
    pub const ALL: [Function; 10] = [
        Function::Abs,
        Function::Min,
        Function::Max,
        Function::Round,
        Function::Sqrt,
        Function::Concat,
        Function::Length,
        Function::Lower,
        Function::Upper,
        Function::Coalesce,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Function::Abs => "abs",
            Function::Min => "min",
            Function::Max => "max",
            Function::Round => "round",
            Function::Sqrt => "sqrt",
            Function::Concat => "concat",
            Function::Length => "length",
            Function::Lower => "lower",
            Function::Upper => "upper",
            Function::Coalesce => "coalesce",
        }
    }

    /// Look a function up by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Accepted argument counts as `(min, max)`; `None` means unbounded.
    pub fn arity(&self) -> (usize, Option<usize>) {
        match self {
            Function::Abs
            | Function::Round
            | Function::Sqrt
            | Function::Length
            | Function::Lower
            | Function::Upper => (1, Some(1)),
            Function::Min | Function::Max => (2, Some(2)),
            Function::Concat | Function::Coalesce => (1, None),
        }
    }

    pub fn accepts(&self, count: usize) -> bool {
        let (min, max) = self.arity();
        count >= min && max.map_or(true, |max| count <= max)
    }

    /// Static result type for the given argument types.
    pub fn output_type(&self, args: &[DataType]) -> Option<DataType> {
        let numeric = |t: &DataType| t.is_numeric() || *t == DataType::Object;
        match self {
            Function::Abs => args.first().copied().filter(numeric),
            Function::Min | Function::Max => match args {
                [a, b] if *a == DataType::Object || *b == DataType::Object => {
                    Some(DataType::Object)
                }
                [a, b] => promote(*a, *b),
                _ => None,
            },
            Function::Round => args.first().filter(|t| numeric(*t)).map(|_| DataType::Long),
            Function::Sqrt => args.first().filter(|t| numeric(*t)).map(|_| DataType::Double),
            Function::Concat => Some(DataType::String),
            Function::Length => Some(DataType::Int),
            Function::Lower | Function::Upper => match args.first() {
                Some(DataType::String) | Some(DataType::Object) => Some(DataType::String),
                _ => None,
            },
            Function::Coalesce => {
                let first = *args.first()?;
                if args.iter().all(|t| *t == first) {
                    Some(first)
                } else {
                    Some(DataType::Object)
                }
            }
        }
    }
}
