//! Type checking for expressions.
//!
//! The checker is a post-order visitor: every node is typed after its
//! children, whose types sit on top of a stack. `None` stands for a NULL
//! literal, and `Object` fields are only known at evaluation time; both are
//! accepted wherever a typed operand is expected.

use crate::error::DataError;
use crate::expression::operator::{comparable, promote};
use crate::expression::visitor::{walk, ExpressionVisitor, VisitOrder};
use crate::expression::{Expression, ExpressionError, ExpressionResult};
use crate::schema::Schema;
use crate::value::DataType;

/// Type checker for expressions
pub struct TypeChecker<'a> {
    /// Schema defining the types of referenced fields
    schema: &'a Schema,
    stack: Vec<Option<DataType>>,
    error: Option<ExpressionError>,
}

fn is_boolean(t: Option<DataType>) -> bool {
    matches!(t, None | Some(DataType::Boolean) | Some(DataType::Object))
}

impl<'a> TypeChecker<'a> {
    /// Create a new type checker with the given schema
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            stack: Vec::new(),
            error: None,
        }
    }

    /// Type check an expression and return its output type. `None` means the
    /// expression is a NULL literal.
    pub fn check(&mut self, expr: &Expression) -> ExpressionResult<Option<DataType>> {
        self.stack.clear();
        self.error = None;
        walk(expr, self);
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        Ok(self.stack.pop().flatten())
    }

    /// Check if an expression is valid for use as a filter predicate
    pub fn check_filter_predicate(&mut self, expr: &Expression) -> ExpressionResult<()> {
        let output_type = self.check(expr)?;
        if is_boolean(output_type) {
            Ok(())
        } else {
            Err(ExpressionError::TypeMismatch {
                expected: DataType::Boolean,
                actual: output_type,
                context: "filter predicate".to_string(),
            })
        }
    }

    fn type_of(
        &self,
        expr: &Expression,
        children: &[Option<DataType>],
    ) -> ExpressionResult<Option<DataType>> {
        let unknown = |t: &Option<DataType>| matches!(t, None | Some(DataType::Object));

        match expr {
            Expression::Literal(value) => Ok(value.data_type()),

            Expression::Field(name) => self
                .schema
                .index_of(name)
                .and_then(|i| self.schema.column_type(i))
                .map(Some)
                .ok_or_else(|| DataError::UnknownField(name.clone()).into()),

            Expression::Unary { op, .. } => match children[0] {
                None => Ok(op.output_type(DataType::Object)),
                Some(operand) => match op.output_type(operand) {
                    Some(t) => Ok(Some(t)),
                    None => Err(ExpressionError::InvalidOperandTypes {
                        operator: op.as_str().to_string(),
                        left_type: Some(operand),
                        right_type: None,
                    }),
                },
            },

            Expression::Binary { op, .. } => {
                let (left, right) = (children[0], children[1]);
                match (left, right) {
                    (Some(lt), Some(rt)) => match op.output_type(lt, rt) {
                        Some(t) => Ok(Some(t)),
                        None => Err(ExpressionError::InvalidOperandTypes {
                            operator: op.as_str().to_string(),
                            left_type: left,
                            right_type: right,
                        }),
                    },
                    // NULL literals are allowed and will be handled at runtime
                    _ if op.is_comparison() => Ok(Some(DataType::Boolean)),
                    (Some(t), None) | (None, Some(t)) if t.is_numeric() || t == DataType::Object => {
                        Ok(Some(t))
                    }
                    (None, None) => Ok(None),
                    _ => Err(ExpressionError::InvalidOperandTypes {
                        operator: op.as_str().to_string(),
                        left_type: left,
                        right_type: right,
                    }),
                }
            }

            Expression::Composite { op, .. } => {
                if let Some(bad) = children.iter().find(|t| !is_boolean(**t)) {
                    return Err(ExpressionError::TypeMismatch {
                        expected: DataType::Boolean,
                        actual: *bad,
                        context: format!("{} operand", op.as_str()),
                    });
                }
                Ok(Some(DataType::Boolean))
            }

            Expression::If { .. } => {
                if !is_boolean(children[0]) {
                    return Err(ExpressionError::TypeMismatch {
                        expected: DataType::Boolean,
                        actual: children[0],
                        context: "if condition".to_string(),
                    });
                }
                Ok(match (children[1], children[2]) {
                    (Some(a), Some(b)) if a == b => Some(a),
                    (Some(a), None) | (None, Some(a)) => Some(a),
                    (None, None) => None,
                    (Some(a), Some(b)) => promote(a, b).or(Some(DataType::Object)),
                })
            }

            Expression::Between { .. } => {
                let value = children[0];
                for bound in &children[1..] {
                    let ok = unknown(&value)
                        || unknown(bound)
                        || matches!((value, bound), (Some(a), Some(b)) if comparable(a, *b));
                    if !ok {
                        return Err(ExpressionError::InvalidOperandTypes {
                            operator: "BETWEEN".to_string(),
                            left_type: value,
                            right_type: *bound,
                        });
                    }
                }
                Ok(Some(DataType::Boolean))
            }

            Expression::Function { function, args } => {
                if !function.accepts(args.len()) {
                    return Err(ExpressionError::TypeCheckFailed {
                        expression: expr.to_string(),
                        reason: format!("wrong number of arguments for {}", function.name()),
                    });
                }
                let types: Vec<DataType> = children
                    .iter()
                    .map(|t| t.unwrap_or(DataType::Object))
                    .collect();
                function
                    .output_type(&types)
                    .map(Some)
                    .ok_or_else(|| ExpressionError::InvalidOperandTypes {
                        operator: function.name().to_string(),
                        left_type: children.first().copied().flatten(),
                        right_type: children.get(1).copied().flatten(),
                    })
            }
        }
    }
}

impl ExpressionVisitor for TypeChecker<'_> {
    fn visit_expression(&mut self, expr: &Expression) {
        let arity = expr.children().len();
        let children = self.stack.split_off(self.stack.len() - arity);
        if self.error.is_some() {
            self.stack.push(Some(DataType::Object));
            return;
        }
        match self.type_of(expr, &children) {
            Ok(t) => self.stack.push(t),
            Err(err) => {
                self.error = Some(err);
                self.stack.push(Some(DataType::Object));
            }
        }
    }

    fn order(&self) -> VisitOrder {
        VisitOrder::PostOrder
    }
}

/// Type check an expression against a schema
pub fn type_check_expression(
    expr: &Expression,
    schema: &Schema,
) -> ExpressionResult<Option<DataType>> {
    TypeChecker::new(schema).check(expr)
}

/// Validate that an expression can be used as a filter predicate
pub fn validate_filter_predicate(expr: &Expression, schema: &Schema) -> ExpressionResult<()> {
    TypeChecker::new(schema).check_filter_predicate(expr)
}
