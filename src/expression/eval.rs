//! Expression evaluation implementation.

use crate::error::DataError;
use crate::expression::operator::{promote, BinaryOperator, CompositeOperator, Function};
use crate::expression::{Expression, ExpressionError, ExpressionResult, UnaryOperator};
use crate::table::{Field, Table};
use crate::tuple::{Tuple, TupleRef};
use crate::value::{DataType, Value};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Source of field values for evaluation.
pub trait EvalContext {
    fn field(&self, name: &str) -> ExpressionResult<Value>;

    /// Declared type of a field, if known.
    fn field_type(&self, _name: &str) -> Option<DataType> {
        None
    }
}

impl EvalContext for TupleRef<'_> {
    fn field(&self, name: &str) -> ExpressionResult<Value> {
        Ok(self.get(name)?)
    }

    fn field_type(&self, name: &str) -> Option<DataType> {
        self.table().column_type(name)
    }
}

impl EvalContext for HashMap<String, Value> {
    fn field(&self, name: &str) -> ExpressionResult<Value> {
        self.get(name)
            .cloned()
            .ok_or_else(|| DataError::UnknownField(name.to_string()).into())
    }

    fn field_type(&self, name: &str) -> Option<DataType> {
        self.get(name).and_then(Value::data_type)
    }
}

/// Evaluator for expressions
pub struct ExpressionEvaluator<'a, C: EvalContext + ?Sized> {
    context: &'a C,
}

impl<'a, C: EvalContext + ?Sized> ExpressionEvaluator<'a, C> {
    pub fn new(context: &'a C) -> Self {
        Self { context }
    }

    /// Evaluate an expression and return the result
    pub fn evaluate(&self, expr: &Expression) -> ExpressionResult<Value> {
        match expr {
            Expression::Literal(value) => Ok(value.clone()),

            Expression::Field(name) => self.context.field(name),

            Expression::Unary { op, operand } => {
                let operand_val = self.evaluate(operand)?;
                self.evaluate_unary_op(*op, operand_val)
            }

            Expression::Binary { op, left, right } => {
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                self.evaluate_binary_op(*op, left_val, right_val)
            }

            Expression::Composite { op, operands } => self.evaluate_composite(*op, operands),

            Expression::If {
                condition,
                then,
                otherwise,
            } => match self.evaluate(condition)? {
                Value::Boolean(true) => self.evaluate(then),
                Value::Boolean(false) | Value::Null => self.evaluate(otherwise),
                other => Err(ExpressionError::TypeMismatch {
                    expected: DataType::Boolean,
                    actual: other.data_type(),
                    context: "if condition".to_string(),
                }),
            },

            Expression::Between { expr, low, high } => {
                let value = self.evaluate(expr)?;
                let low = self.evaluate(low)?;
                let high = self.evaluate(high)?;
                if value.is_null() || low.is_null() || high.is_null() {
                    return Ok(Value::Null);
                }
                let above = compare_values("BETWEEN", &value, &low)?;
                let below = compare_values("BETWEEN", &value, &high)?;
                Ok(Value::Boolean(
                    matches!(above, Some(Ordering::Greater | Ordering::Equal))
                        && matches!(below, Some(Ordering::Less | Ordering::Equal)),
                ))
            }

            Expression::Function { function, args } => self.evaluate_function(*function, args),
        }
    }

    fn evaluate_unary_op(&self, op: UnaryOperator, operand: Value) -> ExpressionResult<Value> {
        match op {
            UnaryOperator::IsNull => Ok(Value::Boolean(operand.is_null())),
            UnaryOperator::IsNotNull => Ok(Value::Boolean(!operand.is_null())),

            UnaryOperator::Not => match operand {
                Value::Null => Ok(Value::Null),
                Value::Boolean(b) => Ok(Value::Boolean(!b)),
                _ => Err(invalid_operands(op.as_str(), &operand, None)),
            },

            UnaryOperator::Negate => match operand {
                Value::Null => Ok(Value::Null),
                Value::Int(n) => Ok(Value::Int(n.wrapping_neg())),
                Value::Long(n) => Ok(Value::Long(n.wrapping_neg())),
                Value::Float(n) => Ok(Value::Float(-n)),
                Value::Double(n) => Ok(Value::Double(-n)),
                _ => Err(invalid_operands(op.as_str(), &operand, None)),
            },
        }
    }

    fn evaluate_binary_op(
        &self,
        op: BinaryOperator,
        left: Value,
        right: Value,
    ) -> ExpressionResult<Value> {
        // NULL propagates through arithmetic and comparison alike
        if left.is_null() || right.is_null() {
            return Ok(Value::Null);
        }

        if op.is_arithmetic() {
            return match numeric_pair(&left, &right) {
                Some(pair) => pair.arithmetic(op),
                None => Err(invalid_operands(op.as_str(), &left, Some(&right))),
            };
        }

        let ordering = compare_values(op.as_str(), &left, &right)?;
        Ok(Value::Boolean(op.holds_for(ordering)))
    }

    /// AND and OR stop at the first operand that decides the result; a NULL
    /// operand makes an otherwise undecided result NULL.
    fn evaluate_composite(
        &self,
        op: CompositeOperator,
        operands: &[Expression],
    ) -> ExpressionResult<Value> {
        let mut saw_null = false;
        let mut true_count = 0usize;

        for operand in operands {
            let value = match self.evaluate(operand)? {
                Value::Null => {
                    saw_null = true;
                    continue;
                }
                Value::Boolean(b) => b,
                other => {
                    return Err(ExpressionError::TypeMismatch {
                        expected: DataType::Boolean,
                        actual: other.data_type(),
                        context: format!("{} operand", op.as_str()),
                    })
                }
            };
            match op {
                CompositeOperator::And if !value => return Ok(Value::Boolean(false)),
                CompositeOperator::Or if value => return Ok(Value::Boolean(true)),
                _ => true_count += usize::from(value),
            }
        }

        if saw_null {
            return Ok(Value::Null);
        }
        Ok(Value::Boolean(match op {
            CompositeOperator::And => true,
            CompositeOperator::Or => false,
            CompositeOperator::Xor => true_count % 2 == 1,
        }))
    }

    fn evaluate_function(&self, function: Function, args: &[Expression]) -> ExpressionResult<Value> {
        if !function.accepts(args.len()) {
            let expected = match function.arity() {
                (min, Some(max)) if min == max => min.to_string(),
                (min, Some(max)) => format!("{} to {}", min, max),
                (min, None) => format!("at least {}", min),
            };
            return Err(ExpressionError::FunctionArgumentCount {
                function: function.name().to_string(),
                expected,
                actual: args.len(),
            });
        }

        let values = args
            .iter()
            .map(|arg| self.evaluate(arg))
            .collect::<ExpressionResult<Vec<_>>>()?;
        let name = function.name();

        match function {
            Function::Concat => {
                let mut out = String::new();
                for value in values.iter().filter(|v| !v.is_null()) {
                    out.push_str(&value.to_string());
                }
                Ok(Value::String(out))
            }

            Function::Coalesce => Ok(values
                .into_iter()
                .find(|v| !v.is_null())
                .unwrap_or(Value::Null)),

            _ if values.iter().any(Value::is_null) => Ok(Value::Null),

            Function::Abs => match &values[0] {
                Value::Int(n) => Ok(Value::Int(n.wrapping_abs())),
                Value::Long(n) => Ok(Value::Long(n.wrapping_abs())),
                Value::Float(n) => Ok(Value::Float(n.abs())),
                Value::Double(n) => Ok(Value::Double(n.abs())),
                other => Err(invalid_operands(name, other, None)),
            },

            Function::Round => match &values[0] {
                Value::Int(n) => Ok(Value::Long(i64::from(*n))),
                Value::Long(n) => Ok(Value::Long(*n)),
                Value::Float(n) => Ok(Value::Long(f64::from(*n).round() as i64)),
                Value::Double(n) => Ok(Value::Long(n.round() as i64)),
                other => Err(invalid_operands(name, other, None)),
            },

            Function::Sqrt => values[0]
                .as_double()
                .map(|n| Value::Double(n.sqrt()))
                .ok_or_else(|| invalid_operands(name, &values[0], None)),

            Function::Min | Function::Max => {
                let (left, right) = match numeric_pair(&values[0], &values[1]) {
                    Some(pair) => pair.into_values(),
                    None => (values[0].clone(), values[1].clone()),
                };
                let ordering = compare_values(name, &left, &right)?;
                let take_left = match function {
                    Function::Min => ordering != Some(Ordering::Greater),
                    _ => ordering != Some(Ordering::Less),
                };
                Ok(if take_left { left } else { right })
            }

            Function::Length => match &values[0] {
                Value::String(s) => Ok(Value::Int(s.chars().count() as i32)),
                other => Err(invalid_operands(name, other, None)),
            },

            Function::Lower => match &values[0] {
                Value::String(s) => Ok(Value::String(s.to_lowercase())),
                other => Err(invalid_operands(name, other, None)),
            },

            Function::Upper => match &values[0] {
                Value::String(s) => Ok(Value::String(s.to_uppercase())),
                other => Err(invalid_operands(name, other, None)),
            },
        }
    }
}

/// A pair of numeric operands promoted to their common type.
enum NumericPair {
    Int(i32, i32),
    Long(i64, i64),
    Float(f32, f32),
    Double(f64, f64),
}

fn numeric_pair(left: &Value, right: &Value) -> Option<NumericPair> {
    let common = promote(left.data_type()?, right.data_type()?)?;
    Some(match common {
        DataType::Int => NumericPair::Int(left.as_int()?, right.as_int()?),
        DataType::Long => NumericPair::Long(left.as_long()?, right.as_long()?),
        DataType::Float => NumericPair::Float(left.as_float()?, right.as_float()?),
        _ => NumericPair::Double(left.as_double()?, right.as_double()?),
    })
}

impl NumericPair {
    fn arithmetic(self, op: BinaryOperator) -> ExpressionResult<Value> {
        Ok(match self {
            NumericPair::Int(a, b) => Value::Int(match op {
                BinaryOperator::Add => a.wrapping_add(b),
                BinaryOperator::Sub => a.wrapping_sub(b),
                BinaryOperator::Mul => a.wrapping_mul(b),
                BinaryOperator::Div => checked(b == 0, || a.wrapping_div(b))?,
                _ => checked(b == 0, || a.wrapping_rem(b))?,
            }),
            NumericPair::Long(a, b) => Value::Long(match op {
                BinaryOperator::Add => a.wrapping_add(b),
                BinaryOperator::Sub => a.wrapping_sub(b),
                BinaryOperator::Mul => a.wrapping_mul(b),
                BinaryOperator::Div => checked(b == 0, || a.wrapping_div(b))?,
                _ => checked(b == 0, || a.wrapping_rem(b))?,
            }),
            NumericPair::Float(a, b) => Value::Float(match op {
                BinaryOperator::Add => a + b,
                BinaryOperator::Sub => a - b,
                BinaryOperator::Mul => a * b,
                BinaryOperator::Div => a / b,
                _ => a % b,
            }),
            NumericPair::Double(a, b) => Value::Double(match op {
                BinaryOperator::Add => a + b,
                BinaryOperator::Sub => a - b,
                BinaryOperator::Mul => a * b,
                BinaryOperator::Div => a / b,
                _ => a % b,
            }),
        })
    }

    fn ordering(&self) -> Option<Ordering> {
        match self {
            NumericPair::Int(a, b) => Some(a.cmp(b)),
            NumericPair::Long(a, b) => Some(a.cmp(b)),
            NumericPair::Float(a, b) => a.partial_cmp(b),
            NumericPair::Double(a, b) => a.partial_cmp(b),
        }
    }

    fn into_values(self) -> (Value, Value) {
        match self {
            NumericPair::Int(a, b) => (Value::Int(a), Value::Int(b)),
            NumericPair::Long(a, b) => (Value::Long(a), Value::Long(b)),
            NumericPair::Float(a, b) => (Value::Float(a), Value::Float(b)),
            NumericPair::Double(a, b) => (Value::Double(a), Value::Double(b)),
        }
    }
}

fn checked<T>(by_zero: bool, op: impl FnOnce() -> T) -> ExpressionResult<T> {
    if by_zero {
        Err(ExpressionError::DivisionByZero)
    } else {
        Ok(op())
    }
}

/// Order two non-null values. `None` means unordered (a NaN operand).
fn compare_values(operator: &str, left: &Value, right: &Value) -> ExpressionResult<Option<Ordering>> {
    if let Some(pair) = numeric_pair(left, right) {
        return Ok(pair.ordering());
    }
    match (left, right) {
        (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
        (Value::Boolean(a), Value::Boolean(b)) => Ok(Some(a.cmp(b))),
        (Value::Date(a), Value::Date(b)) => Ok(Some(a.cmp(b))),
        _ => Err(invalid_operands(operator, left, Some(right))),
    }
}

fn invalid_operands(operator: &str, left: &Value, right: Option<&Value>) -> ExpressionError {
    ExpressionError::InvalidOperandTypes {
        operator: operator.to_string(),
        left_type: left.data_type(),
        right_type: right.and_then(Value::data_type),
    }
}

/// Helper function to evaluate an expression against a context
pub fn evaluate_expression<C: EvalContext + ?Sized>(
    expr: &Expression,
    context: &C,
) -> ExpressionResult<Value> {
    ExpressionEvaluator::new(context).evaluate(expr)
}

/// A boolean expression used as a row filter.
///
/// Rows for which the expression is NULL or fails to evaluate do not match.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    expr: Expression,
}

impl Predicate {
    pub fn new(expr: Expression) -> Self {
        Self { expr }
    }

    pub fn expression(&self) -> &Expression {
        &self.expr
    }

    pub fn test<C: EvalContext + ?Sized>(&self, context: &C) -> bool {
        matches!(
            evaluate_expression(&self.expr, context),
            Ok(Value::Boolean(true))
        )
    }
}

impl From<Expression> for Predicate {
    fn from(expr: Expression) -> Self {
        Predicate::new(expr)
    }
}

/// Helper function to create a predicate from an expression
pub fn expression_to_predicate(expr: Expression) -> Predicate {
    Predicate::new(expr)
}

impl Table {
    /// Evaluate `expr` against one live row.
    pub fn evaluate(&self, row: usize, expr: &Expression) -> ExpressionResult<Value> {
        let tuple = self.tuple(row)?;
        evaluate_expression(expr, &tuple.bind(self))
    }

    /// Tuples of the live rows matching `predicate`, in row order.
    pub fn select(&self, predicate: &Predicate) -> Vec<Tuple> {
        let matches: Vec<Tuple> = self
            .tuples()
            .filter(|tuple| predicate.test(&tuple.bind(self)))
            .collect();
        log::debug!(
            "select {} matched {} of {} rows",
            predicate.expression(),
            matches.len(),
            self.row_count()
        );
        matches
    }

    /// Values of `field` for the rows matching `predicate`.
    pub fn select_values<'f>(
        &self,
        predicate: &Predicate,
        field: impl Into<Field<'f>>,
    ) -> ExpressionResult<Vec<Value>> {
        let field = field.into();
        self.select(predicate)
            .into_iter()
            .map(|tuple| Ok(tuple.get(self, field)?))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    fn context() -> HashMap<String, Value> {
        HashMap::from([
            ("age".to_string(), Value::Int(30)),
            ("big".to_string(), Value::Long(1 << 40)),
            ("score".to_string(), Value::Double(2.5)),
            ("name".to_string(), Value::from("Ada")),
            ("flag".to_string(), Value::Boolean(true)),
            ("nothing".to_string(), Value::Null),
        ])
    }

    fn eval(expr: &Expression) -> ExpressionResult<Value> {
        evaluate_expression(expr, &context())
    }

    fn lit(v: impl Into<Value>) -> Expression {
        Expression::literal(v)
    }

    fn field(name: &str) -> Expression {
        Expression::field(name)
    }

    #[test]
    fn test_wide_conjunction_stays_shallow() {
        let count = 50_000;
        let wide = Expression::all(
            (0..count)
                .map(|i: i32| Expression::ge(field("age"), lit(i % 30)))
                .collect(),
        );
        assert_eq!(wide.depth(), 3);
        assert_eq!(
            crate::expression::visitor::ExpressionStats::of(&wide).nodes,
            1 + 3 * count as usize
        );
        assert_eq!(eval(&wide).unwrap(), Value::Boolean(true));

        let wide_or = Expression::any(
            (0..count)
                .map(|i: i32| Expression::lt(field("age"), lit(i % 30)))
                .collect(),
        );
        assert_eq!(eval(&wide_or).unwrap(), Value::Boolean(false));
    }

    #[test]
    fn test_literal_and_field() {
        assert_eq!(eval(&lit(42)).unwrap(), Value::Int(42));
        assert_eq!(eval(&Expression::null()).unwrap(), Value::Null);
        assert_eq!(eval(&field("name")).unwrap(), Value::from("Ada"));
        assert_eq!(
            eval(&field("missing")).unwrap_err(),
            ExpressionError::Data(DataError::UnknownField("missing".to_string()))
        );
    }

    #[test]
    fn test_arithmetic_promotion() {
        assert_eq!(
            eval(&Expression::add_expr(field("age"), lit(12))).unwrap(),
            Value::Int(42)
        );
        assert_eq!(
            eval(&Expression::add_expr(field("age"), field("big"))).unwrap(),
            Value::Long((1 << 40) + 30)
        );
        assert_eq!(
            eval(&Expression::mul_expr(field("age"), field("score"))).unwrap(),
            Value::Double(75.0)
        );
        assert_eq!(
            eval(&Expression::sub_expr(lit(1.5f32), lit(1))).unwrap(),
            Value::Float(0.5)
        );
        assert_eq!(
            eval(&Expression::div_expr(lit(7), lit(2))).unwrap(),
            Value::Int(3)
        );
        assert_eq!(
            eval(&Expression::mod_expr(lit(-7), lit(3))).unwrap(),
            Value::Int(-1)
        );
        assert_eq!(
            eval(&Expression::add_expr(lit(i32::MAX), lit(1))).unwrap(),
            Value::Int(i32::MIN)
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            eval(&Expression::div_expr(field("age"), lit(0))).unwrap_err(),
            ExpressionError::DivisionByZero
        );
        assert_eq!(
            eval(&Expression::mod_expr(field("big"), lit(0))).unwrap_err(),
            ExpressionError::DivisionByZero
        );
        assert_eq!(
            eval(&Expression::div_expr(lit(1.0), lit(0))).unwrap(),
            Value::Double(f64::INFINITY)
        );
    }

    #[test]
    fn test_invalid_operands() {
        assert_eq!(
            eval(&Expression::add_expr(field("name"), lit(1))).unwrap_err(),
            ExpressionError::InvalidOperandTypes {
                operator: "+".to_string(),
                left_type: Some(DataType::String),
                right_type: Some(DataType::Int),
            }
        );
        assert!(eval(&Expression::lt(field("name"), field("age"))).is_err());
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(
            eval(&Expression::gt(field("age"), lit(29.5))).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            eval(&Expression::eq(field("age"), lit(30i64))).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            eval(&Expression::lt(field("name"), lit("Bob"))).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            eval(&Expression::ne(lit(f64::NAN), lit(f64::NAN))).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            eval(&Expression::eq(field("nothing"), lit(1))).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_three_valued_logic() {
        let null = || field("nothing");
        let t = || lit(true);
        let f = || lit(false);

        assert_eq!(eval(&Expression::and(null(), f())).unwrap(), Value::Boolean(false));
        assert_eq!(eval(&Expression::and(null(), t())).unwrap(), Value::Null);
        assert_eq!(eval(&Expression::or(null(), t())).unwrap(), Value::Boolean(true));
        assert_eq!(eval(&Expression::or(null(), f())).unwrap(), Value::Null);
        assert_eq!(eval(&Expression::xor(t(), f())).unwrap(), Value::Boolean(true));
        assert_eq!(eval(&Expression::xor(t(), t())).unwrap(), Value::Boolean(false));
        assert_eq!(eval(&Expression::not_expr(null())).unwrap(), Value::Null);
        assert_eq!(eval(&Expression::all(vec![])).unwrap(), Value::Boolean(true));
        assert_eq!(eval(&Expression::any(vec![])).unwrap(), Value::Boolean(false));
    }

    #[test]
    fn test_short_circuit() {
        // the failing operand is never reached
        let failing = Expression::gt(Expression::div_expr(lit(1), lit(0)), lit(0));
        assert_eq!(
            eval(&Expression::and(lit(false), failing.clone())).unwrap(),
            Value::Boolean(false)
        );
        assert_eq!(
            eval(&Expression::or(lit(true), failing.clone())).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            eval(&Expression::if_then_else(field("flag"), lit(1), failing)).unwrap(),
            Value::Int(1)
        );
        assert!(eval(&Expression::and(lit(1), lit(true))).is_err());
    }

    #[test]
    fn test_if_and_between() {
        let expr = Expression::if_then_else(
            Expression::between(field("age"), lit(18), lit(30)),
            lit("adult"),
            lit("other"),
        );
        assert_eq!(eval(&expr).unwrap(), Value::from("adult"));

        let expr = Expression::if_then_else(field("nothing"), lit(1), lit(2));
        assert_eq!(eval(&expr).unwrap(), Value::Int(2));

        let expr = Expression::if_then_else(field("age"), lit(1), lit(2));
        assert!(matches!(
            eval(&expr).unwrap_err(),
            ExpressionError::TypeMismatch { .. }
        ));

        assert_eq!(
            eval(&Expression::between(field("score"), lit(3), lit(4))).unwrap(),
            Value::Boolean(false)
        );
        assert_eq!(
            eval(&Expression::between(field("age"), field("nothing"), lit(4))).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_functions() {
        let call = |f, args| eval(&Expression::call(f, args)).unwrap();

        assert_eq!(call(Function::Abs, vec![lit(-4)]), Value::Int(4));
        assert_eq!(call(Function::Abs, vec![lit(-2.5)]), Value::Double(2.5));
        assert_eq!(call(Function::Min, vec![field("age"), lit(7.5)]), Value::Double(7.5));
        assert_eq!(call(Function::Max, vec![field("age"), field("big")]), Value::Long(1 << 40));
        assert_eq!(call(Function::Max, vec![lit("a"), lit("b")]), Value::from("b"));
        assert_eq!(call(Function::Round, vec![lit(2.5)]), Value::Long(3));
        assert_eq!(call(Function::Round, vec![lit(-2.5f32)]), Value::Long(-3));
        assert_eq!(call(Function::Sqrt, vec![lit(16)]), Value::Double(4.0));
        assert_eq!(
            call(Function::Concat, vec![field("name"), lit("-"), field("nothing"), lit(1)]),
            Value::from("Ada-1")
        );
        assert_eq!(call(Function::Length, vec![lit("héllo")]), Value::Int(5));
        assert_eq!(call(Function::Lower, vec![field("name")]), Value::from("ada"));
        assert_eq!(call(Function::Upper, vec![field("name")]), Value::from("ADA"));
        assert_eq!(
            call(Function::Coalesce, vec![field("nothing"), field("age"), lit(1)]),
            Value::Int(30)
        );
        assert_eq!(call(Function::Abs, vec![field("nothing")]), Value::Null);
    }

    #[test]
    fn test_function_errors() {
        assert_eq!(
            eval(&Expression::call(Function::Min, vec![lit(1)])).unwrap_err(),
            ExpressionError::FunctionArgumentCount {
                function: "min".to_string(),
                expected: "2".to_string(),
                actual: 1,
            }
        );
        assert!(matches!(
            eval(&Expression::call(Function::Sqrt, vec![lit("x")])).unwrap_err(),
            ExpressionError::InvalidOperandTypes { .. }
        ));
    }

    #[test]
    fn test_predicate() {
        let ctx = context();
        assert!(Predicate::new(Expression::gt(field("age"), lit(18))).test(&ctx));
        assert!(!Predicate::new(Expression::gt(field("nothing"), lit(18))).test(&ctx));
        assert!(!Predicate::new(Expression::gt(field("missing"), lit(18))).test(&ctx));
        assert!(!expression_to_predicate(lit(1)).test(&ctx));
    }

    #[test]
    fn test_table_select() {
        let schema = Schema::builder()
            .field("name", DataType::String)
            .field("age", DataType::Int)
            .build()
            .unwrap();
        let mut table = Table::new(schema).unwrap();
        for (name, age) in [("ada", 36), ("bob", 17), ("cy", 52)] {
            let row = table.add_row();
            table.set_string(row, "name", name).unwrap();
            table.set_int(row, "age", age).unwrap();
        }
        table.remove_row(2);

        let adults = Predicate::new(Expression::ge(field("age"), lit(18)));
        let tuples = table.select(&adults);
        assert_eq!(tuples.len(), 1);
        assert_eq!(tuples[0].row(), 0);
        assert_eq!(
            table.select_values(&adults, "name").unwrap(),
            vec![Value::from("ada")]
        );

        assert_eq!(
            table
                .evaluate(1, &Expression::add_expr(field("age"), lit(1)))
                .unwrap(),
            Value::Int(18)
        );
        assert!(matches!(
            table.evaluate(2, &field("age")).unwrap_err(),
            ExpressionError::Data(DataError::InvalidRow(2))
        ));
    }
}
