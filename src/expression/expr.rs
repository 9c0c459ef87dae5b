//! Expression AST definitions.

use crate::expression::operator::{BinaryOperator, CompositeOperator, Function, UnaryOperator};
use crate::value::Value;

/// Expression tree node.
///
/// Nodes are immutable and hold no evaluation state; the same tree can be
/// evaluated against any number of contexts.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal constant value
    Literal(Value),

    /// Reference to a field by name
    Field(String),

    /// Unary operation
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },

    /// Binary operation
    Binary {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// Boolean connective over any number of operands
    Composite {
        op: CompositeOperator,
        operands: Vec<Expression>,
    },

    /// Conditional; only the taken branch is evaluated
    If {
        condition: Box<Expression>,
        then: Box<Expression>,
        otherwise: Box<Expression>,
    },

    /// Inclusive range test `low <= expr <= high`
    Between {
        expr: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
    },

    /// Built-in function call
    Function {
        function: Function,
        args: Vec<Expression>,
    },
}

impl Expression {
    /// Create a literal expression
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    pub fn null() -> Self {
        Expression::Literal(Value::Null)
    }

    /// Create a field reference expression
    pub fn field(name: impl Into<String>) -> Self {
        Expression::Field(name.into())
    }

    /// Create a binary operation expression
    pub fn binary_op(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Create a unary operation expression
    pub fn unary_op(op: UnaryOperator, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn composite(op: CompositeOperator, operands: Vec<Expression>) -> Self {
        Expression::Composite { op, operands }
    }

    /// Create an AND expression
    ///
    /// Evaluation, walking and `depth` recurse once per tree level, so a
    /// left-folded chain of thousands of `and` nodes can exhaust the stack.
    /// Build long conjunctions with [`Expression::all`], which stays flat.
    pub fn and(left: Expression, right: Expression) -> Self {
        Self::composite(CompositeOperator::And, vec![left, right])
    }

    /// Create an OR expression. Long disjunctions belong in [`Expression::any`].
    pub fn or(left: Expression, right: Expression) -> Self {
        Self::composite(CompositeOperator::Or, vec![left, right])
    }

    pub fn xor(left: Expression, right: Expression) -> Self {
        Self::composite(CompositeOperator::Xor, vec![left, right])
    }

    /// AND over all operands. True when empty.
    pub fn all(operands: Vec<Expression>) -> Self {
        Self::composite(CompositeOperator::And, operands)
    }

    /// OR over all operands. False when empty.
    pub fn any(operands: Vec<Expression>) -> Self {
        Self::composite(CompositeOperator::Or, operands)
    }

    /// Create a NOT expression
    pub fn not_expr(operand: Expression) -> Self {
        Self::unary_op(UnaryOperator::Not, operand)
    }

    pub fn negate(operand: Expression) -> Self {
        Self::unary_op(UnaryOperator::Negate, operand)
    }

    /// Create an IS NULL expression
    pub fn is_null(operand: Expression) -> Self {
        Self::unary_op(UnaryOperator::IsNull, operand)
    }

    /// Create an IS NOT NULL expression
    pub fn is_not_null(operand: Expression) -> Self {
        Self::unary_op(UnaryOperator::IsNotNull, operand)
    }

    pub fn eq(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Eq, left, right)
    }

    pub fn ne(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Ne, left, right)
    }

    pub fn lt(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Lt, left, right)
    }

    pub fn le(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Le, left, right)
    }

    pub fn gt(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Gt, left, right)
    }

    pub fn ge(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Ge, left, right)
    }

    pub fn add_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Add, left, right)
    }

    pub fn sub_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Sub, left, right)
    }

    pub fn mul_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Mul, left, right)
    }

    pub fn div_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Div, left, right)
    }

    pub fn mod_expr(left: Expression, right: Expression) -> Self {
        Self::binary_op(BinaryOperator::Mod, left, right)
    }

    pub fn if_then_else(condition: Expression, then: Expression, otherwise: Expression) -> Self {
        Expression::If {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn between(expr: Expression, low: Expression, high: Expression) -> Self {
        Expression::Between {
            expr: Box::new(expr),
            low: Box::new(low),
            high: Box::new(high),
        }
    }

    pub fn call(function: Function, args: Vec<Expression>) -> Self {
        Expression::Function { function, args }
    }

    /// Direct children in evaluation order.
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Literal(_) | Expression::Field(_) => Vec::new(),
            Expression::Unary { operand, .. } => vec![&**operand],
            Expression::Binary { left, right, .. } => vec![&**left, &**right],
            Expression::Composite { operands, .. } => operands.iter().collect(),
            Expression::If {
                condition,
                then,
                otherwise,
            } => vec![&**condition, &**then, &**otherwise],
            Expression::Between { expr, low, high } => vec![&**expr, &**low, &**high],
            Expression::Function { args, .. } => args.iter().collect(),
        }
    }

    /// Check if this expression is a constant (contains no field references)
    pub fn is_constant(&self) -> bool {
        match self {
            Expression::Literal(_) => true,
            Expression::Field(_) => false,
            _ => self.children().into_iter().all(Expression::is_constant),
        }
    }

    /// Height of the tree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(Expression::depth)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_builders() {
        let expr = Expression::literal(10);
        assert_eq!(expr, Expression::Literal(Value::Int(10)));

        let expr = Expression::field("age");
        assert_eq!(expr, Expression::Field("age".to_string()));

        let expr = Expression::and(
            Expression::gt(Expression::field("age"), Expression::literal(18)),
            Expression::is_not_null(Expression::field("name")),
        );
        assert!(matches!(
            expr,
            Expression::Composite {
                op: CompositeOperator::And,
                ref operands,
            } if operands.len() == 2
        ));
    }

    #[test]
    fn test_children() {
        let expr = Expression::if_then_else(
            Expression::field("flag"),
            Expression::literal(1),
            Expression::literal(2),
        );
        assert_eq!(expr.children().len(), 3);
        assert!(Expression::field("x").children().is_empty());
        assert_eq!(
            Expression::call(Function::Concat, vec![Expression::literal("a")])
                .children()
                .len(),
            1
        );
    }

    #[test]
    fn test_is_constant() {
        assert!(Expression::literal(42).is_constant());
        assert!(!Expression::field("a").is_constant());
        assert!(Expression::add_expr(Expression::literal(1), Expression::literal(2)).is_constant());
        assert!(
            !Expression::add_expr(Expression::field("a"), Expression::literal(2)).is_constant()
        );
        assert!(Expression::all(vec![]).is_constant());
    }

    #[test]
    fn test_depth() {
        assert_eq!(Expression::field("a").depth(), 1);
        let expr = Expression::not_expr(Expression::between(
            Expression::field("a"),
            Expression::literal(1),
            Expression::add_expr(Expression::literal(2), Expression::literal(3)),
        ));
        assert_eq!(expr.depth(), 4);
    }
}
