//! Expression trees over table fields.
//!
//! This module provides:
//! - Expression AST representation
//! - A visitor protocol with a generic traversal driver
//! - Field collection, rendering and statistics visitors
//! - Type checking against a schema
//! - Evaluation against tuples or any other field context

pub mod error;
pub mod eval;
pub mod expr;
pub mod operator;
pub mod type_checker;
pub mod visitor;

pub use error::{ExpressionError, ExpressionResult};
pub use eval::{
    evaluate_expression, expression_to_predicate, EvalContext, ExpressionEvaluator, Predicate,
};
pub use expr::Expression;
pub use operator::{BinaryOperator, CompositeOperator, Function, UnaryOperator};
pub use type_checker::{type_check_expression, validate_filter_predicate, TypeChecker};
pub use visitor::{
    walk, ColumnCollector, ExpressionRenderer, ExpressionStats, ExpressionVisitor, VisitOrder,
};
