//! Traversal protocol for expression trees.
//!
//! [`walk`] drives a visitor over a tree. For every node it calls
//! [`ExpressionVisitor::visit_expression`] exactly once; around the children
//! of a node that has any it calls [`ExpressionVisitor::down`] once before the
//! first child and [`ExpressionVisitor::up`] once after the last. The calls
//! nest properly, so the number of outstanding `down` calls always equals the
//! depth of the node being visited minus one.
//!
//! Visitors see nodes in pre-order unless they report
//! [`VisitOrder::PostOrder`], in which case each node is visited after its
//! children (and after the matching `up`).

use crate::expression::operator::{CompositeOperator, UnaryOperator};
use crate::expression::Expression;
use crate::value::Value;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitOrder {
    #[default]
    PreOrder,
    PostOrder,
}

pub trait ExpressionVisitor {
    fn visit_expression(&mut self, expr: &Expression);

    /// Entering the children of the node visited last (pre-order) or about
    /// to be visited (post-order).
    fn down(&mut self) {}

    /// Leaving the children entered by the matching `down`.
    fn up(&mut self) {}

    fn order(&self) -> VisitOrder {
        VisitOrder::PreOrder
    }
}

/// Drive `visitor` over the whole tree rooted at `expr`.
pub fn walk<V: ExpressionVisitor + ?Sized>(expr: &Expression, visitor: &mut V) {
    let order = visitor.order();
    walk_node(expr, visitor, order);
}

fn walk_node<V: ExpressionVisitor + ?Sized>(expr: &Expression, visitor: &mut V, order: VisitOrder) {
    if order == VisitOrder::PreOrder {
        visitor.visit_expression(expr);
    }
    let children = expr.children();
    if !children.is_empty() {
        visitor.down();
        for child in children {
            walk_node(child, visitor, order);
        }
        visitor.up();
    }
    if order == VisitOrder::PostOrder {
        visitor.visit_expression(expr);
    }
}

impl Expression {
    pub fn accept<V: ExpressionVisitor + ?Sized>(&self, visitor: &mut V) {
        walk(self, visitor)
    }
}

/// Collects the names of referenced fields, first occurrence first.
#[derive(Debug, Default)]
pub struct ColumnCollector {
    fields: Vec<String>,
    seen: HashSet<String>,
}

impl ColumnCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collect(expr: &Expression) -> Vec<String> {
        let mut collector = Self::new();
        walk(expr, &mut collector);
        collector.fields
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }
}

impl ExpressionVisitor for ColumnCollector {
    fn visit_expression(&mut self, expr: &Expression) {
        if let Expression::Field(name) = expr {
            if self.seen.insert(name.clone()) {
                self.fields.push(name.clone());
            }
        }
    }
}

/// Counts nodes and tracks the tree height.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExpressionStats {
    pub nodes: usize,
    pub fields: usize,
    pub literals: usize,
    pub max_depth: usize,
    depth: usize,
}

impl ExpressionStats {
    pub fn of(expr: &Expression) -> Self {
        let mut stats = Self::default();
        walk(expr, &mut stats);
        stats
    }
}

impl ExpressionVisitor for ExpressionStats {
    fn visit_expression(&mut self, expr: &Expression) {
        self.nodes += 1;
        self.max_depth = self.max_depth.max(self.depth + 1);
        match expr {
            Expression::Field(_) => self.fields += 1,
            Expression::Literal(_) => self.literals += 1,
            _ => {}
        }
    }

    fn down(&mut self) {
        self.depth += 1;
    }

    fn up(&mut self) {
        self.depth -= 1;
    }
}

/// Text pieces placed around and between the children of one node.
#[derive(Debug)]
struct Frame {
    separators: Vec<String>,
    close: String,
    seen: usize,
}

/// Renders an expression as fully parenthesized text.
///
/// The output is also what `Display` for [`Expression`] produces.
#[derive(Debug, Default)]
pub struct ExpressionRenderer {
    out: String,
    stack: Vec<Frame>,
    pending: Option<Frame>,
}

impl ExpressionRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(expr: &Expression) -> String {
        let mut renderer = Self::new();
        walk(expr, &mut renderer);
        renderer.out
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn open(&mut self, open: &str, separators: &[&str], close: impl Into<String>) {
        self.out.push_str(open);
        self.pending = Some(Frame {
            separators: separators.iter().map(|s| s.to_string()).collect(),
            close: close.into(),
            seen: 0,
        });
    }

    fn leaf(&mut self, expr: &Expression) {
        match expr {
            Expression::Field(name) => self.out.push_str(name),
            Expression::Literal(value) => render_literal(&mut self.out, value),
            Expression::Composite { op, .. } => self.out.push_str(match op {
                CompositeOperator::And => "TRUE",
                CompositeOperator::Or | CompositeOperator::Xor => "FALSE",
            }),
            Expression::Function { function, .. } => {
                self.out.push_str(function.name());
                self.out.push_str("()");
            }
            // every other node kind always has children
            _ => {}
        }
    }
}

const COMMA: &[&str] = &[", "];
const BETWEEN: &[&str] = &[" BETWEEN ", " AND "];
const NONE: &[&str] = &[""];

impl ExpressionVisitor for ExpressionRenderer {
    fn visit_expression(&mut self, expr: &Expression) {
        if let Some(parent) = self.stack.last_mut() {
            if parent.seen > 0 {
                let index = (parent.seen - 1).min(parent.separators.len() - 1);
                self.out.push_str(&parent.separators[index]);
            }
            parent.seen += 1;
        }

        if expr.children().is_empty() {
            self.leaf(expr);
            return;
        }

        match expr {
            Expression::Unary { op, .. } if op.is_postfix() => {
                self.open("(", NONE, format!(" {})", op.as_str()))
            }
            Expression::Unary { op, .. } => match op {
                UnaryOperator::Negate => self.open("(-", NONE, ")"),
                _ => self.open(&format!("({} ", op.as_str()), NONE, ")"),
            },
            Expression::Binary { op, .. } => {
                self.open("(", &[format!(" {} ", op.as_str()).as_str()], ")")
            }
            Expression::Composite { op, .. } => {
                self.open("(", &[format!(" {} ", op.as_str()).as_str()], ")")
            }
            Expression::If { .. } => self.open("IF(", COMMA, ")"),
            Expression::Between { .. } => self.open("(", BETWEEN, ")"),
            Expression::Function { function, .. } => {
                let open = format!("{}(", function.name());
                self.open(&open, COMMA, ")")
            }
            Expression::Field(_) | Expression::Literal(_) => {}
        }
    }

    fn down(&mut self) {
        if let Some(frame) = self.pending.take() {
            self.stack.push(frame);
        }
    }

    fn up(&mut self) {
        if let Some(frame) = self.stack.pop() {
            self.out.push_str(&frame.close);
        }
    }
}

fn render_literal(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("NULL"),
        Value::String(s) => {
            out.push('\'');
            out.push_str(&s.replace('\'', "''"));
            out.push('\'');
        }
        Value::Date(_) => {
            out.push('\'');
            out.push_str(&value.to_string());
            out.push('\'');
        }
        other => out.push_str(&other.to_string()),
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ExpressionRenderer::render(self))
    }
}
