//! Residual Rewriter (§4.3): repacks operator children back into literal
//! form when an operator must return unreduced.
//!
//! Rewriters never invent semantics; they only reconstruct a structurally
//! valid AST node from the (possibly still-scalar) operands an evaluator
//! already computed. Every node built here goes through [`Expression::new`]
//! by way of [`value_to_expression`], so it always receives a fresh
//! [`crate::ast::NodeId`].

use crate::ast::{ComparisonOp, ExprKind, Expression, LogicalOp};
use crate::literal::value_to_expression;
use crate::value::Value;

pub fn rebuild_comparison(op: ComparisonOp, left: Value, right: Value) -> Expression {
    Expression::new(ExprKind::Comparison {
        op,
        left: Box::new(value_to_expression(left)),
        right: Box::new(value_to_expression(right)),
    })
}

pub fn rebuild_is_distinct_from(left: Value, right: Value) -> Expression {
    Expression::new(ExprKind::IsDistinctFrom {
        left: Box::new(value_to_expression(left)),
        right: Box::new(value_to_expression(right)),
    })
}

pub fn rebuild_logical(op: LogicalOp, left: Value, right: Value) -> Expression {
    Expression::new(ExprKind::Logical {
        op,
        left: Box::new(value_to_expression(left)),
        right: Box::new(value_to_expression(right)),
    })
}

pub fn rebuild_not(operand: Value) -> Expression {
    Expression::new(ExprKind::Not(Box::new(value_to_expression(operand))))
}

pub fn rebuild_between(value: Value, low: Value, high: Value) -> Expression {
    Expression::new(ExprKind::Between {
        value: Box::new(value_to_expression(value)),
        low: Box::new(value_to_expression(low)),
        high: Box::new(value_to_expression(high)),
    })
}

pub fn rebuild_nullif(a: Value, b: Value) -> Expression {
    Expression::new(ExprKind::NullIf {
        a: Box::new(value_to_expression(a)),
        b: Box::new(value_to_expression(b)),
    })
}

pub fn rebuild_if(
    condition: Value,
    then_branch: &Expression,
    else_branch: Option<&Expression>,
) -> Expression {
    Expression::new(ExprKind::If {
        condition: Box::new(value_to_expression(condition)),
        then_branch: Box::new(then_branch.clone()),
        else_branch: else_branch.map(|e| Box::new(e.clone())),
    })
}

pub fn rebuild_in(value: Value, list_elements: Vec<Value>) -> Expression {
    let list = Expression::new(ExprKind::InList(
        list_elements.into_iter().map(value_to_expression).collect(),
    ));
    Expression::new(ExprKind::In {
        value: Box::new(value_to_expression(value)),
        list: Box::new(list),
    })
}

pub fn rebuild_like(value: Value, pattern: Value, escape: Option<Value>) -> Expression {
    Expression::new(ExprKind::Like {
        value: Box::new(value_to_expression(value)),
        pattern: Box::new(value_to_expression(pattern)),
        escape: escape.map(|e| Box::new(value_to_expression(e))),
    })
}
