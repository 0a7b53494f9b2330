//! Literal Reconstructor (§4.2): the inverse of evaluation.
//!
//! Turns a runtime [`Value`] back into an AST literal node. Every node it
//! builds goes through [`Expression::new`], so reconstructed literals get a
//! fresh [`NodeId`] — the cache-identity property the residual rewriter
//! relies on (§4.3, §9).

use crate::ast::{ArithmeticOp, ExprKind, Expression, Literal, QualifiedName};
use crate::value::Value;

/// `value_to_expression` from the spec. Panics (via `unreachable!`) only on
/// a value tag that cannot occur — this is a programming-error guard, not a
/// reportable [`crate::error::EvalError`] (§4.2).
pub fn value_to_expression(value: Value) -> Expression {
    match value {
        Value::Int64(v) => Expression::new(ExprKind::Literal(Literal::Long(v))),
        Value::Float64(v) => float_to_expression(v),
        Value::Bytes(v) => Expression::new(ExprKind::Literal(Literal::String(v))),
        Value::Bool(v) => Expression::new(ExprKind::Literal(Literal::Boolean(v))),
        Value::Null => Expression::new(ExprKind::Literal(Literal::Null)),
        Value::Residual(expr) => *expr,
    }
}

fn float_to_expression(v: f64) -> Expression {
    if v.is_nan() {
        return nullary_call("nan");
    }
    if v == f64::INFINITY {
        return nullary_call("infinity");
    }
    if v == f64::NEG_INFINITY {
        return Expression::new(ExprKind::Negative(Box::new(nullary_call("infinity"))));
    }
    Expression::new(ExprKind::Literal(Literal::Double(v)))
}

fn nullary_call(name: &str) -> Expression {
    Expression::new(ExprKind::FunctionCall {
        name: QualifiedName::bare(name),
        window: false,
        distinct: false,
        args: Vec::new(),
    })
}

/// Convenience used by the arithmetic/comparison rewriters: widen-then-undo,
/// i.e. rebuild a binary arithmetic node from two (possibly residual)
/// values.
pub fn rebuild_arithmetic(op: ArithmeticOp, left: Value, right: Value) -> Expression {
    Expression::new(ExprKind::Arithmetic {
        op,
        left: Box::new(value_to_expression(left)),
        right: Box::new(value_to_expression(right)),
    })
}
