//! Three-valued AND/OR/NOT (§4.1).
//!
//! Dispatches per-operator from an explicit truth table rather than sharing
//! control flow between AND and OR, per the Design Notes (§9): the
//! reference implementation's AND/OR fall-through is not reproduced here.

use crate::ast::LogicalOp;
use crate::error::EvalError;
use crate::residual::{rebuild_logical, rebuild_not};
use crate::value::Value;

fn is_true(v: &Value) -> bool {
    matches!(v, Value::Bool(true))
}

fn is_false(v: &Value) -> bool {
    matches!(v, Value::Bool(false))
}

pub fn eval_and(left: Value, right: Value) -> Result<Value, EvalError> {
    if is_false(&left) || is_false(&right) {
        return Ok(Value::Bool(false));
    }
    if is_true(&left) && is_true(&right) {
        return Ok(Value::Bool(true));
    }
    if left.is_null() && right.is_null() {
        return Ok(Value::Null);
    }
    if (is_true(&left) && right.is_null()) || (left.is_null() && is_true(&right)) {
        return Ok(Value::Null);
    }
    if left.is_residual() || right.is_residual() {
        if is_true(&left) {
            return Ok(right);
        }
        if is_true(&right) {
            return Ok(left);
        }
        return Ok(Value::residual(rebuild_logical(LogicalOp::And, left, right)));
    }
    Err(EvalError::type_mismatch(
        "AND operands must be boolean, null, or residual",
    ))
}

pub fn eval_or(left: Value, right: Value) -> Result<Value, EvalError> {
    if is_true(&left) || is_true(&right) {
        return Ok(Value::Bool(true));
    }
    if is_false(&left) && is_false(&right) {
        return Ok(Value::Bool(false));
    }
    if left.is_null() && right.is_null() {
        return Ok(Value::Null);
    }
    if (is_false(&left) && right.is_null()) || (left.is_null() && is_false(&right)) {
        return Ok(Value::Null);
    }
    if left.is_residual() || right.is_residual() {
        if is_false(&left) {
            return Ok(right);
        }
        if is_false(&right) {
            return Ok(left);
        }
        return Ok(Value::residual(rebuild_logical(LogicalOp::Or, left, right)));
    }
    Err(EvalError::type_mismatch(
        "OR operands must be boolean, null, or residual",
    ))
}

pub fn eval_not(operand: Value) -> Result<Value, EvalError> {
    match operand {
        Value::Null => Ok(Value::Null),
        Value::Bool(b) => Ok(Value::Bool(!b)),
        Value::Residual(_) => Ok(Value::residual(rebuild_not(operand))),
        other => Err(EvalError::type_mismatch(format!(
            "NOT operand must be boolean, null, or residual, got {other:?}"
        ))),
    }
}
