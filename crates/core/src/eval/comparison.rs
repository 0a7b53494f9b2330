//! `= ≠ < ≤ > ≥`, `IS DISTINCT FROM`, and `BETWEEN` (§4.1). Grounded on
//! `surrealdb-surrealdb/core/src/fnc/operate.rs`'s `less_than`/`more_than`/
//! `equal` family of flat comparison functions.

use std::cmp::Ordering;

use crate::ast::ComparisonOp;
use crate::error::EvalError;
use crate::residual::{rebuild_between, rebuild_comparison, rebuild_is_distinct_from};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CompareError {
    /// Both operands were booleans, but an ordered (not just equality)
    /// comparison was requested; ordered comparisons over booleans are
    /// unsupported (§4.1).
    BoolOrdering,
    /// The operands fall into different type classes entirely (e.g. an
    /// integer against a string) with neither side residual.
    Mismatched,
}

/// Equality/inequality across the type classes the spec names: int64,
/// widened numeric, bytes, and bool.
pub(crate) fn values_equal(left: &Value, right: &Value) -> Result<bool, CompareError> {
    match (left, right) {
        (Value::Int64(a), Value::Int64(b)) => Ok(a == b),
        (Value::Int64(a), Value::Float64(b)) => Ok((*a as f64) == *b),
        (Value::Float64(a), Value::Int64(b)) => Ok(*a == (*b as f64)),
        (Value::Float64(a), Value::Float64(b)) => Ok(a == b),
        (Value::Bytes(a), Value::Bytes(b)) => Ok(a == b),
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        _ => Err(CompareError::Mismatched),
    }
}

/// Ordering across int64/numeric/bytes; `Ok(None)` means the values are in
/// a comparable numeric type class but unordered (NaN on either side).
pub(crate) fn compare_ordering(
    left: &Value,
    right: &Value,
) -> Result<Option<Ordering>, CompareError> {
    match (left, right) {
        (Value::Int64(a), Value::Int64(b)) => Ok(Some(a.cmp(b))),
        (Value::Int64(a), Value::Float64(b)) => Ok((*a as f64).partial_cmp(b)),
        (Value::Float64(a), Value::Int64(b)) => Ok(a.partial_cmp(&(*b as f64))),
        (Value::Float64(a), Value::Float64(b)) => Ok(a.partial_cmp(b)),
        (Value::Bytes(a), Value::Bytes(b)) => Ok(Some(a.as_bytes().cmp(b.as_bytes()))),
        (Value::Bool(_), Value::Bool(_)) => Err(CompareError::BoolOrdering),
        _ => Err(CompareError::Mismatched),
    }
}

fn order_matches(op: ComparisonOp, ordering: Ordering) -> bool {
    match op {
        ComparisonOp::Lt => ordering == Ordering::Less,
        ComparisonOp::Le => ordering != Ordering::Greater,
        ComparisonOp::Gt => ordering == Ordering::Greater,
        ComparisonOp::Ge => ordering != Ordering::Less,
        ComparisonOp::Eq | ComparisonOp::Ne => unreachable!("handled by values_equal"),
    }
}

pub fn eval_comparison(op: ComparisonOp, left: Value, right: Value) -> Result<Value, EvalError> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }
    if left.is_residual() || right.is_residual() {
        return Ok(Value::residual(rebuild_comparison(op, left, right)));
    }

    match op {
        ComparisonOp::Eq | ComparisonOp::Ne => match values_equal(&left, &right) {
            Ok(eq) => Ok(Value::Bool(if op == ComparisonOp::Eq { eq } else { !eq })),
            Err(CompareError::Mismatched) => Ok(Value::residual(rebuild_comparison(
                op, left, right,
            ))),
            Err(CompareError::BoolOrdering) => unreachable!("values_equal never rejects bools"),
        },
        _ => match compare_ordering(&left, &right) {
            Ok(Some(ordering)) => Ok(Value::Bool(order_matches(op, ordering))),
            Ok(None) => Ok(Value::Bool(false)),
            Err(CompareError::BoolOrdering) => Err(EvalError::unsupported(
                "ordered comparison on boolean operands",
            )),
            Err(CompareError::Mismatched) => {
                Ok(Value::residual(rebuild_comparison(op, left, right)))
            }
        },
    }
}

pub fn eval_is_distinct_from(left: Value, right: Value) -> Result<Value, EvalError> {
    if left.is_residual() || right.is_residual() {
        return Ok(Value::residual(rebuild_is_distinct_from(left, right)));
    }
    match (left.is_null(), right.is_null()) {
        (true, true) => Ok(Value::Bool(false)),
        (true, false) | (false, true) => Ok(Value::Bool(true)),
        (false, false) => match values_equal(&left, &right) {
            Ok(eq) => Ok(Value::Bool(!eq)),
            Err(_) => Err(EvalError::type_mismatch(
                "IS DISTINCT FROM on mismatched operand types",
            )),
        },
    }
}

pub fn eval_between(value: Value, low: Value, high: Value) -> Result<Value, EvalError> {
    if value.is_null() || low.is_null() || high.is_null() {
        return Ok(Value::Null);
    }
    if value.is_residual() || low.is_residual() || high.is_residual() {
        return Ok(Value::residual(rebuild_between(value, low, high)));
    }
    let lo_ordering = compare_ordering(&low, &value).map_err(between_error)?;
    let hi_ordering = compare_ordering(&value, &high).map_err(between_error)?;
    let lo_ok = matches!(lo_ordering, Some(Ordering::Less | Ordering::Equal));
    let hi_ok = matches!(hi_ordering, Some(Ordering::Less | Ordering::Equal));
    Ok(Value::Bool(lo_ok && hi_ok))
}

fn between_error(e: CompareError) -> EvalError {
    match e {
        CompareError::BoolOrdering => {
            EvalError::unsupported("BETWEEN is unsupported on boolean operands")
        }
        CompareError::Mismatched => EvalError::type_mismatch("BETWEEN operands are mismatched"),
    }
}
