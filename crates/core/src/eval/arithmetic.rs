//! Arithmetic: `+ − × ÷ %` and unary negation, with int64/f64 widening
//! (§4.1). Grounded on `surrealdb-surrealdb/core/src/fnc/operate.rs`'s flat
//! `add`/`sub`/`mul`/`div` operator functions and their colocated tests.

use crate::ast::ArithmeticOp;
use crate::error::EvalError;
use crate::literal::rebuild_arithmetic;
use crate::value::Value;

pub fn eval_arithmetic(op: ArithmeticOp, left: Value, right: Value) -> Result<Value, EvalError> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }
    if left.is_residual() || right.is_residual() {
        return Ok(Value::residual(rebuild_arithmetic(op, left, right)));
    }
    match (&left, &right) {
        (Value::Int64(a), Value::Int64(b)) => apply_int(op, *a, *b),
        (Value::Int64(_) | Value::Float64(_), Value::Int64(_) | Value::Float64(_)) => {
            let a = as_f64(&left).expect("checked numeric above");
            let b = as_f64(&right).expect("checked numeric above");
            Ok(Value::Float64(apply_float(op, a, b)))
        }
        _ => Err(EvalError::type_mismatch(format!(
            "arithmetic requires numeric operands, got {left:?} and {right:?}"
        ))),
    }
}

pub fn eval_negate(operand: Value) -> Result<Value, EvalError> {
    match operand {
        Value::Null => Ok(Value::Null),
        Value::Int64(v) => Ok(Value::Int64(v.wrapping_neg())),
        Value::Float64(v) => Ok(Value::Float64(-v)),
        Value::Residual(expr) => Ok(Value::residual(crate::ast::Expression::new(
            crate::ast::ExprKind::Negative(expr),
        ))),
        other => Err(EvalError::type_mismatch(format!(
            "negation requires a numeric operand, got {other:?}"
        ))),
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int64(v) => Some(*v as f64),
        Value::Float64(v) => Some(*v),
        _ => None,
    }
}

fn apply_int(op: ArithmeticOp, a: i64, b: i64) -> Result<Value, EvalError> {
    let result = match op {
        ArithmeticOp::Add => a.wrapping_add(b),
        ArithmeticOp::Sub => a.wrapping_sub(b),
        ArithmeticOp::Mul => a.wrapping_mul(b),
        ArithmeticOp::Div => {
            if b == 0 {
                return Err(EvalError::scalar_failure("integer division by zero"));
            }
            a.wrapping_div(b)
        }
        ArithmeticOp::Mod => {
            if b == 0 {
                return Err(EvalError::scalar_failure("integer modulo by zero"));
            }
            a.wrapping_rem(b)
        }
    };
    Ok(Value::Int64(result))
}

fn apply_float(op: ArithmeticOp, a: f64, b: f64) -> f64 {
    match op {
        ArithmeticOp::Add => a + b,
        ArithmeticOp::Sub => a - b,
        ArithmeticOp::Mul => a * b,
        ArithmeticOp::Div => a / b,
        ArithmeticOp::Mod => a % b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_arithmetic_stays_int() {
        let r = eval_arithmetic(ArithmeticOp::Add, Value::Int64(3), Value::Int64(4)).unwrap();
        assert_eq!(r, Value::Int64(7));
    }

    #[test]
    fn mixed_int_float_widens_to_float() {
        let r = eval_arithmetic(ArithmeticOp::Add, Value::Int64(3), Value::Float64(4.0)).unwrap();
        assert_eq!(r, Value::Float64(7.0));
    }

    #[test]
    fn chained_expression_matches_spec_scenario() {
        // (3 + 4) * 2 => 14 (int64)
        let sum = eval_arithmetic(ArithmeticOp::Add, Value::Int64(3), Value::Int64(4)).unwrap();
        let product = eval_arithmetic(ArithmeticOp::Mul, sum, Value::Int64(2)).unwrap();
        assert_eq!(product, Value::Int64(14));

        // (3 + 4.0) * 2 => 14.0 (f64)
        let sum = eval_arithmetic(ArithmeticOp::Add, Value::Int64(3), Value::Float64(4.0)).unwrap();
        let product = eval_arithmetic(ArithmeticOp::Mul, sum, Value::Int64(2)).unwrap();
        assert_eq!(product, Value::Float64(14.0));
    }

    #[test]
    fn div_int() {
        let r = eval_arithmetic(ArithmeticOp::Div, Value::Int64(5), Value::Int64(4)).unwrap();
        assert_eq!(r, Value::Int64(1));
    }

    #[test]
    fn div_float() {
        let r =
            eval_arithmetic(ArithmeticOp::Div, Value::Float64(5.0), Value::Float64(4.0)).unwrap();
        assert_eq!(r, Value::Float64(1.25));
    }

    #[test]
    fn int_division_by_zero_is_fatal() {
        let err = eval_arithmetic(ArithmeticOp::Div, Value::Int64(1), Value::Int64(0));
        assert!(err.is_err());
    }

    #[test]
    fn float_division_by_zero_yields_infinity() {
        let r =
            eval_arithmetic(ArithmeticOp::Div, Value::Float64(1.0), Value::Float64(0.0)).unwrap();
        assert_eq!(r, Value::Float64(f64::INFINITY));
    }

    #[test]
    fn null_propagates() {
        let r = eval_arithmetic(ArithmeticOp::Add, Value::Null, Value::Int64(1)).unwrap();
        assert_eq!(r, Value::Null);
    }

    #[test]
    fn negation_mirrors_widening_rule() {
        assert_eq!(eval_negate(Value::Int64(5)).unwrap(), Value::Int64(-5));
        assert_eq!(eval_negate(Value::Float64(5.0)).unwrap(), Value::Float64(-5.0));
        assert_eq!(eval_negate(Value::Null).unwrap(), Value::Null);
    }
}
