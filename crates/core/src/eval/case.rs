//! `COALESCE`, `NULLIF`, `IF`, `CASE` (both forms), and `IN` (§4.1).
//!
//! Unlike the flat operator modules, these need recursive access to the
//! owning [`Evaluator`] — a branch is only evaluated once its guard has
//! resolved, and an unresolved guard means the *whole* construct stays
//! symbolic rather than any attempt at partial reduction of just one arm.

use tracing::debug;

use crate::ast::{ComparisonOp, ExprKind, Expression, WhenClause};
use crate::cache::{InSetEntry, LiteralKey};
use crate::error::EvalError;
use crate::residual::{rebuild_if, rebuild_in, rebuild_nullif};
use crate::value::Value;

use super::{eval_comparison, eval_literal, Evaluator};

impl<'a> Evaluator<'a> {
    pub(crate) fn eval_coalesce(
        &mut self,
        expr: &Expression,
        args: &[Expression],
    ) -> Result<Value, EvalError> {
        for arg in args {
            let v = self.evaluate(arg)?;
            if v.is_residual() {
                return Ok(Value::residual(expr.clone()));
            }
            if !v.is_null() {
                return Ok(v);
            }
        }
        Ok(Value::Null)
    }

    pub(crate) fn eval_nullif(&mut self, a: &Expression, b: &Expression) -> Result<Value, EvalError> {
        let va = self.evaluate(a)?;
        let vb = self.evaluate(b)?;
        if va.is_residual() || vb.is_residual() {
            return Ok(Value::residual(rebuild_nullif(va, vb)));
        }
        match eval_comparison(ComparisonOp::Eq, va.clone(), vb.clone())? {
            Value::Bool(true) => Ok(Value::Null),
            Value::Bool(false) | Value::Null => Ok(va),
            Value::Residual(_) => Ok(Value::residual(rebuild_nullif(va, vb))),
            _ => unreachable!("eval_comparison(Eq, ..) only ever yields bool, null, or residual"),
        }
    }

    pub(crate) fn eval_if(
        &mut self,
        condition: &Expression,
        then_branch: &Expression,
        else_branch: Option<&Expression>,
    ) -> Result<Value, EvalError> {
        let cond = self.evaluate(condition)?;
        if cond.is_residual() {
            return Ok(Value::residual(rebuild_if(cond, then_branch, else_branch)));
        }
        let taken = match &cond {
            Value::Bool(true) => Some(then_branch),
            Value::Bool(false) | Value::Null => else_branch,
            other => {
                return Err(EvalError::type_mismatch(format!(
                    "IF condition must be boolean or null, got {other:?}"
                )))
            }
        };
        match taken {
            Some(branch) => self.evaluate(branch).or_else(move |err| {
                debug!(error = %err, "downgrading IF branch optimization failure to a residual");
                Ok(Value::residual(rebuild_if(cond, then_branch, else_branch)))
            }),
            None => Ok(Value::Null),
        }
    }

    pub(crate) fn eval_searched_case(
        &mut self,
        expr: &Expression,
        whens: &[WhenClause],
        else_branch: Option<&Expression>,
    ) -> Result<Value, EvalError> {
        for clause in whens {
            let cond = self.evaluate(&clause.when)?;
            match cond {
                Value::Bool(true) => return self.evaluate(&clause.then),
                Value::Bool(false) | Value::Null => continue,
                Value::Residual(_) => return Ok(Value::residual(expr.clone())),
                other => {
                    return Err(EvalError::type_mismatch(format!(
                        "CASE WHEN condition must be boolean or null, got {other:?}"
                    )))
                }
            }
        }
        match else_branch {
            Some(branch) => self.evaluate(branch),
            None => Ok(Value::Null),
        }
    }

    pub(crate) fn eval_simple_case(
        &mut self,
        expr: &Expression,
        operand: &Expression,
        whens: &[WhenClause],
        else_branch: Option<&Expression>,
    ) -> Result<Value, EvalError> {
        let operand_value = self.evaluate(operand)?;
        if operand_value.is_residual() {
            return Ok(Value::residual(expr.clone()));
        }
        for clause in whens {
            let candidate = self.evaluate(&clause.when)?;
            if candidate.is_residual() {
                return Ok(Value::residual(expr.clone()));
            }
            match eval_comparison(ComparisonOp::Eq, operand_value.clone(), candidate)? {
                Value::Bool(true) => return self.evaluate(&clause.then),
                Value::Bool(false) | Value::Null => continue,
                Value::Residual(_) => return Ok(Value::residual(expr.clone())),
                _ => unreachable!("eval_comparison(Eq, ..) only ever yields bool, null, or residual"),
            }
        }
        match else_branch {
            Some(branch) => self.evaluate(branch),
            None => Ok(Value::Null),
        }
    }

    /// `IN` (§4.1, §4.4). A constant-only list is hashed once per
    /// [`crate::ast::NodeId`] and every later lookup against that list is a
    /// hash-set probe; a list with any non-literal element falls back to a
    /// linear scan that still honors SQL's match/null/residual precedence
    /// (a later match still wins even after an earlier null or residual).
    pub(crate) fn eval_in(&mut self, value: &Expression, list: &Expression) -> Result<Value, EvalError> {
        let elements = match &list.kind {
            ExprKind::InList(elems) => elems,
            _ => return Err(EvalError::unsupported("IN list operand must be an InList node")),
        };

        let value_result = self.evaluate(value)?;
        if value_result.is_null() {
            return Ok(Value::Null);
        }

        let set_entry = match self.in_set_cache.get(list.id) {
            Some(cached) => cached,
            None => {
                let built = build_in_set(elements)?;
                self.in_set_cache.insert(list.id, built.clone());
                built
            }
        };

        if let InSetEntry::Set(set) = &set_entry {
            if value_result.is_residual() {
                return Ok(Value::residual(Expression::new(ExprKind::In {
                    value: Box::new(crate::literal::value_to_expression(value_result)),
                    list: Box::new(list.clone()),
                })));
            }
            return match LiteralKey::from_value(&value_result) {
                Some(key) => Ok(Value::Bool(set.contains(&key))),
                None => Err(EvalError::type_mismatch(
                    "IN value operand is not a literal-comparable scalar",
                )),
            };
        }

        // No short-circuiting on a match: every element is evaluated so a
        // later element's error (e.g. a division by zero) still surfaces,
        // and precedence between match/null/residual is only decided once
        // the whole list has been visited.
        let mut saw_match = false;
        let mut saw_null = false;
        let mut saw_residual = false;
        let mut evaluated = Vec::with_capacity(elements.len());
        for element in elements {
            let v = self.evaluate(element)?;
            if v.is_residual() {
                saw_residual = true;
            } else if v.is_null() {
                saw_null = true;
            } else if !value_result.is_residual() {
                match eval_comparison(ComparisonOp::Eq, value_result.clone(), v.clone())? {
                    Value::Bool(true) => saw_match = true,
                    Value::Bool(false) => {}
                    Value::Null => saw_null = true,
                    Value::Residual(_) => saw_residual = true,
                    _ => unreachable!("eval_comparison(Eq, ..) only ever yields bool, null, or residual"),
                }
            }
            evaluated.push(v);
        }

        if value_result.is_residual() || saw_residual {
            return Ok(Value::residual(rebuild_in(value_result, evaluated)));
        }
        if saw_match {
            return Ok(Value::Bool(true));
        }
        if saw_null {
            return Ok(Value::Null);
        }
        Ok(Value::Bool(false))
    }
}

fn build_in_set(elements: &[Expression]) -> Result<InSetEntry, EvalError> {
    let mut keys = ahash::AHashSet::default();
    for element in elements {
        match &element.kind {
            ExprKind::Literal(lit) => {
                let v = eval_literal(lit)?;
                match LiteralKey::from_value(&v) {
                    Some(key) => {
                        keys.insert(key);
                    }
                    None => {
                        debug!("IN cache marked unusable: literal element has no hashable key");
                        return Ok(InSetEntry::Unusable);
                    }
                }
            }
            _ => {
                debug!("IN cache marked unusable: list contains a non-literal element");
                return Ok(InSetEntry::Unusable);
            }
        }
    }
    Ok(InSetEntry::Set(std::sync::Arc::new(keys)))
}
