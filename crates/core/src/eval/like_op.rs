//! `LIKE` (§4.1, §4.4). A literal pattern/escape pair compiles to a regex
//! once per LIKE node id and is cached in [`crate::cache::LikeCache`]; a
//! wildcard-free pattern degenerates to a plain byte comparison without
//! ever touching the regex engine.

use std::sync::Arc;

use crate::ast::{ComparisonOp, ExprKind, Expression};
use crate::error::EvalError;
use crate::residual::rebuild_like;
use crate::value::Value;

use super::{eval_comparison, Evaluator};

impl<'a> Evaluator<'a> {
    pub(crate) fn eval_like(
        &mut self,
        node: &Expression,
        value: &Expression,
        pattern: &Expression,
        escape: Option<&Expression>,
    ) -> Result<Value, EvalError> {
        let value_result = self.evaluate(value)?;
        let pattern_result = self.evaluate(pattern)?;
        let escape_result = match escape {
            Some(e) => Some(self.evaluate(e)?),
            None => None,
        };

        if value_result.is_null()
            || pattern_result.is_null()
            || escape_result.as_ref().is_some_and(Value::is_null)
        {
            return Ok(Value::Null);
        }

        // `value`'s residual-ness does not settle anything on its own: a
        // wildcard-free pattern degenerates LIKE into an equality
        // comparison regardless, so that check runs first and is allowed to
        // produce a residual `Comparison::Eq` itself. Only pattern/escape
        // need to be concrete to decide whether the pattern is wildcard-free.
        if pattern_result.is_residual() || escape_result.as_ref().is_some_and(Value::is_residual) {
            return Ok(Value::residual(rebuild_like(
                value_result,
                pattern_result,
                escape_result,
            )));
        }

        let pattern_str = pattern_result
            .as_bytes()
            .ok_or_else(|| EvalError::type_mismatch("LIKE pattern operand must be a string"))?;
        let escape_char = escape_result.as_ref().map(single_char).transpose()?;

        if crate::like::is_plain(pattern_str, escape_char) {
            return eval_comparison(ComparisonOp::Eq, value_result, pattern_result);
        }

        if value_result.is_residual() {
            return Ok(Value::residual(rebuild_like(
                value_result,
                pattern_result,
                escape_result,
            )));
        }

        let value_str = value_result
            .as_bytes()
            .ok_or_else(|| EvalError::type_mismatch("LIKE value operand must be a string"))?;

        let pattern_is_literal = matches!(pattern.kind, ExprKind::Literal(_));
        let escape_is_literal = escape.map_or(true, |e| matches!(e.kind, ExprKind::Literal(_)));

        if !pattern_is_literal || !escape_is_literal {
            let regex = crate::like::compile(pattern_str, escape_char)?;
            return Ok(Value::Bool(run_match(&regex, value_str)?));
        }

        let regex = match self.like_cache.get(node.id) {
            Some(regex) => regex,
            None => {
                let regex = Arc::new(crate::like::compile(pattern_str, escape_char)?);
                self.like_cache.insert(node.id, regex.clone());
                regex
            }
        };
        Ok(Value::Bool(run_match(&regex, value_str)?))
    }
}

fn run_match(regex: &fancy_regex::Regex, haystack: &str) -> Result<bool, EvalError> {
    regex
        .is_match(haystack)
        .map_err(|e| EvalError::wrap_scalar_failure("LIKE pattern evaluation failed", e))
}

fn single_char(v: &Value) -> Result<char, EvalError> {
    let s = v
        .as_bytes()
        .ok_or_else(|| EvalError::type_mismatch("LIKE ESCAPE operand must be a string"))?;
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(EvalError::type_mismatch(
            "LIKE ESCAPE operand must be exactly one character",
        )),
    }
}
