//! `CAST` (§4.1, §4.6): dispatches to the host's [`crate::resolver::CastLibrary`].

use crate::ast::{ExprKind, Expression};
use crate::error::EvalError;
use crate::value::Value;

use super::Evaluator;

impl<'a> Evaluator<'a> {
    pub(crate) fn eval_cast(
        &mut self,
        operand: &Expression,
        target_type: &str,
    ) -> Result<Value, EvalError> {
        let v = self.evaluate(operand)?;
        if v.is_null() {
            return Ok(Value::Null);
        }
        if v.is_residual() {
            return Ok(Value::residual(Expression::new(ExprKind::Cast {
                expr: Box::new(crate::literal::value_to_expression(v)),
                target_type: target_type.to_string(),
            })));
        }
        self.casts.cast(target_type, &v)
    }
}
