//! `EXTRACT` (§4.1, §4.6): dispatches to the host's [`crate::resolver::DatetimeLibrary`],
//! with the timezone fields answered directly since every datetime scalar
//! in this core is UTC epoch seconds.

use crate::ast::{ExprKind, ExtractField, Expression};
use crate::error::EvalError;
use crate::value::Value;

use super::Evaluator;

impl<'a> Evaluator<'a> {
    pub(crate) fn eval_extract(
        &mut self,
        field: ExtractField,
        operand: &Expression,
    ) -> Result<Value, EvalError> {
        let v = self.evaluate(operand)?;
        if v.is_null() {
            return Ok(Value::Null);
        }
        if v.is_residual() {
            return Ok(Value::residual(Expression::new(ExprKind::Extract {
                field,
                expr: Box::new(crate::literal::value_to_expression(v)),
            })));
        }

        if matches!(field, ExtractField::TimezoneHour | ExtractField::TimezoneMinute) {
            return Ok(Value::Int64(0));
        }

        let epoch_seconds = v
            .as_int64()
            .ok_or_else(|| EvalError::type_mismatch("EXTRACT operand must be a datetime scalar"))?;
        self.datetime.extract(field, epoch_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Literal;
    use crate::eval::tests::{FixedSession, NoCasts, NoFunctions, UnresolvedSymbols};
    use crate::eval::Mode;
    use crate::resolver::DatetimeLibrary;

    struct FixedDatetime;
    impl DatetimeLibrary for FixedDatetime {
        fn extract(&self, field: ExtractField, epoch_seconds: i64) -> Result<Value, EvalError> {
            match field {
                ExtractField::Year => Ok(Value::Int64(1970 + epoch_seconds / (365 * 86400))),
                other => Err(EvalError::unsupported(format!("field {other:?} not supported in test"))),
            }
        }
    }

    #[test]
    fn timezone_fields_are_always_utc() {
        let mut symbols = UnresolvedSymbols;
        let registry = NoFunctions;
        let session = FixedSession(0);
        let datetime = FixedDatetime;
        let casts = NoCasts;
        let mut ev = Evaluator::new(Mode::Optimization(&mut symbols), &registry, &session, &datetime, &casts);

        let expr = Expression::new(ExprKind::Extract {
            field: ExtractField::TimezoneHour,
            expr: Box::new(Expression::new(ExprKind::Literal(Literal::Timestamp(0)))),
        });
        assert_eq!(ev.evaluate(&expr).unwrap(), Value::Int64(0));
    }

    #[test]
    fn delegates_non_timezone_fields_to_the_datetime_library() {
        let mut symbols = UnresolvedSymbols;
        let registry = NoFunctions;
        let session = FixedSession(0);
        let datetime = FixedDatetime;
        let casts = NoCasts;
        let mut ev = Evaluator::new(Mode::Optimization(&mut symbols), &registry, &session, &datetime, &casts);

        let expr = Expression::new(ExprKind::Extract {
            field: ExtractField::Year,
            expr: Box::new(Expression::new(ExprKind::Literal(Literal::Timestamp(0)))),
        });
        assert_eq!(ev.evaluate(&expr).unwrap(), Value::Int64(1970));
    }

    #[test]
    fn null_operand_propagates() {
        let mut symbols = UnresolvedSymbols;
        let registry = NoFunctions;
        let session = FixedSession(0);
        let datetime = FixedDatetime;
        let casts = NoCasts;
        let mut ev = Evaluator::new(Mode::Optimization(&mut symbols), &registry, &session, &datetime, &casts);

        let expr = Expression::new(ExprKind::Extract {
            field: ExtractField::Year,
            expr: Box::new(Expression::new(ExprKind::Literal(Literal::Null))),
        });
        assert_eq!(ev.evaluate(&expr).unwrap(), Value::Null);
    }
}
