//! `FUNCTION CALL` (§4.1, §4.5): argument evaluation, null-strictness,
//! registry resolution, and the Optimization-mode determinism gate.

use tracing::debug;

use crate::ast::{Expression, QualifiedName};
use crate::error::EvalError;
use crate::value::Value;

use super::Evaluator;

impl<'a> Evaluator<'a> {
    pub(crate) fn eval_function_call(
        &mut self,
        name: &QualifiedName,
        window: bool,
        distinct: bool,
        args: &[Expression],
    ) -> Result<Value, EvalError> {
        if window {
            return Err(EvalError::unsupported("window function calls are not supported"));
        }
        if distinct {
            return Err(EvalError::unsupported(
                "DISTINCT aggregate qualifiers are not supported on scalar calls",
            ));
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.evaluate(arg)?);
        }

        if values.iter().any(Value::is_null) {
            return Ok(Value::Null);
        }
        if values.iter().any(Value::is_residual) {
            return Ok(Value::residual(rebuild_call(name, values)));
        }

        let arg_types: Vec<_> = itertools::process_results(
            values.iter().map(|v| {
                v.value_type().ok_or_else(|| {
                    EvalError::type_mismatch(format!(
                        "argument to {:?} has no derivable scalar type",
                        name.parts
                    ))
                })
            }),
            |iter| iter.collect(),
        )?;

        let descriptor = self.registry.resolve(name, &arg_types)?;

        if !descriptor.deterministic && !self.is_interpretation() {
            debug!(function = ?name.parts, "skipping fold of non-deterministic function in optimization mode");
            return Ok(Value::residual(rebuild_call(name, values)));
        }

        let session: Option<&dyn crate::resolver::Session> =
            if descriptor.takes_session { Some(self.session) } else { None };
        descriptor.implementation.call(session, &values)
    }
}

fn rebuild_call(name: &QualifiedName, values: Vec<Value>) -> Expression {
    use crate::ast::ExprKind;
    Expression::new(ExprKind::FunctionCall {
        name: name.clone(),
        window: false,
        distinct: false,
        args: values.into_iter().map(crate::literal::value_to_expression).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ExprKind, Literal};
    use crate::eval::tests::{FixedSession, NoCasts, NoDatetime, UnresolvedSymbols};
    use crate::eval::Mode;
    use crate::resolver::{FunctionDescriptor, FunctionRegistry, ScalarFunction};
    use crate::types::ValueType;
    use std::sync::Arc;

    struct Double;
    impl ScalarFunction for Double {
        fn call(&self, _session: Option<&dyn crate::resolver::Session>, args: &[Value]) -> Result<Value, EvalError> {
            match args {
                [Value::Int64(v)] => Ok(Value::Int64(v * 2)),
                _ => Err(EvalError::type_mismatch("double() expects a single bigint argument")),
            }
        }
    }

    struct RandomLike;
    impl ScalarFunction for RandomLike {
        fn call(&self, _session: Option<&dyn crate::resolver::Session>, _args: &[Value]) -> Result<Value, EvalError> {
            Ok(Value::Int64(42))
        }
    }

    struct TestRegistry;
    impl FunctionRegistry for TestRegistry {
        fn resolve(
            &self,
            name: &QualifiedName,
            arg_types: &[ValueType],
        ) -> Result<FunctionDescriptor, EvalError> {
            match name.parts.as_slice() {
                [n] if n == "double" && arg_types == [ValueType::BigInt] => Ok(FunctionDescriptor {
                    deterministic: true,
                    formal_parameter_types: vec![ValueType::BigInt],
                    takes_session: false,
                    implementation: Arc::new(Double),
                }),
                [n] if n == "rand" => Ok(FunctionDescriptor {
                    deterministic: false,
                    formal_parameter_types: vec![],
                    takes_session: false,
                    implementation: Arc::new(RandomLike),
                }),
                _ => Err(EvalError::unsupported(format!("no such function {:?}", name.parts))),
            }
        }
    }

    #[test]
    fn resolves_and_calls_deterministic_function() {
        let mut symbols = UnresolvedSymbols;
        let registry = TestRegistry;
        let session = FixedSession(0);
        let datetime = NoDatetime;
        let casts = NoCasts;
        let mut ev = Evaluator::new(Mode::Optimization(&mut symbols), &registry, &session, &datetime, &casts);

        let expr = Expression::new(ExprKind::FunctionCall {
            name: QualifiedName::bare("double"),
            window: false,
            distinct: false,
            args: vec![Expression::new(ExprKind::Literal(Literal::Long(21)))],
        });
        assert_eq!(ev.evaluate(&expr).unwrap(), Value::Int64(42));
    }

    #[test]
    fn non_deterministic_function_stays_residual_in_optimization_mode() {
        let mut symbols = UnresolvedSymbols;
        let registry = TestRegistry;
        let session = FixedSession(0);
        let datetime = NoDatetime;
        let casts = NoCasts;
        let mut ev = Evaluator::new(Mode::Optimization(&mut symbols), &registry, &session, &datetime, &casts);

        let expr = Expression::new(ExprKind::FunctionCall {
            name: QualifiedName::bare("rand"),
            window: false,
            distinct: false,
            args: vec![],
        });
        assert!(ev.evaluate(&expr).unwrap().is_residual());
    }

    #[test]
    fn null_argument_short_circuits_the_call() {
        let mut symbols = UnresolvedSymbols;
        let registry = TestRegistry;
        let session = FixedSession(0);
        let datetime = NoDatetime;
        let casts = NoCasts;
        let mut ev = Evaluator::new(Mode::Optimization(&mut symbols), &registry, &session, &datetime, &casts);

        let expr = Expression::new(ExprKind::FunctionCall {
            name: QualifiedName::bare("double"),
            window: false,
            distinct: false,
            args: vec![Expression::new(ExprKind::Literal(Literal::Null))],
        });
        assert_eq!(ev.evaluate(&expr).unwrap(), Value::Null);
    }
}
