//! The Evaluator: dispatch on expression variant, implementing SQL
//! semantics of each operator (§4.1). This is the ~55% of the core the
//! spec's budget allots to evaluation proper; everything else in the crate
//! is a collaborator this module leans on.

mod arithmetic;
mod case;
mod cast;
mod comparison;
mod extract;
mod function;
mod like_op;
mod logical;

use std::cell::RefCell;
use std::panic;
use std::sync::Once;

use crate::ast::{ExprKind, Expression, Literal};
#[cfg(test)]
use crate::ast::ArithmeticOp;
use crate::cache::{InSetCache, LikeCache};
use crate::error::EvalError;
use crate::resolver::{CastLibrary, DatetimeLibrary, FunctionRegistry, InputResolver, Session, SymbolResolver};
use crate::value::Value;

pub use arithmetic::{eval_arithmetic, eval_negate};
pub use comparison::{eval_between, eval_comparison, eval_is_distinct_from};
pub use logical::{eval_and, eval_not, eval_or};

/// Which resolver backs leaf lookups, and therefore whether the result of
/// evaluation may legally be a residual (§3 Lifecycle, §4.1 Contract).
pub enum Mode<'a> {
    Interpretation(&'a mut dyn InputResolver),
    Optimization(&'a mut dyn SymbolResolver),
}

/// A single evaluator instance over a fixed AST. Holds the two
/// identity-keyed caches and its resolver/registry/session handles for the
/// evaluator's whole lifetime (§3 Lifecycle, §5 Concurrency).
pub struct Evaluator<'a> {
    mode: Mode<'a>,
    registry: &'a dyn FunctionRegistry,
    session: &'a dyn Session,
    datetime: &'a dyn DatetimeLibrary,
    casts: &'a dyn CastLibrary,
    pub(crate) like_cache: LikeCache,
    pub(crate) in_set_cache: InSetCache,
    depth: u32,
    pub max_depth: u32,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        mode: Mode<'a>,
        registry: &'a dyn FunctionRegistry,
        session: &'a dyn Session,
        datetime: &'a dyn DatetimeLibrary,
        casts: &'a dyn CastLibrary,
    ) -> Self {
        Evaluator {
            mode,
            registry,
            session,
            datetime,
            casts,
            like_cache: LikeCache::new(),
            in_set_cache: InSetCache::new(),
            depth: 0,
            max_depth: 512,
        }
    }

    fn is_interpretation(&self) -> bool {
        matches!(self.mode, Mode::Interpretation(_))
    }

    /// Recursive entry point. Wraps the visit in a panic-context guard (so a
    /// panic inside a user scalar function reports which node was being
    /// evaluated) and enforces the depth guard and the Interpretation-mode
    /// "no residual may escape" invariant (§4.1 Contract).
    pub fn evaluate(&mut self, expr: &Expression) -> Result<Value, EvalError> {
        let _panic_ctx = enter_panic(format!("evaluating expression node #{}", expr.id));

        self.depth += 1;
        if self.depth > self.max_depth {
            self.depth -= 1;
            return Err(EvalError::unsupported(
                "expression tree exceeds the configured maximum recursion depth",
            ));
        }
        let result = self.evaluate_inner(expr);
        self.depth -= 1;
        let value = result?;

        if self.is_interpretation() && value.is_residual() {
            return Err(EvalError::type_mismatch(
                "interpretation mode produced a residual value",
            ));
        }
        Ok(value)
    }

    fn evaluate_inner(&mut self, expr: &Expression) -> Result<Value, EvalError> {
        match &expr.kind {
            ExprKind::Literal(lit) => eval_literal(lit),

            ExprKind::QualifiedNameReference(name) => match &mut self.mode {
                Mode::Interpretation(_) => Err(EvalError::unsupported(
                    "qualified name reference encountered in interpretation mode",
                )),
                Mode::Optimization(symbols) => {
                    if !name.is_bare() {
                        Ok(Value::residual(expr.clone()))
                    } else {
                        symbols.lookup(name)
                    }
                }
            },

            ExprKind::InputReference { slot } => match &mut self.mode {
                Mode::Interpretation(input) => input.fetch(*slot),
                Mode::Optimization(_) => Err(EvalError::unsupported(
                    "input reference encountered in optimization mode",
                )),
            },

            ExprKind::CurrentTime {
                is_timestamp,
                precision,
            } => {
                if *is_timestamp && precision.is_none() {
                    Ok(Value::Int64(self.session.current_timestamp()))
                } else {
                    Err(EvalError::unsupported(
                        "only unqualified CURRENT_TIMESTAMP is supported",
                    ))
                }
            }

            ExprKind::Arithmetic { op, left, right } => {
                let l = self.evaluate(left)?;
                let r = self.evaluate(right)?;
                eval_arithmetic(*op, l, r)
            }

            ExprKind::Negative(operand) => {
                let v = self.evaluate(operand)?;
                eval_negate(v)
            }

            ExprKind::Comparison { op, left, right } => {
                let l = self.evaluate(left)?;
                let r = self.evaluate(right)?;
                eval_comparison(*op, l, r)
            }

            ExprKind::IsDistinctFrom { left, right } => {
                let l = self.evaluate(left)?;
                let r = self.evaluate(right)?;
                eval_is_distinct_from(l, r)
            }

            ExprKind::Between { value, low, high } => {
                let v = self.evaluate(value)?;
                let lo = self.evaluate(low)?;
                let hi = self.evaluate(high)?;
                eval_between(v, lo, hi)
            }

            ExprKind::Logical { op, left, right } => {
                let l = self.evaluate(left)?;
                let r = self.evaluate(right)?;
                match op {
                    crate::ast::LogicalOp::And => eval_and(l, r),
                    crate::ast::LogicalOp::Or => eval_or(l, r),
                }
            }

            ExprKind::Not(operand) => {
                let v = self.evaluate(operand)?;
                eval_not(v)
            }

            ExprKind::IsNull(operand) => self.eval_is_null(operand, false),
            ExprKind::IsNotNull(operand) => self.eval_is_null(operand, true),

            ExprKind::In { value, list } => self.eval_in(value, list),

            ExprKind::InList(_) => Err(EvalError::unsupported(
                "an InList node cannot be evaluated outside of IN",
            )),

            ExprKind::Coalesce(args) => self.eval_coalesce(expr, args),

            ExprKind::NullIf { a, b } => self.eval_nullif(a, b),

            ExprKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.eval_if(condition, then_branch, else_branch.as_deref()),

            ExprKind::SearchedCase { whens, else_branch } => {
                self.eval_searched_case(expr, whens, else_branch.as_deref())
            }

            ExprKind::SimpleCase {
                operand,
                whens,
                else_branch,
            } => self.eval_simple_case(expr, operand, whens, else_branch.as_deref()),

            ExprKind::FunctionCall {
                name,
                window,
                distinct,
                args,
            } => self.eval_function_call(name, *window, *distinct, args),

            ExprKind::Like {
                value,
                pattern,
                escape,
            } => self.eval_like(expr, value, pattern, escape.as_deref()),

            ExprKind::Extract { field, expr: inner } => self.eval_extract(*field, inner),

            ExprKind::Cast { expr: inner, target_type } => self.eval_cast(inner, target_type),
        }
    }

    fn eval_is_null(&mut self, operand: &Expression, negate: bool) -> Result<Value, EvalError> {
        let v = self.evaluate(operand)?;
        if v.is_residual() {
            let inner = crate::literal::value_to_expression(v);
            let kind = if negate {
                ExprKind::IsNotNull(Box::new(inner))
            } else {
                ExprKind::IsNull(Box::new(inner))
            };
            return Ok(Value::residual(Expression::new(kind)));
        }
        let is_null = v.is_null();
        Ok(Value::Bool(if negate { !is_null } else { is_null }))
    }
}

/// Evaluates a literal leaf (§4.1 Leaves). Exposed `pub(crate)` so the
/// IN-list cache builder (`eval/case.rs`) can convert constant-only list
/// elements without going through a full `Evaluator`.
pub(crate) fn eval_literal(lit: &Literal) -> Result<Value, EvalError> {
    match lit {
        Literal::Long(v) => Ok(Value::Int64(*v)),
        Literal::Double(v) => Ok(Value::Float64(*v)),
        Literal::String(v) => Ok(Value::Bytes(v.clone())),
        Literal::Boolean(v) => Ok(Value::Bool(*v)),
        Literal::Null => Ok(Value::Null),
        Literal::Date(v) | Literal::Time(v) | Literal::Timestamp(v) | Literal::Interval(v) => {
            Ok(Value::Int64(*v))
        }
        Literal::IntervalYearToMonth(_) => Err(EvalError::unsupported(
            "year-to-month interval literals are not supported",
        )),
    }
}

/// Builder-style option setting for [`Evaluator`], e.g.
/// `Evaluator::new(..).config(|e| e.max_depth = 64)`.
pub trait Config: Sized {
    fn config(mut self, f: impl FnOnce(&mut Self)) -> Self {
        f(&mut self);
        self
    }
}

impl<T> Config for T {}

/// Pushes `context` onto a thread-local breadcrumb trail of in-flight
/// [`Evaluator::evaluate`] calls for the lifetime of the returned guard. The
/// crate installs one panic hook (on first call) that prints the trail
/// before falling through to the default hook, so a panic raised deep inside
/// a user-supplied [`crate::resolver::ScalarFunction`] still names every
/// enclosing expression node.
fn enter_panic(context: String) -> PanicContext {
    static ONCE: Once = Once::new();
    ONCE.call_once(PanicContext::init);

    with_ctx(|ctx| ctx.push(context));
    PanicContext { _priv: () }
}

#[must_use]
struct PanicContext {
    _priv: (),
}

impl PanicContext {
    #[allow(clippy::print_stderr)]
    fn init() {
        let default_hook = panic::take_hook();
        let hook = move |panic_info: &panic::PanicHookInfo<'_>| {
            with_ctx(|ctx| {
                if !ctx.is_empty() {
                    eprintln!("Expression evaluation context:");
                    for frame in ctx.iter() {
                        eprintln!("> {frame}\n");
                    }
                }
                default_hook(panic_info);
            });
        };
        panic::set_hook(Box::new(hook));
    }
}

impl Drop for PanicContext {
    fn drop(&mut self) {
        with_ctx(|ctx| assert!(ctx.pop().is_some()));
    }
}

fn with_ctx(f: impl FnOnce(&mut Vec<String>)) {
    thread_local! {
        static CTX: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }
    CTX.with(|ctx| f(&mut ctx.borrow_mut()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ComparisonOp, ExprKind, QualifiedName};
    use crate::eval::Config;
    use crate::resolver::FunctionDescriptor;
    use crate::types::ValueType;

    pub(crate) struct NoFunctions;
    impl FunctionRegistry for NoFunctions {
        fn resolve(
            &self,
            name: &QualifiedName,
            _arg_types: &[ValueType],
        ) -> Result<FunctionDescriptor, EvalError> {
            Err(EvalError::unsupported(format!(
                "no function named {:?} is registered",
                name.parts
            )))
        }
    }

    pub(crate) struct FixedSession(pub i64);
    impl Session for FixedSession {
        fn current_timestamp(&self) -> i64 {
            self.0
        }
    }

    pub(crate) struct NoDatetime;
    impl DatetimeLibrary for NoDatetime {
        fn extract(
            &self,
            _field: crate::ast::ExtractField,
            _epoch_seconds: i64,
        ) -> Result<Value, EvalError> {
            Err(EvalError::unsupported("no datetime library configured"))
        }
    }

    pub(crate) struct NoCasts;
    impl CastLibrary for NoCasts {
        fn cast(&self, _target_type: &str, _value: &Value) -> Result<Value, EvalError> {
            Err(EvalError::unsupported("no cast library configured"))
        }
    }

    pub(crate) struct EmptyInput;
    impl InputResolver for EmptyInput {
        fn fetch(&mut self, slot: usize) -> Result<Value, EvalError> {
            Err(EvalError::unsupported(format!("no input at slot {slot}")))
        }
    }

    pub(crate) struct UnresolvedSymbols;
    impl SymbolResolver for UnresolvedSymbols {
        fn lookup(&mut self, symbol: &QualifiedName) -> Result<Value, EvalError> {
            Ok(Value::residual(Expression::new(
                ExprKind::QualifiedNameReference(symbol.clone()),
            )))
        }
    }

    fn optimizer<'a>(
        symbols: &'a mut dyn SymbolResolver,
        registry: &'a NoFunctions,
        session: &'a FixedSession,
        datetime: &'a NoDatetime,
        casts: &'a NoCasts,
    ) -> Evaluator<'a> {
        Evaluator::new(Mode::Optimization(symbols), registry, session, datetime, casts)
    }

    #[test]
    fn optimization_mode_folds_arithmetic() {
        let mut symbols = UnresolvedSymbols;
        let registry = NoFunctions;
        let session = FixedSession(0);
        let datetime = NoDatetime;
        let casts = NoCasts;
        let mut ev = optimizer(&mut symbols, &registry, &session, &datetime, &casts);

        let expr = Expression::new(ExprKind::Arithmetic {
            op: ArithmeticOp::Add,
            left: Box::new(Expression::new(ExprKind::Literal(Literal::Long(3)))),
            right: Box::new(Expression::new(ExprKind::Literal(Literal::Long(4)))),
        });
        assert_eq!(ev.evaluate(&expr).unwrap(), Value::Int64(7));
    }

    #[test]
    fn optimization_mode_unresolved_symbol_and_false_short_circuits() {
        let mut symbols = UnresolvedSymbols;
        let registry = NoFunctions;
        let session = FixedSession(0);
        let datetime = NoDatetime;
        let casts = NoCasts;
        let mut ev = optimizer(&mut symbols, &registry, &session, &datetime, &casts);

        let x = Expression::new(ExprKind::QualifiedNameReference(QualifiedName::bare("x")));
        let expr = Expression::new(ExprKind::Logical {
            op: crate::ast::LogicalOp::And,
            left: Box::new(x),
            right: Box::new(Expression::new(ExprKind::Literal(Literal::Boolean(false)))),
        });
        assert_eq!(ev.evaluate(&expr).unwrap(), Value::Bool(false));
    }

    #[test]
    fn optimization_mode_unresolved_symbol_or_true_short_circuits() {
        let mut symbols = UnresolvedSymbols;
        let registry = NoFunctions;
        let session = FixedSession(0);
        let datetime = NoDatetime;
        let casts = NoCasts;
        let mut ev = optimizer(&mut symbols, &registry, &session, &datetime, &casts);

        let x = Expression::new(ExprKind::QualifiedNameReference(QualifiedName::bare("x")));
        let expr = Expression::new(ExprKind::Logical {
            op: crate::ast::LogicalOp::Or,
            left: Box::new(x),
            right: Box::new(Expression::new(ExprKind::Literal(Literal::Boolean(true)))),
        });
        assert_eq!(ev.evaluate(&expr).unwrap(), Value::Bool(true));
    }

    #[test]
    fn optimization_mode_unresolved_symbol_addition_stays_residual() {
        let mut symbols = UnresolvedSymbols;
        let registry = NoFunctions;
        let session = FixedSession(0);
        let datetime = NoDatetime;
        let casts = NoCasts;
        let mut ev = optimizer(&mut symbols, &registry, &session, &datetime, &casts);

        let x = Expression::new(ExprKind::QualifiedNameReference(QualifiedName::bare("x")));
        let expr = Expression::new(ExprKind::Arithmetic {
            op: ArithmeticOp::Add,
            left: Box::new(x),
            right: Box::new(Expression::new(ExprKind::Literal(Literal::Long(0)))),
        });
        let result = ev.evaluate(&expr).unwrap();
        assert!(result.is_residual());
    }

    #[test]
    fn interpretation_mode_rejects_qualified_name_reference() {
        let mut input = EmptyInput;
        let registry = NoFunctions;
        let session = FixedSession(0);
        let datetime = NoDatetime;
        let casts = NoCasts;
        let mut ev = Evaluator::new(
            Mode::Interpretation(&mut input),
            &registry,
            &session,
            &datetime,
            &casts,
        );
        let expr = Expression::new(ExprKind::QualifiedNameReference(QualifiedName::bare("x")));
        assert!(ev.evaluate(&expr).is_err());
    }

    #[test]
    fn depth_guard_rejects_pathological_recursion() {
        let mut symbols = UnresolvedSymbols;
        let registry = NoFunctions;
        let session = FixedSession(0);
        let datetime = NoDatetime;
        let casts = NoCasts;
        let mut ev = optimizer(&mut symbols, &registry, &session, &datetime, &casts)
            .config(|e| e.max_depth = 3);

        let mut expr = Expression::new(ExprKind::Literal(Literal::Long(1)));
        for _ in 0..10 {
            expr = Expression::new(ExprKind::Negative(Box::new(expr)));
        }
        assert!(ev.evaluate(&expr).is_err());
    }

    #[test]
    fn comparison_scenario_eq() {
        let mut symbols = UnresolvedSymbols;
        let registry = NoFunctions;
        let session = FixedSession(0);
        let datetime = NoDatetime;
        let casts = NoCasts;
        let mut ev = optimizer(&mut symbols, &registry, &session, &datetime, &casts);
        let expr = Expression::new(ExprKind::Comparison {
            op: ComparisonOp::Eq,
            left: Box::new(Expression::new(ExprKind::Literal(Literal::Long(1)))),
            right: Box::new(Expression::new(ExprKind::Literal(Literal::Long(1)))),
        });
        assert_eq!(ev.evaluate(&expr).unwrap(), Value::Bool(true));
    }
}
