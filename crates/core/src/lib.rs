//! A tree-walking partial evaluator for typed SQL scalar expressions.
//!
//! Two modes share one evaluator: Interpretation evaluates a fully-bound
//! expression against a live row and always produces a scalar; Optimization
//! evaluates against compile-time symbol knowledge and may legally produce
//! a [`value::Value::Residual`] — a reduced-but-not-fully-evaluated
//! expression — when part of the tree cannot yet be decided.

pub mod ast;
pub mod cache;
pub mod error;
pub mod eval;
pub mod like;
pub mod literal;
pub mod resolver;
pub mod residual;
pub mod types;
pub mod value;

pub use ast::{
    ArithmeticOp, ComparisonOp, ExprKind, Expression, ExtractField, Literal, LogicalOp, NodeId,
    QualifiedName, WhenClause,
};
pub use error::EvalError;
pub use eval::{Evaluator, Mode};
pub use resolver::{
    CastLibrary, DatetimeLibrary, FunctionDescriptor, FunctionRegistry, InputResolver,
    ScalarFunction, Session, SymbolResolver,
};
pub use types::ValueType;
pub use value::Value;
