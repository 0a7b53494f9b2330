//! External collaborator traits (§4.5, §4.6).
//!
//! The core never implements symbol resolution, input-tuple access, scalar
//! functions, or datetime/cast primitives; it only defines the boundary
//! those collaborators must satisfy.

use std::sync::Arc;

use crate::ast::{ExtractField, QualifiedName};
use crate::error::EvalError;
use crate::types::ValueType;
use crate::value::Value;

/// Optimization-mode symbol lookup. May return `Value::Residual` to keep a
/// symbol symbolic rather than a concrete scalar.
pub trait SymbolResolver {
    fn lookup(&mut self, symbol: &QualifiedName) -> Result<Value, EvalError>;
}

/// Interpretation-mode positional row access. Always concrete (or null).
pub trait InputResolver {
    fn fetch(&mut self, slot: usize) -> Result<Value, EvalError>;
}

/// A resolved scalar function: deterministic flag, formal parameter types,
/// whether the first formal parameter is the session handle, and the
/// invocation handle itself.
#[derive(Clone)]
pub struct FunctionDescriptor {
    pub deterministic: bool,
    pub formal_parameter_types: Vec<ValueType>,
    pub takes_session: bool,
    pub implementation: Arc<dyn ScalarFunction>,
}

/// A concrete scalar function implementation, bound by the registry.
pub trait ScalarFunction: Send + Sync {
    fn call(&self, session: Option<&dyn Session>, args: &[Value]) -> Result<Value, EvalError>;
}

/// The external function/metadata registry. Read-only and thread-safe by
/// contract (§5): `resolve` takes `&self`, not `&mut self`.
pub trait FunctionRegistry: Sync {
    fn resolve(
        &self,
        name: &QualifiedName,
        arg_types: &[ValueType],
    ) -> Result<FunctionDescriptor, EvalError>;
}

/// Opaque session carrier. Supplies at minimum a current-timestamp reader.
pub trait Session {
    fn current_timestamp(&self) -> i64;
}

/// Backs `EXTRACT`: dispatches a field + epoch-seconds datetime scalar to
/// whatever date/time library the host provides.
pub trait DatetimeLibrary {
    fn extract(&self, field: ExtractField, epoch_seconds: i64) -> Result<Value, EvalError>;
}

/// Backs `CAST`: dispatches a target type name + value to the host's cast
/// library.
pub trait CastLibrary {
    fn cast(&self, target_type: &str, value: &Value) -> Result<Value, EvalError>;
}
