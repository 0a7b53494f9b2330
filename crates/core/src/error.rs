//! Structured error surface (§7).
//!
//! Three fatal kinds, matching `sqruff-parser-core::errors::SQLParseError`'s
//! "small `thiserror`-derived struct with a `{description}` message" shape,
//! collapsed into one enum since the spec names three distinct kinds rather
//! than one.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    /// A construct the core does not (yet) implement: year-to-month
    /// intervals, `CURRENT_TIME` with explicit precision, an unknown
    /// `EXTRACT` field, an unknown `CAST` target, a non-`InList` IN
    /// value-list in Interpretation mode, recursion past `max_depth`.
    #[error("unsupported construct: {0}")]
    Unsupported(String),

    /// A combination of runtime type tags for which no operator rule
    /// exists, or a programming-error condition the analyzer should have
    /// prevented (e.g. `IS DISTINCT FROM` on mismatched type classes).
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// A scalar function, the datetime library, or the cast library raised
    /// an error. The original error is preserved as `source` when available.
    #[error("scalar function failed: {message}")]
    ScalarFailure {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl EvalError {
    pub fn unsupported(msg: impl Into<String>) -> Self {
        EvalError::Unsupported(msg.into())
    }

    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        EvalError::TypeMismatch(msg.into())
    }

    pub fn scalar_failure(msg: impl Into<String>) -> Self {
        EvalError::ScalarFailure {
            message: msg.into(),
            source: None,
        }
    }

    pub fn wrap_scalar_failure(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        EvalError::ScalarFailure {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }
}
