//! The closed expression sum type consumed by the evaluator.
//!
//! Nodes are produced by an upstream analyzer (out of scope here); the only
//! thing this module adds on top of "plain AST" is [`NodeId`], a process-wide
//! identity stamp used to key the constant caches (see `cache.rs`).

use std::sync::atomic::{AtomicU32, Ordering};

/// A stable identity for an AST node, substituting for pointer identity.
///
/// Every [`Expression`] receives a fresh id when constructed via
/// [`Expression::new`]. Cloning an `Expression` preserves its id (it's still
/// logically the same node); building a *new* node — as the residual
/// rewriter does — always goes through `Expression::new` and so always gets
/// a fresh id, which is what makes cache invalidation for rewritten subtrees
/// automatic.
pub type NodeId = u32;

fn next_node_id() -> NodeId {
    static NEXT: AtomicU32 = AtomicU32::new(0);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub id: NodeId,
    pub kind: ExprKind,
}

impl Expression {
    pub fn new(kind: ExprKind) -> Self {
        Expression {
            id: next_node_id(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedName {
    pub parts: Vec<String>,
}

impl QualifiedName {
    pub fn bare(name: impl Into<String>) -> Self {
        QualifiedName {
            parts: vec![name.into()],
        }
    }

    /// A bare name with no prefix is a candidate symbol; anything qualified
    /// (`a.b`) is not resolvable as a symbol by this core (§4.1 leaf rules).
    pub fn is_bare(&self) -> bool {
        self.parts.len() == 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractField {
    Century,
    Year,
    Quarter,
    Month,
    Week,
    Day,
    DayOfWeek,
    DayOfYear,
    Hour,
    Minute,
    Second,
    TimezoneHour,
    TimezoneMinute,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhenClause {
    pub when: Box<Expression>,
    pub then: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Long(i64),
    Double(f64),
    String(Box<str>),
    Boolean(bool),
    Null,
    Date(i64),
    Time(i64),
    Timestamp(i64),
    Interval(i64),
    /// Year-to-month intervals are rejected wherever encountered (§3).
    IntervalYearToMonth(i32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    QualifiedNameReference(QualifiedName),
    InputReference { slot: usize },
    /// `CURRENT_TIME`/`CURRENT_TIMESTAMP`/`CURRENT_DATE`-family leaf.
    /// Only the no-precision `Timestamp` form is supported (§4.1 leaves).
    CurrentTime {
        is_timestamp: bool,
        precision: Option<u32>,
    },
    Arithmetic {
        op: ArithmeticOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Negative(Box<Expression>),
    Comparison {
        op: ComparisonOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    IsDistinctFrom {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Between {
        value: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Not(Box<Expression>),
    IsNull(Box<Expression>),
    IsNotNull(Box<Expression>),
    In {
        value: Box<Expression>,
        list: Box<Expression>,
    },
    InList(Vec<Expression>),
    Coalesce(Vec<Expression>),
    NullIf {
        a: Box<Expression>,
        b: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        then_branch: Box<Expression>,
        else_branch: Option<Box<Expression>>,
    },
    SearchedCase {
        whens: Vec<WhenClause>,
        else_branch: Option<Box<Expression>>,
    },
    SimpleCase {
        operand: Box<Expression>,
        whens: Vec<WhenClause>,
        else_branch: Option<Box<Expression>>,
    },
    FunctionCall {
        name: QualifiedName,
        window: bool,
        distinct: bool,
        args: Vec<Expression>,
    },
    Like {
        value: Box<Expression>,
        pattern: Box<Expression>,
        escape: Option<Box<Expression>>,
    },
    Extract {
        field: ExtractField,
        expr: Box<Expression>,
    },
    Cast {
        expr: Box<Expression>,
        target_type: String,
    },
}
