//! Identity-keyed constant caches (§4.4).
//!
//! Both caches are keyed by [`NodeId`] rather than structural equality: two
//! syntactically equal but distinct AST nodes (e.g. the original LIKE node
//! and a rewritten copy produced by the residual rewriter) must not share a
//! cache slot.

use std::hash::BuildHasherDefault;
use std::sync::Arc;

use fancy_regex::Regex;

use crate::ast::NodeId;
use crate::value::Value;

/// `NodeId`s are already a uniform hash (an `AtomicU32` counter), so both
/// caches key on `ahash` rather than `indexmap`'s default SipHash.
type IndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<ahash::AHasher>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralKey {
    Int64(i64),
    Bool(bool),
    Bytes(Box<str>),
    /// `f64` bit pattern, so `NaN`/`-0.0` hash and compare consistently
    /// within a single IN-set (full IEEE-754 equality is not required here,
    /// only stable membership testing).
    FloatBits(u64),
    Null,
}

impl LiteralKey {
    /// Builds a hashable key from a concrete (non-residual) value, or
    /// `None` if `value` is itself symbolic and so cannot participate in a
    /// constant-only hash set.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int64(v) => Some(LiteralKey::Int64(*v)),
            Value::Bool(v) => Some(LiteralKey::Bool(*v)),
            Value::Bytes(v) => Some(LiteralKey::Bytes(v.clone())),
            Value::Float64(v) => Some(LiteralKey::FloatBits(v.to_bits())),
            Value::Null => Some(LiteralKey::Null),
            Value::Residual(_) => None,
        }
    }
}

/// LIKE node id -> compiled regex. Populated lazily on first encounter.
#[derive(Debug, Default)]
pub struct LikeCache {
    compiled: IndexMap<NodeId, Arc<Regex>>,
}

impl LikeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> Option<Arc<Regex>> {
        self.compiled.get(&id).cloned()
    }

    pub fn insert(&mut self, id: NodeId, regex: Arc<Regex>) {
        self.compiled.insert(id, regex);
    }
}

/// IN-list node id -> either a constant-only hash set, or a sentinel marking
/// the list as containing at least one non-literal element.
#[derive(Debug, Clone)]
pub enum InSetEntry {
    Set(Arc<ahash::AHashSet<LiteralKey>>),
    Unusable,
}

#[derive(Debug, Default)]
pub struct InSetCache {
    sets: IndexMap<NodeId, InSetEntry>,
}

impl InSetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> Option<InSetEntry> {
        self.sets.get(&id).cloned()
    }

    pub fn insert(&mut self, id: NodeId, entry: InSetEntry) {
        self.sets.insert(id, entry);
    }
}
