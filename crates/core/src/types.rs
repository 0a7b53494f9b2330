//! Scalar types surfaced to the function/metadata registry (§6).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    BigInt,
    Double,
    Varchar,
    Boolean,
}
