//! Core type definitions used across the Roster workspace.

pub mod field_map;
pub mod predicate;

pub use field_map::FieldMap;
pub use predicate::{
    Condition, FieldCondition, FieldSource, FilterOp, FilterValue, Operand, Predicate,
};
