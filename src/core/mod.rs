//! Core abstractions for fieldcrm.
//!
//! Records, field values, and the filter evaluator that every automation
//! trigger runs through.

pub mod filter;
mod traits;

pub use filter::{
    evaluate, evaluate_condition, filter_records, parse_conditions, push_condition,
    ConditionValue, FilterCondition, FilterOperator, LogicalOperator,
};
pub use traits::{format_number, parse_number, FieldSource, FieldValue, Record};
