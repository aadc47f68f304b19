// src/error.rs
use thiserror::Error;

/// Failures that abort a batch. Everything else (bad timestamps, missing fields)
/// degrades in place and never surfaces here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("input must be an object of category -> records or an array of records, got {found}")]
    InputShape { found: &'static str },

    #[error("category {category:?} must hold an array of records, got {found}")]
    CategoryShape {
        category: String,
        found: &'static str,
    },

    #[error("record {index} in category {category:?} is not an object (got {found})")]
    InvalidRecord {
        category: String,
        index: usize,
        found: &'static str,
    },
}

/// Short JSON type name for error messages.
pub(crate) fn json_kind(v: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
