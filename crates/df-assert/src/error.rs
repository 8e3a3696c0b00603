//! Error types for df-assert

use thiserror::Error;

/// Assertion generation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssertError {
    /// A uniqueness assertion with no columns (A001)
    #[error("[A001] Assertion '{kind}' on {table} has an empty column list")]
    EmptyColumns { kind: String, table: String },

    /// A blank row condition (A002)
    #[error("[A002] Row condition {index} on {table} is empty")]
    EmptyCondition { index: usize, table: String },
}

/// Result type alias for AssertError
pub type AssertResult<T> = Result<T, AssertError>;
