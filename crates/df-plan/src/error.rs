//! Error types for df-plan

use df_core::CoreError;
use thiserror::Error;

/// Planning errors
#[derive(Error, Debug)]
pub enum PlanError {
    /// Selection failed (unknown action, cycle)
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The compiled graph has errors (P002)
    #[error("[P002] Cannot plan a graph with {count} compile error(s); first in {path}: {message}")]
    GraphHasErrors {
        count: usize,
        path: String,
        message: String,
    },
}

/// Result type alias for PlanError
pub type PlanResult<T> = Result<T, PlanError>;
