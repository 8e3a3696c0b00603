//! Error types for df-compiler

use df_core::CoreError;
use thiserror::Error;

/// Errors that abort a compile.
///
/// Per-file problems are not errors at this level; they end up in
/// `graphErrors`.
#[derive(Error, Debug)]
pub enum CompileError {
    /// Settings or project loading failed
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A worker task panicked or was cancelled (C001)
    #[error("[C001] Compile task failed: {0}")]
    TaskFailed(String),
}

/// Result type alias for CompileError
pub type CompileResult<T> = Result<T, CompileError>;
