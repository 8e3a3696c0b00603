//! Error types for df-template

use thiserror::Error;

/// Template errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    /// Template render error (T001)
    #[error("[T001] Template render error: {0}")]
    RenderError(String),

    /// A short reference matches several actions (T002)
    #[error("[T002] Ambiguous reference '{reference}': matches {candidates}. Qualify it with a schema")]
    AmbiguousReference {
        reference: String,
        candidates: String,
    },

    /// A reference with no or too many components (T003)
    #[error("[T003] Invalid reference '{reference}': expected name, schema.name, or database.schema.name")]
    InvalidReference { reference: String },

    /// Environment setup error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for TemplateError
pub type TemplateResult<T> = Result<T, TemplateError>;

impl From<minijinja::Error> for TemplateError {
    fn from(err: minijinja::Error) -> Self {
        let mut message = err.to_string();
        if let Some(detail) = err.detail() {
            if !message.contains(detail) {
                message = format!("{} ({})", message, detail);
            }
        }
        TemplateError::RenderError(message)
    }
}
