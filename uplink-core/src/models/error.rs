use thiserror::Error;

/// Errors that can occur while moving a capture through the pipeline.
///
/// Every variant is scoped to a single triggered action; nothing here is
/// fatal to the process. Callers surface the message and leave the session
/// state as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("capture unavailable: {0}")]
    CaptureUnavailable(String),

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("network failure: {0}")]
    Network(String),

    #[error("parse failed: {0}")]
    Parse(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("encoding failed: {0}")]
    Encoding(String),

    #[error("not authenticated")]
    NotAuthenticated,
}

impl PipelineError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
