//! # Error Types

/// Errors from wordloom operations.
#[derive(Debug, thiserror::Error)]
pub enum WordloomError {
    /// A pipeline descriptor names a component this crate does not implement.
    #[error("unsupported {component} type: {kind:?}")]
    Configuration {
        /// The pipeline stage, e.g. "normalizer" or "model".
        component: &'static str,

        /// The type name found in the vocabulary file.
        kind: String,
    },

    /// A sampling or generation parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The external evaluator failed.
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    /// The conversation driver was used out of order.
    #[error("usage error: {0}")]
    Usage(String),

    /// Token value out of range for the target type.
    #[error("token out of range")]
    TokenOutOfRange,

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Parse error (json, integer, etc.)
    #[error("parse error: {0}")]
    Parse(String),
}

/// Alias for [`WordloomError`].
pub type WLError = WordloomError;

/// Result type for wordloom operations.
pub type WLResult<T> = core::result::Result<T, WordloomError>;

impl From<serde_json::Error> for WordloomError {
    fn from(err: serde_json::Error) -> Self {
        WordloomError::Parse(err.to_string())
    }
}
