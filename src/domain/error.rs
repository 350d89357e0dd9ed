//! Domain error taxonomy for the strategy pipeline.
//!
//! Fatal failures (validation, storage, cancellation) surface as errors;
//! best-effort upstream failures never do. Those are recorded in the
//! strategy's `degraded_steps` instead.

use thiserror::Error;

/// Errors raised while validating untrusted tabular input or a brief.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Structurally malformed input: bad CSV, missing title column,
    /// unparseable brief field.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A security pattern matched; the named rule rejected the input whole.
    #[error("hostile input rejected by rule '{rule}': {detail}")]
    HostileInput { rule: String, detail: String },

    /// A size or row-count limit was exceeded.
    #[error("input too large: {0}")]
    TooLarge(String),
}

impl ValidationError {
    pub fn hostile(rule: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::HostileInput {
            rule: rule.into(),
            detail: detail.into(),
        }
    }

    /// Whether the rejection came from the security policy rather than
    /// structural problems.
    pub const fn is_hostile(&self) -> bool {
        matches!(self, Self::HostileInput { .. })
    }
}

/// Errors raised by the strategy store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No strategy with the given id exists.
    #[error("strategy not found: {0}")]
    NotFound(String),

    /// A filesystem write, rename, or index update failed.
    #[error("storage failure: {0}")]
    Io(String),

    /// A filesystem operation exceeded its deadline.
    #[error("storage operation timed out after {0} seconds")]
    Timeout(u64),

    /// A persisted record could not be serialized or parsed.
    #[error("storage serialization failure: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Top-level failure of one pipeline invocation.
///
/// Best-effort upstreams (autocomplete, trends, the LLM) never appear here;
/// their failures degrade the run instead of aborting it.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The caller requested cancellation; nothing was persisted.
    #[error("invocation cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Process exit code for the CLI surface.
    ///
    /// 2 for rejected input (structural or hostile), 3 for size limits,
    /// 1 for everything else.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(ValidationError::InvalidInput(_) | ValidationError::HostileInput { .. }) => 2,
            Self::Validation(ValidationError::TooLarge(_)) => 3,
            Self::Storage(_) | Self::Cancelled => 1,
        }
    }

    /// HTTP status code for the playground surface.
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Validation(ValidationError::InvalidInput(_) | ValidationError::HostileInput { .. }) => 400,
            Self::Validation(ValidationError::TooLarge(_)) => 413,
            Self::Storage(_) => 500,
            Self::Cancelled => 499,
        }
    }
}
