use thiserror::Error;

/// Errors from the text-generation HTTP endpoint.
#[derive(Error, Debug, Clone)]
pub enum LlmApiError {
    /// Network-level failure before a response arrived.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// Rate limit or quota exhausted.
    #[error("rate limit exceeded")]
    RateLimitExceeded,

    /// Authentication or authorization rejected.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Response was not JSON or did not conform to the output schema.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The attempt exceeded its wall clock.
    #[error("timeout after {0} seconds")]
    Timeout(u64),

    /// Any other non-success status.
    #[error("api error {status}: {message}")]
    ApiError { status: u16, message: String },
}

impl LlmApiError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => Self::AuthenticationFailed(message),
            429 => Self::RateLimitExceeded,
            _ => Self::ApiError { status, message },
        }
    }

    /// Transient errors are worth another attempt.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::RateLimitExceeded | Self::Timeout(_) => true,
            Self::ApiError { status, .. } => *status >= 500,
            Self::AuthenticationFailed(_) | Self::InvalidResponse(_) => false,
        }
    }

    /// Permanent errors must not be retried.
    pub const fn is_permanent(&self) -> bool {
        match self {
            Self::AuthenticationFailed(_) => true,
            Self::ApiError { status, .. } => *status == 400 || *status == 404 || *status == 422,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        assert!(LlmApiError::from_status(500, String::new()).is_transient());
        assert!(LlmApiError::from_status(502, String::new()).is_transient());
        assert!(LlmApiError::from_status(503, String::new()).is_transient());
        assert!(LlmApiError::RateLimitExceeded.is_transient());
        assert!(LlmApiError::Timeout(60).is_transient());
        assert!(LlmApiError::RequestFailed("reset".to_string()).is_transient());
    }

    #[test]
    fn auth_and_client_errors_are_not_retried() {
        assert!(!LlmApiError::from_status(401, String::new()).is_transient());
        assert!(LlmApiError::from_status(401, String::new()).is_permanent());
        assert!(LlmApiError::from_status(400, String::new()).is_permanent());
        assert!(!LlmApiError::InvalidResponse("not json".to_string()).is_transient());
    }
}
