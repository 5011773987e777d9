use thiserror::Error;

/// Errors from session store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session already exists for thread")]
    AlreadyExists,

    #[error("no session for thread")]
    NotFound,

    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),
}

/// Errors from the inference service boundary.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Network or transport failure, including request timeout. Retryable.
    #[error("inference service unreachable: {0}")]
    Unreachable(String),

    /// The service answered but without a usable result payload.
    /// Non-retryable, surfaced to the caller.
    #[error("malformed inference response: {0}")]
    MalformedResponse(String),

    /// Retryable with backoff.
    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },
}

impl InferenceError {
    /// True for failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            InferenceError::Unreachable(_) | InferenceError::RateLimited { .. }
        )
    }
}

/// Errors surfaced by the session router and regeneration handler.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Regeneration requires an existing session to know which model and
    /// history the target belongs to.
    #[error("no session for thread")]
    NoSessionForThread,

    /// Regeneration targets a user message, not the bot's own reply.
    #[error("regeneration target must be a non-empty user message")]
    InvalidTarget,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_inference_error_retryability() {
        assert!(InferenceError::Unreachable("timeout".into()).is_retryable());
        assert!(
            InferenceError::RateLimited {
                retry_after_ms: Some(500)
            }
            .is_retryable()
        );
        assert!(!InferenceError::MalformedResponse("no result".into()).is_retryable());
    }

    #[test]
    fn test_router_error_from_store() {
        let err: RouterError = StoreError::AlreadyExists.into();
        assert!(matches!(err, RouterError::Store(StoreError::AlreadyExists)));
    }
}
