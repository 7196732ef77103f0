use thiserror::Error;

/// Errors from the model-server client.
///
/// Every variant is recoverable: the generation orchestrator degrades to a
/// deterministic fallback result instead of propagating these to its caller.
#[derive(Debug, Error)]
pub enum OllamaError {
    /// The server answered with a non-success HTTP status.
    #[error("LLM API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Underlying network failure (connection refused, DNS, timeout).
    #[error("LLM network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl OllamaError {
    /// Whether this failure was a request timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, OllamaError::NetworkError(e) if e.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = OllamaError::ApiError {
            status: 500,
            message: "model not loaded".into(),
        };
        assert_eq!(
            err.to_string(),
            "LLM API error (status 500): model not loaded"
        );
        assert!(!err.is_timeout());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OllamaError>();
    }
}
