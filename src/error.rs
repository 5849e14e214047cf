//! Mirepoix error types and HTTP classification.
//!
//! Every pipeline stage signals failures through [`PipelineError`] rather
//! than letting raw errors cross the orchestrator boundary. The server layer
//! is the single point that converts an error into an HTTP response, using
//! [`status()`](PipelineError::status) and
//! [`client_message()`](PipelineError::client_message) — the client never
//! sees an upstream provider's raw error text.

use std::time::Duration;

/// Mirepoix error types.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    // Client-caused errors (4xx)
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("unsupported content type: {0:?}")]
    UnsupportedMediaType(Option<String>),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("rate limited")]
    RateLimited,

    // Provider errors
    #[error("provider call exceeded deadline of {0:?}")]
    Timeout(Duration),

    #[error("provider quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("upstream provider error: {0}")]
    Upstream(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl PipelineError {
    /// Classify an upstream failure message into a typed error.
    ///
    /// Quota detection is substring matching on the provider's message,
    /// mirroring what the upstream SDKs expose. Known fragility: the wording
    /// is provider-specific and can change under us.
    pub fn from_upstream(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("quota") {
            PipelineError::QuotaExceeded(message)
        } else {
            PipelineError::Upstream(message)
        }
    }

    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            PipelineError::MethodNotAllowed => 405,
            PipelineError::UnsupportedMediaType(_) => 415,
            PipelineError::InvalidInput(_) => 400,
            PipelineError::RateLimited => 429,
            PipelineError::Timeout(_) => 408,
            PipelineError::QuotaExceeded(_) => 429,
            // Anything unclassified is treated as an upstream failure to
            // avoid leaking internals.
            PipelineError::Upstream(_) | PipelineError::Configuration(_) => 500,
        }
    }

    /// Message for the response body.
    ///
    /// Input errors carry their field-specific message through; everything
    /// else maps to a fixed string.
    pub fn client_message(&self) -> String {
        match self {
            PipelineError::MethodNotAllowed => "Method not allowed".to_string(),
            PipelineError::UnsupportedMediaType(_) => {
                "Content-Type must be application/json".to_string()
            }
            PipelineError::InvalidInput(message) => message.clone(),
            PipelineError::RateLimited => {
                "Too many requests, please try again later".to_string()
            }
            PipelineError::Timeout(_) => "Request timeout".to_string(),
            PipelineError::QuotaExceeded(_) => {
                "API quota exceeded. Please try again later".to_string()
            }
            PipelineError::Upstream(_) | PipelineError::Configuration(_) => {
                "Failed to generate recipe".to_string()
            }
        }
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::MethodNotAllowed => "method_not_allowed",
            PipelineError::UnsupportedMediaType(_) => "unsupported_media_type",
            PipelineError::InvalidInput(_) => "invalid_input",
            PipelineError::RateLimited => "rate_limited",
            PipelineError::Timeout(_) => "timeout",
            PipelineError::QuotaExceeded(_) => "quota_exceeded",
            PipelineError::Upstream(_) => "upstream",
            PipelineError::Configuration(_) => "configuration",
        }
    }
}

/// Result type alias for mirepoix operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_wording_classifies_as_quota_exceeded() {
        let err = PipelineError::from_upstream("You exceeded your current quota");
        assert!(matches!(err, PipelineError::QuotaExceeded(_)));
        assert_eq!(err.status(), 429);
        assert_eq!(
            err.client_message(),
            "API quota exceeded. Please try again later"
        );
    }

    #[test]
    fn other_upstream_failures_classify_as_upstream() {
        let err = PipelineError::from_upstream("connection reset by peer");
        assert!(matches!(err, PipelineError::Upstream(_)));
        assert_eq!(err.status(), 500);
        assert_eq!(err.client_message(), "Failed to generate recipe");
    }

    #[test]
    fn status_mapping_matches_contract() {
        assert_eq!(PipelineError::MethodNotAllowed.status(), 405);
        assert_eq!(PipelineError::UnsupportedMediaType(None).status(), 415);
        assert_eq!(PipelineError::InvalidInput("x".into()).status(), 400);
        assert_eq!(PipelineError::RateLimited.status(), 429);
        assert_eq!(PipelineError::Timeout(Duration::from_secs(30)).status(), 408);
        assert_eq!(PipelineError::Configuration("x".into()).status(), 500);
    }

    #[test]
    fn invalid_input_message_passes_through() {
        let err = PipelineError::InvalidInput("Prompt cannot be empty".into());
        assert_eq!(err.client_message(), "Prompt cannot be empty");
    }

    #[test]
    fn upstream_detail_never_reaches_the_client() {
        let err = PipelineError::from_upstream("secret internal detail");
        assert!(!err.client_message().contains("secret"));
    }
}
