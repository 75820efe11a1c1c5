//! Core error types for the request pipeline.

use thiserror::Error;

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Error type covering every stage of the pipeline (build, send, extract, decode).
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// Generic transport failure (DNS, TLS, body read, ...).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Connection could not be established.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The per-request timeout elapsed.
    #[error("Timeout error: {0}")]
    TimeoutError(String),

    /// Provider signalled rate limiting (HTTP 429 or an equivalent envelope).
    #[error("Rate limit exceeded: {0}")]
    RateLimitError(String),

    /// Non-success HTTP status that is not covered by a more specific variant.
    #[error("API error {code}: {message}")]
    ApiError {
        code: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Invalid or missing credentials (HTTP 401/403).
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Model or endpoint not found (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider rejected the request payload (HTTP 400/413/415).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// All attempts were consumed by transient failures.
    #[error("Retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        attempts: u32,
        last_error: Box<LlmError>,
    },

    /// The candidate/content/part path is absent from the provider response.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Structured output did not parse or did not match the requested schema.
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// Inline audio could not be decoded into a PCM buffer.
    #[error("Invalid audio payload: {0}")]
    InvalidAudioPayload(String),

    /// Caller supplied an inconsistent envelope (mode/schema/content).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// Client configuration is incomplete or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// JSON (de)serialization failure outside of structured output.
    #[error("JSON error: {0}")]
    JsonError(String),
}

/// Coarse classification used by the retry executor and by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network, timeout, 5xx, 408 and 429: worth another attempt.
    Transient,
    /// Provider rejected the call (auth, 4xx): retrying cannot help.
    Permanent,
    /// The retry budget is spent.
    Exhausted,
    /// The call succeeded but the payload is unusable.
    Response,
    /// The request was rejected locally before any network call.
    Request,
    Cancelled,
    Configuration,
}

impl LlmError {
    /// Create an API error without details.
    pub fn api_error(code: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create an API error carrying structured details (provider body, request ids).
    pub fn api_error_with_details(
        code: u16,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    /// Wrap the last failure once the retry budget is spent.
    pub fn retries_exhausted(attempts: u32, last_error: LlmError) -> Self {
        Self::RetriesExhausted {
            attempts,
            last_error: Box::new(last_error),
        }
    }

    /// HTTP status associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { code, .. } => Some(*code),
            Self::RateLimitError(_) => Some(429),
            Self::AuthenticationError(_) => Some(401),
            Self::NotFound(_) => Some(404),
            Self::RetriesExhausted { last_error, .. } => last_error.status_code(),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_)
            | Self::ConnectionError(_)
            | Self::TimeoutError(_)
            | Self::RateLimitError(_) => ErrorCategory::Transient,
            Self::ApiError { code, .. } => {
                if is_transient_status(*code) {
                    ErrorCategory::Transient
                } else {
                    ErrorCategory::Permanent
                }
            }
            Self::AuthenticationError(_) | Self::NotFound(_) | Self::InvalidInput(_) => {
                ErrorCategory::Permanent
            }
            Self::RetriesExhausted { .. } => ErrorCategory::Exhausted,
            Self::MalformedResponse(_)
            | Self::SchemaViolation(_)
            | Self::InvalidAudioPayload(_)
            | Self::JsonError(_) => ErrorCategory::Response,
            Self::InvalidRequest(_) => ErrorCategory::Request,
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::ConfigurationError(_) => ErrorCategory::Configuration,
        }
    }

    /// Whether another attempt of the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }
}

/// 5xx, 408 Request Timeout and 429 Too Many Requests.
pub(crate) const fn is_transient_status(code: u16) -> bool {
    code >= 500 || code == 408 || code == 429
}
