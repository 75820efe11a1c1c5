//! Type Conversions for LlmError
//!
//! From implementations for the error types produced by the pipeline's
//! dependencies.

use super::types::LlmError;

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::TimeoutError(err.to_string())
        } else if err.is_connect() {
            Self::ConnectionError(err.to_string())
        } else if err.is_builder() {
            // The request never left the process (e.g. unparseable URL).
            Self::InvalidRequest(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<base64::DecodeError> for LlmError {
    fn from(err: base64::DecodeError) -> Self {
        Self::InvalidAudioPayload(format!("base64 decode failed: {err}"))
    }
}
