//! Gemini HTTP header helpers.
//!
//! - Always include `Content-Type: application/json`
//! - The API key travels in `x-goog-api-key`, never in the URL
//! - A caller-supplied `Authorization` header replaces the API key
//! - Custom headers win when names collide

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;

use crate::error::LlmError;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP header builder for API requests
#[derive(Debug, Default)]
pub struct HttpHeaderBuilder {
    headers: HeaderMap,
}

impl HttpHeaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json_content_type(mut self) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    /// Insert `name: value`, validating both.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, LlmError> {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            LlmError::ConfigurationError(format!("Invalid header name '{name}': {e}"))
        })?;
        // Value is not echoed: it may be a credential.
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            LlmError::ConfigurationError(format!("Invalid value for header '{name}': {e}"))
        })?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_custom_headers(
        self,
        custom_headers: &HashMap<String, String>,
    ) -> Result<Self, LlmError> {
        custom_headers
            .iter()
            .try_fold(self, |builder, (name, value)| builder.with_header(name, value))
    }

    pub fn build(self) -> HeaderMap {
        self.headers
    }
}

pub fn build_gemini_headers(
    api_key: &str,
    custom_headers: &HashMap<String, String>,
) -> Result<HeaderMap, LlmError> {
    let has_authorization = custom_headers
        .keys()
        .any(|k| k.eq_ignore_ascii_case("authorization"));

    let mut builder = HttpHeaderBuilder::new().with_json_content_type();
    if !has_authorization && !api_key.is_empty() {
        let mut value = HeaderValue::from_str(api_key).map_err(|_| {
            LlmError::ConfigurationError("API key contains invalid header characters".to_string())
        })?;
        value.set_sensitive(true);
        builder
            .headers
            .insert(HeaderName::from_static(API_KEY_HEADER), value);
    }

    Ok(builder.with_custom_headers(custom_headers)?.build())
}
