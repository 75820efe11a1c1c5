//! Mapping of non-success HTTP responses to `LlmError`.
//!
//! Retryability follows the status: 408, 429 and 5xx become transient errors,
//! every other 4xx is permanent.

use reqwest::header::HeaderMap;
use serde::Deserialize;

use crate::error::LlmError;

const REQUEST_ID_HEADERS: [&str; 4] = [
    "x-goog-request-id",
    "x-request-id",
    "x-cloud-trace-context",
    "traceparent",
];

/// `{"error": {"code": 400, "message": "...", "status": "INVALID_ARGUMENT"}}`
#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

fn request_ids(headers: &HeaderMap) -> Vec<String> {
    REQUEST_ID_HEADERS
        .iter()
        .filter_map(|name| {
            headers
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .map(|v| format!("{name}={v}"))
        })
        .collect()
}

/// Classify a non-success response.
pub fn classify_http_error(
    provider_id: &str,
    status: u16,
    body_text: &str,
    headers: &HeaderMap,
) -> LlmError {
    let envelope = serde_json::from_str::<GeminiErrorEnvelope>(body_text)
        .ok()
        .map(|e| e.error);
    let provider_status = envelope
        .as_ref()
        .and_then(|e| e.status.clone())
        .unwrap_or_default();
    let message = envelope
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| body_text.chars().take(200).collect());

    let ids = request_ids(headers);
    let ids_suffix = if ids.is_empty() {
        String::new()
    } else {
        format!(" ids=[{}]", ids.join(","))
    };

    tracing::debug!(
        target: "medigen::http",
        provider = provider_id,
        status,
        provider_status = %provider_status,
        "non-success response"
    );

    match status {
        429 => {
            let retry_after = headers
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");
            LlmError::RateLimitError(format!(
                "provider={provider_id} http=429 retry_after={retry_after}{ids_suffix} {message}"
            ))
        }
        401 | 403 => LlmError::AuthenticationError(format!(
            "provider={provider_id} http={status}{ids_suffix} {message}"
        )),
        404 => LlmError::NotFound(format!(
            "provider={provider_id} http=404{ids_suffix} {message}"
        )),
        400 if provider_status == "RESOURCE_EXHAUSTED" => LlmError::RateLimitError(format!(
            "provider={provider_id} http=400{ids_suffix} {message}"
        )),
        400 | 413 | 415 => LlmError::InvalidInput(format!(
            "provider={provider_id} http={status}{ids_suffix} {message}"
        )),
        _ => {
            let details = match serde_json::from_str::<serde_json::Value>(body_text) {
                Ok(json) => serde_json::json!({
                    "status": status,
                    "provider": provider_id,
                    "response": json,
                    "request_ids": ids,
                }),
                Err(_) => serde_json::json!({
                    "status": status,
                    "provider": provider_id,
                    "raw": body_text,
                    "request_ids": ids,
                }),
            };
            let message = if message.trim().is_empty() {
                "api error".to_string()
            } else {
                message
            };
            LlmError::api_error_with_details(status, message, details)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn rate_limit_is_transient() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("3"));
        let err = classify_http_error("gemini", 429, "{}", &headers);
        assert!(matches!(err, LlmError::RateLimitError(ref m) if m.contains("retry_after=3")));
        assert!(err.is_retryable());
    }

    #[test]
    fn resource_exhausted_on_400_is_rate_limited() {
        let body = r#"{"error":{"code":400,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = classify_http_error("gemini", 400, body, &HeaderMap::new());
        assert!(matches!(err, LlmError::RateLimitError(ref m) if m.contains("Quota exceeded")));
        assert!(err.is_retryable());
    }

    #[test]
    fn gemini_envelope_message_is_surfaced() {
        let body = r#"{"error":{"code":400,"message":"Invalid JSON payload","status":"INVALID_ARGUMENT"}}"#;
        let err = classify_http_error("gemini", 400, body, &HeaderMap::new());
        match err {
            LlmError::InvalidInput(msg) => assert!(msg.contains("Invalid JSON payload")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn server_errors_keep_status_and_request_ids() {
        let mut headers = HeaderMap::new();
        headers.insert("x-goog-request-id", HeaderValue::from_static("req-9"));
        let err = classify_http_error("gemini", 503, "<html>down</html>", &headers);
        assert!(err.is_retryable());
        match err {
            LlmError::ApiError { code, details, .. } => {
                assert_eq!(code, 503);
                let details = details.unwrap();
                assert_eq!(details["raw"], "<html>down</html>");
                assert_eq!(details["request_ids"][0], "x-goog-request-id=req-9");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn other_client_errors_are_permanent() {
        let err = classify_http_error("gemini", 422, "", &HeaderMap::new());
        assert!(!err.is_retryable());
        assert_eq!(err.status_code(), Some(422));
        assert!(err.to_string().contains("api error"));
    }

    #[test]
    fn request_timeout_status_is_transient() {
        let err = classify_http_error("gemini", 408, "timeout", &HeaderMap::new());
        assert!(err.is_retryable());
    }
}
