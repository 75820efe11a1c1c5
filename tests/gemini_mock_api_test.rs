//! Mock API tests for the Gemini pipeline
//!
//! wiremock stands in for `generativelanguage.googleapis.com`; response
//! bodies follow the public `generateContent` reference.

use base64::Engine;
use medigen::prelude::*;
use serde_json::json;
use std::time::Duration;
use tracing_test::traced_test;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEXT_PATH: &str = "/v1beta/models/gemini-2.5-flash-preview-09-2025:generateContent";
const TTS_PATH: &str = "/v1beta/models/gemini-2.5-flash-preview-tts:generateContent";

fn text_response(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"},
            "finishReason": "STOP",
            "safetyRatings": [{"category": "HARM_CATEGORY_HATE_SPEECH", "probability": "NEGLIGIBLE"}]
        }],
        "usageMetadata": {"promptTokenCount": 5, "candidatesTokenCount": 10, "totalTokenCount": 15},
        "modelVersion": "gemini-2.5-flash",
        "responseId": "resp_abc123"
    })
}

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::default()
        .with_max_attempts(max_attempts)
        .with_initial_delay(Duration::from_millis(5))
}

fn client_for(server: &MockServer, retry: RetryPolicy) -> GeminiClient {
    GeminiClient::builder()
        .api_key("test-key")
        .base_url(format!("{}/v1beta", server.uri()))
        .with_retry(retry)
        .build()
        .unwrap()
}

fn hospital_schema() -> ResponseSchema {
    ResponseSchema::object().required_property(
        "hospitals",
        ResponseSchema::array(
            ResponseSchema::object()
                .required_property("name", ResponseSchema::string())
                .required_property("address", ResponseSchema::string())
                .property("phone", ResponseSchema::string()),
        ),
    )
}

#[tokio::test]
async fn text_request_sends_key_header_and_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "What helps with a sore throat?"}]}],
            "systemInstruction": {"parts": [{"text": "Answer briefly."}]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Warm fluids.")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, RetryPolicy::default());
    let envelope =
        RequestEnvelope::text("What helps with a sore throat?").with_instruction("Answer briefly.");
    let result = client.execute(&envelope).await.unwrap();
    assert_eq!(result.as_text(), Some("Warm fluids."));
}

#[tokio::test]
async fn structured_json_is_requested_and_validated() {
    let server = MockServer::start().await;
    let answer = json!({"hospitals": [{"name": "Hôpital Edouard Herriot", "address": "5 Pl. d'Arsonval, Lyon"}]});
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .and(body_partial_json(json!({
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {"type": "OBJECT", "required": ["hospitals"]}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(&answer.to_string())))
        .mount(&server)
        .await;

    let client = client_for(&server, RetryPolicy::default());
    let value = client
        .generate_json("List hospitals in Lyon", hospital_schema())
        .await
        .unwrap();
    assert_eq!(value, answer);
}

#[tokio::test]
async fn structured_json_missing_required_field_is_schema_violation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_response(r#"{"hospitals": [{"name": "Nameless"}]}"#)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, fast_retry(5));
    let err = client
        .generate_json("List hospitals", hospital_schema())
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::SchemaViolation(_)), "got {err:?}");
}

#[derive(Debug, serde::Deserialize, PartialEq)]
struct Hospital {
    name: String,
    address: String,
    phone: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct HospitalList {
    hospitals: Vec<Hospital>,
}

#[tokio::test]
async fn typed_output_deserializes() {
    let server = MockServer::start().await;
    let answer = json!({"hospitals": [{"name": "CHU", "address": "1 Rue", "phone": "+33 4"}]});
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(&answer.to_string())))
        .mount(&server)
        .await;

    let client = client_for(&server, RetryPolicy::default());
    let list: HospitalList = client
        .generate_typed("List hospitals", hospital_schema())
        .await
        .unwrap();
    assert_eq!(
        list.hospitals,
        vec![Hospital {
            name: "CHU".into(),
            address: "1 Rue".into(),
            phone: Some("+33 4".into())
        }]
    );
}

#[tokio::test]
async fn speech_uses_tts_model_and_returns_wav() {
    let server = MockServer::start().await;
    let pcm = vec![0u8; 4_800];
    let data = base64::engine::general_purpose::STANDARD.encode(&pcm);
    Mock::given(method("POST"))
        .and(path(TTS_PATH))
        .and(body_partial_json(json!({
            "contents": [{"parts": [{"text": "Say professionally: Take one tablet daily."}]}],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {"voiceConfig": {"prebuiltVoiceConfig": {"voiceName": "Kore"}}}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "audio/L16;codec=pcm;rate=24000", "data": data}}
            ]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, RetryPolicy::default());
    let clip = client
        .synthesize_speech("Take one tablet daily.", Some(SpeechStyle::Professional))
        .await
        .unwrap();
    assert_eq!(clip.bytes.len(), 4_844);
    assert_eq!(clip.sample_rate, 24_000);
    assert_eq!(clip.duration(), Duration::from_millis(100));
    assert_eq!(clip.pcm(), pcm.as_slice());
}

#[tokio::test]
async fn empty_candidates_fall_back_for_plain_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [],
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, RetryPolicy::default());
    let envelope = RequestEnvelope::new(OutputMode::text_or("No answer available."))
        .with_text("Something the model refuses");
    let result = client.execute(&envelope).await.unwrap();
    assert_eq!(result.as_text(), Some("No answer available."));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "code": 401,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "UNAUTHENTICATED"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, fast_retry(5));
    let err = client.generate_text("hello").await.unwrap_err();
    match err {
        LlmError::AuthenticationError(msg) => assert!(msg.contains("API key not valid")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn bad_request_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "Invalid value at 'contents'", "status": "INVALID_ARGUMENT"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, fast_retry(5));
    let err = client.generate_text("hello").await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Permanent);
}

#[tokio::test]
async fn server_errors_exhaust_retry_budget() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server, fast_retry(3));
    let err = client.generate_text("hello").await.unwrap_err();
    match err {
        LlmError::RetriesExhausted {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(last_error.status_code(), Some(503));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
#[traced_test]
async fn rate_limit_then_success_is_retried_and_logged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1"))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Recovered.")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, fast_retry(5));
    let text = client.generate_text("hello").await.unwrap();
    assert_eq!(text, "Recovered.");
    assert!(logs_contain("transient failure, backing off"));
    assert!(!logs_contain("test-key"));
}

#[tokio::test]
async fn slow_responses_time_out_as_transient_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_response("late"))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = GeminiClient::builder()
        .api_key("test-key")
        .base_url(format!("{}/v1beta", server.uri()))
        .timeout(Duration::from_millis(50))
        .with_retry(fast_retry(2))
        .build()
        .unwrap();
    let err = client.generate_text("hello").await.unwrap_err();
    match err {
        LlmError::RetriesExhausted { last_error, .. } => {
            assert!(matches!(*last_error, LlmError::TimeoutError(_)), "got {last_error:?}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn image_analysis_sends_inline_data() {
    const PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89,
    ];
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .and(body_partial_json(json!({
            "contents": [{"parts": [
                {"text": "What does this show?"},
                {"inlineData": {"mimeType": "image/png"}}
            ]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("A single pixel.")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, RetryPolicy::default());
    let text = client
        .analyze_image("What does this show?", PNG)
        .await
        .unwrap();
    assert_eq!(text, "A single pixel.");
}
