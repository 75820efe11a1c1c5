//! Gemini client
//!
//! `GeminiClient` is cheap to clone and safe to share across tasks; every
//! call runs its own build/send/extract/decode pipeline with its own retry
//! state.

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::builder::GeminiBuilder;
use crate::error::LlmError;
use crate::execution::http::{HttpTransport, ReqwestTransport, build_gemini_headers};
use crate::executors::{BeforeSendHook, GenerateExecutor, HttpGenerateExecutor};
use crate::retry::{RetryExecutor, RetryPolicy};
use crate::transformers::{GeminiRequestBuilder, GeminiResponseExtractor};
use crate::types::{
    AudioClip, ContentPart, DecodedResult, GeminiConfig, OutputMode, RequestEnvelope,
    ResponseSchema, SpeechStyle,
};
use crate::utils::cancel::CancelHandle;

#[derive(Clone)]
pub struct GeminiClient {
    config: Arc<GeminiConfig>,
    executor: Arc<HttpGenerateExecutor>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("config", &self.config)
            .field("executor", &self.executor)
            .finish()
    }
}

impl GeminiClient {
    /// Client with the default reqwest transport and retry policy.
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        let transport = ReqwestTransport::from_config(&config.http_config)?;
        Ok(Self::from_parts(
            config,
            Arc::new(transport),
            RetryPolicy::default(),
            None,
        ))
    }

    pub fn builder() -> GeminiBuilder {
        GeminiBuilder::new()
    }

    pub(crate) fn from_parts(
        config: GeminiConfig,
        transport: Arc<dyn HttpTransport>,
        retry_policy: RetryPolicy,
        before_send: Option<BeforeSendHook>,
    ) -> Self {
        let config = Arc::new(config);

        let endpoint_config = config.clone();
        let header_config = config.clone();
        let executor = HttpGenerateExecutor {
            provider_id: "gemini".to_string(),
            transport,
            request_transformer: Arc::new(GeminiRequestBuilder::new(
                config.default_voice.clone(),
            )),
            response_transformer: Arc::new(GeminiResponseExtractor),
            retry: RetryExecutor::new(retry_policy),
            resolve_endpoint: Arc::new(move |output| {
                let model = model_for(&endpoint_config, output).to_string();
                let url = endpoint_config.generate_content_url(&model);
                (model, url)
            }),
            build_headers: Arc::new(move || {
                build_gemini_headers(
                    header_config.api_key.expose_secret(),
                    &header_config.http_config.headers,
                )
            }),
            before_send,
        };

        Self {
            config,
            executor: Arc::new(executor),
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Model addressed for `output` (the speech model for audio output).
    pub fn model_for(&self, output: &OutputMode) -> &str {
        model_for(&self.config, output)
    }

    /// Run one pipeline call.
    pub async fn execute(&self, envelope: &RequestEnvelope) -> Result<DecodedResult, LlmError> {
        self.executor.execute(envelope, None).await
    }

    /// Run one pipeline call that stops with `LlmError::Cancelled` once
    /// `cancel` fires, including during backoff delays.
    pub async fn execute_cancellable(
        &self,
        envelope: &RequestEnvelope,
        cancel: &CancelHandle,
    ) -> Result<DecodedResult, LlmError> {
        self.executor.execute(envelope, Some(cancel)).await
    }

    /// Free-text answer; an empty answer comes back as an empty string.
    pub async fn generate_text(&self, prompt: impl Into<String>) -> Result<String, LlmError> {
        let result = self.execute(&RequestEnvelope::text(prompt)).await?;
        into_text(result)
    }

    /// JSON answer constrained by, and validated against, `schema`.
    pub async fn generate_json(
        &self,
        prompt: impl Into<String>,
        schema: ResponseSchema,
    ) -> Result<serde_json::Value, LlmError> {
        match self.execute(&RequestEnvelope::json(prompt, schema)).await? {
            DecodedResult::Json(value) => Ok(value),
            other => Err(unexpected(&other)),
        }
    }

    /// JSON answer deserialized into `T`.
    pub async fn generate_typed<T: DeserializeOwned>(
        &self,
        prompt: impl Into<String>,
        schema: ResponseSchema,
    ) -> Result<T, LlmError> {
        let value = self.generate_json(prompt, schema).await?;
        serde_json::from_value(value)
            .map_err(|e| LlmError::SchemaViolation(format!("output does not fit target type: {e}")))
    }

    /// Describe an image; the mime type is detected from the bytes.
    pub async fn analyze_image(
        &self,
        prompt: impl Into<String>,
        image: &[u8],
    ) -> Result<String, LlmError> {
        let envelope = RequestEnvelope::text(prompt).with_part(ContentPart::image(image)?);
        into_text(self.execute(&envelope).await?)
    }

    /// Speak `text` with the configured default voice.
    pub async fn synthesize_speech(
        &self,
        text: impl Into<String>,
        style: Option<SpeechStyle>,
    ) -> Result<AudioClip, LlmError> {
        let envelope = RequestEnvelope::new(OutputMode::Audio { voice: None, style }).with_text(text);
        match self.execute(&envelope).await? {
            DecodedResult::Audio(clip) => Ok(clip),
            other => Err(unexpected(&other)),
        }
    }
}

fn model_for<'a>(config: &'a GeminiConfig, output: &OutputMode) -> &'a str {
    match output {
        OutputMode::Audio { .. } => &config.tts_model,
        _ => &config.model,
    }
}

fn into_text(result: DecodedResult) -> Result<String, LlmError> {
    match result {
        DecodedResult::Text(text) => Ok(text),
        other => Err(unexpected(&other)),
    }
}

fn unexpected(result: &DecodedResult) -> LlmError {
    let kind = match result {
        DecodedResult::Text(_) => "text",
        DecodedResult::Json(_) => "json",
        DecodedResult::Audio(_) => "audio",
    };
    LlmError::MalformedResponse(format!("unexpected {kind} result"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient::new(
            GeminiConfig::new("k")
                .with_model("text-model")
                .with_tts_model("speech-model"),
        )
        .unwrap()
    }

    #[test]
    fn audio_output_targets_speech_model() {
        let client = client();
        assert_eq!(client.model_for(&OutputMode::audio()), "speech-model");
        assert_eq!(client.model_for(&OutputMode::text()), "text-model");
    }

    #[test]
    fn client_is_send_sync_and_clone() {
        fn assert_traits<T: Clone + Send + Sync + 'static>() {}
        assert_traits::<GeminiClient>();
    }

    #[tokio::test(start_paused = true)]
    async fn unparseable_url_fails_once_without_backoff() {
        let client =
            GeminiClient::new(GeminiConfig::new("k").with_base_url("http://exa mple.com/v1beta"))
                .unwrap();
        let started = tokio::time::Instant::now();
        let err = client.generate_text("hello").await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidRequest(_)), "got {err:?}");
        assert_eq!(started.elapsed(), std::time::Duration::ZERO);
    }

    #[test]
    fn debug_output_does_not_leak_key() {
        let client = GeminiClient::new(GeminiConfig::new("very-secret")).unwrap();
        assert!(!format!("{client:?}").contains("very-secret"));
    }
}
