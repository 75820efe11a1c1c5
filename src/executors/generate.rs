//! `generateContent` executor
//!
//! build -> (send -> classify)* under retry -> extract -> decode.
//! Request building happens once, before any network call; extraction and
//! decoding happen once, after the retried send succeeds.

use reqwest::header::HeaderMap;
use std::sync::Arc;

use super::BeforeSendHook;
use crate::error::LlmError;
use crate::execution::http::{
    HttpRequestContext, HttpTransport, HttpTransportRequest, classify_http_error,
};
use crate::retry::RetryExecutor;
use crate::transformers::{RequestTransformer, ResponseTransformer};
use crate::types::{DecodedResult, OutputMode, RequestEnvelope};
use crate::utils::cancel::CancelHandle;

/// Resolves `(model, url)` for an output mode.
pub type EndpointResolver = Arc<dyn Fn(&OutputMode) -> (String, String) + Send + Sync>;
pub type HeaderBuilder = Arc<dyn Fn() -> Result<HeaderMap, LlmError> + Send + Sync>;

#[async_trait::async_trait]
pub trait GenerateExecutor: Send + Sync {
    async fn execute(
        &self,
        envelope: &RequestEnvelope,
        cancel: Option<&CancelHandle>,
    ) -> Result<DecodedResult, LlmError>;
}

pub struct HttpGenerateExecutor {
    pub provider_id: String,
    pub transport: Arc<dyn HttpTransport>,
    pub request_transformer: Arc<dyn RequestTransformer>,
    pub response_transformer: Arc<dyn ResponseTransformer>,
    pub retry: RetryExecutor,
    pub resolve_endpoint: EndpointResolver,
    pub build_headers: HeaderBuilder,
    pub before_send: Option<BeforeSendHook>,
}

impl std::fmt::Debug for HttpGenerateExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGenerateExecutor")
            .field("provider_id", &self.provider_id)
            .field("retry", &self.retry)
            .field("has_before_send", &self.before_send.is_some())
            .finish_non_exhaustive()
    }
}

impl HttpGenerateExecutor {
    /// Build the final JSON body (transformer output plus the optional hook).
    pub fn build_body(&self, envelope: &RequestEnvelope) -> Result<serde_json::Value, LlmError> {
        let body = self.request_transformer.transform_json(envelope)?;
        match &self.before_send {
            Some(hook) => hook(&body),
            None => Ok(body),
        }
    }

    async fn send_with_retry(
        &self,
        request: HttpTransportRequest,
        cancel: Option<&CancelHandle>,
    ) -> Result<Vec<u8>, LlmError> {
        let operation = || {
            let transport = self.transport.clone();
            let request = request.clone();
            let provider_id = self.provider_id.clone();
            async move {
                let response = transport.execute_json(request).await?;
                if response.is_success() {
                    Ok(response.body)
                } else {
                    Err(classify_http_error(
                        &provider_id,
                        response.status,
                        &response.body_text(),
                        &response.headers,
                    ))
                }
            }
        };

        match cancel {
            Some(cancel) => self.retry.execute_cancellable(operation, cancel).await,
            None => self.retry.execute(operation).await,
        }
    }
}

#[async_trait::async_trait]
impl GenerateExecutor for HttpGenerateExecutor {
    async fn execute(
        &self,
        envelope: &RequestEnvelope,
        cancel: Option<&CancelHandle>,
    ) -> Result<DecodedResult, LlmError> {
        let body = self.build_body(envelope)?;
        let (model, url) = (self.resolve_endpoint)(&envelope.output);
        let headers = (self.build_headers)()?;
        let ctx = HttpRequestContext::new(self.provider_id.clone(), model);

        tracing::debug!(
            target: "medigen::http",
            request_id = %ctx.request_id,
            model = %ctx.model,
            mode = envelope.output.name(),
            "executing generateContent"
        );

        let request = HttpTransportRequest {
            ctx,
            url,
            headers,
            body,
        };
        let raw = self.send_with_retry(request, cancel).await?;
        self.response_transformer
            .transform_response(&raw, &envelope.output)
    }
}
