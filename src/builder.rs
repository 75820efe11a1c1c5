//! Gemini client builder
//!
//! ```rust,no_run
//! use medigen::prelude::*;
//!
//! # fn example() -> Result<(), LlmError> {
//! let client = GeminiClient::builder()
//!     .api_key("your-api-key")
//!     .timeout(std::time::Duration::from_secs(20))
//!     .with_retry(RetryPolicy::default().with_max_attempts(3))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::client::GeminiClient;
use crate::error::LlmError;
use crate::execution::http::{HttpTransport, ReqwestTransport};
use crate::executors::BeforeSendHook;
use crate::retry::RetryPolicy;
use crate::types::{GeminiConfig, HttpConfig};

/// Environment variable consulted when no API key is set explicitly.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Clone, Default)]
pub struct GeminiBuilder {
    api_key: Option<SecretString>,
    base_url: Option<String>,
    model: Option<String>,
    tts_model: Option<String>,
    default_voice: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    proxy: Option<String>,
    headers: HashMap<String, String>,
    retry_policy: Option<RetryPolicy>,
    http_client: Option<reqwest::Client>,
    http_transport: Option<Arc<dyn HttpTransport>>,
    before_send: Option<BeforeSendHook>,
}

impl std::fmt::Debug for GeminiBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiBuilder")
            .field("api_key_present", &self.api_key.is_some())
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("tts_model", &self.tts_model)
            .field("timeout", &self.timeout)
            .field("retry_policy", &self.retry_policy)
            .field("custom_transport", &self.http_transport.is_some())
            .finish_non_exhaustive()
    }
}

impl GeminiBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key
    pub fn api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    /// Set the base URL
    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Model for text, vision and JSON output
    pub fn model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Model for audio output
    pub fn tts_model<S: Into<String>>(mut self, model: S) -> Self {
        self.tts_model = Some(model.into());
        self
    }

    pub fn default_voice<S: Into<String>>(mut self, voice: S) -> Self {
        self.default_voice = Some(voice.into());
        self
    }

    /// Per-attempt request timeout (default 30s)
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn proxy<S: Into<String>>(mut self, proxy: S) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Extra header sent with every request
    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Use a preconfigured reqwest client. Timeout, proxy and user agent
    /// settings of this builder are then ignored, so the client must carry its
    /// own per-request timeout (`reqwest::ClientBuilder::timeout`); without one
    /// a hung attempt is never cut short.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Replace the HTTP layer entirely.
    pub fn with_http_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.http_transport = Some(transport);
        self
    }

    /// Rewrite each JSON body right before it is sent.
    pub fn before_send(mut self, hook: BeforeSendHook) -> Self {
        self.before_send = Some(hook);
        self
    }

    pub fn build(self) -> Result<GeminiClient, LlmError> {
        self.build_with_env(|name| std::env::var(name).ok())
    }

    fn build_with_env(
        self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<GeminiClient, LlmError> {
        let api_key = resolve_api_key(self.api_key, lookup)?;

        let http_config = HttpConfig::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent)
            .proxy(self.proxy)
            .build();
        let http_config = HttpConfig {
            headers: self.headers,
            ..http_config
        };

        let mut config = GeminiConfig {
            api_key,
            http_config,
            ..GeminiConfig::default()
        };
        if let Some(base_url) = self.base_url {
            let parsed = reqwest::Url::parse(&base_url).map_err(|e| {
                LlmError::ConfigurationError(format!("invalid base URL {base_url}: {e}"))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(LlmError::ConfigurationError(format!(
                    "base URL must be http(s): {base_url}"
                )));
            }
            config = config.with_base_url(base_url);
        }
        if let Some(model) = self.model {
            config = config.with_model(model);
        }
        if let Some(model) = self.tts_model {
            config = config.with_tts_model(model);
        }
        if let Some(voice) = self.default_voice {
            config = config.with_default_voice(voice);
        }

        let transport: Arc<dyn HttpTransport> = match (self.http_transport, self.http_client) {
            (Some(transport), _) => transport,
            (None, Some(client)) => {
                tracing::debug!(
                    target: "medigen::http",
                    "using caller-supplied reqwest client; builder timeout settings not applied"
                );
                Arc::new(ReqwestTransport::new(client))
            }
            (None, None) => Arc::new(ReqwestTransport::from_config(&config.http_config)?),
        };

        tracing::debug!(
            target: "medigen::http",
            base_url = %config.base_url,
            model = %config.model,
            tts_model = %config.tts_model,
            "built Gemini client"
        );

        Ok(GeminiClient::from_parts(
            config,
            transport,
            self.retry_policy.unwrap_or_default(),
            self.before_send,
        ))
    }
}

fn resolve_api_key(
    explicit: Option<SecretString>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, LlmError> {
    if let Some(key) = explicit
        && !key.expose_secret().trim().is_empty()
    {
        return Ok(key);
    }
    lookup(API_KEY_ENV)
        .filter(|key| !key.trim().is_empty())
        .map(SecretString::from)
        .ok_or_else(|| {
            LlmError::ConfigurationError(format!(
                "Gemini API key is required (set it on the builder or via {API_KEY_ENV})"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OutputMode;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_key_is_a_configuration_error() {
        let err = GeminiBuilder::new().build_with_env(no_env).unwrap_err();
        assert!(matches!(err, LlmError::ConfigurationError(_)));

        let err = GeminiBuilder::new()
            .api_key("  ")
            .build_with_env(no_env)
            .unwrap_err();
        assert!(matches!(err, LlmError::ConfigurationError(_)));
    }

    #[test]
    fn key_falls_back_to_environment() {
        let client = GeminiBuilder::new()
            .build_with_env(|name| (name == API_KEY_ENV).then(|| "env-key".to_string()))
            .unwrap();
        assert_eq!(client.config().api_key.expose_secret(), "env-key");
    }

    #[test]
    fn explicit_key_wins_over_environment() {
        let client = GeminiBuilder::new()
            .api_key("explicit")
            .build_with_env(|_| Some("env-key".to_string()))
            .unwrap();
        assert_eq!(client.config().api_key.expose_secret(), "explicit");
    }

    #[test]
    fn settings_flow_into_config() {
        let client = GeminiBuilder::new()
            .api_key("k")
            .base_url("http://127.0.0.1:9999/v1beta/")
            .model("m1")
            .tts_model("m2")
            .default_voice("Puck")
            .timeout(Duration::from_secs(5))
            .header("x-trace", "1")
            .build_with_env(no_env)
            .unwrap();
        let config = client.config();
        assert_eq!(config.base_url, "http://127.0.0.1:9999/v1beta");
        assert_eq!(config.default_voice, "Puck");
        assert_eq!(config.http_config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.http_config.headers.get("x-trace").map(String::as_str), Some("1"));
        assert_eq!(client.model_for(&OutputMode::audio()), "m2");
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = GeminiBuilder::new()
            .api_key("k")
            .base_url("ftp://example.com")
            .build_with_env(no_env)
            .unwrap_err();
        assert!(matches!(err, LlmError::ConfigurationError(_)));
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let err = GeminiBuilder::new()
            .api_key("k")
            .base_url("http://exa mple.com")
            .build_with_env(no_env)
            .unwrap_err();
        assert!(matches!(err, LlmError::ConfigurationError(_)));
    }

    #[test]
    fn debug_hides_key() {
        let builder = GeminiBuilder::new().api_key("hidden-value");
        assert!(!format!("{builder:?}").contains("hidden-value"));
    }
}
