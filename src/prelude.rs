//! Commonly used types.

pub use crate::builder::GeminiBuilder;
pub use crate::client::GeminiClient;
pub use crate::error::{ErrorCategory, LlmError};
pub use crate::observability::{TracingConfig, init_tracing};
pub use crate::retry::{RetryExecutor, RetryPolicy};
pub use crate::types::{
    AudioClip, ContentPart, DecodedResult, GeminiConfig, OutputMode, RequestEnvelope,
    ResponseSchema, SpeechStyle,
};
pub use crate::utils::cancel::CancelHandle;
