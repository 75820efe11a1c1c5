//! Core types
//!
//! - **`config`** - provider configuration (`GeminiConfig`)
//! - **`http`** - HTTP configuration (`HttpConfig` and builder)
//! - **`content`** / **`generation`** - Gemini `generateContent` wire types
//! - **`schema`** - response schema tree for structured output
//! - **`envelope`** - caller-facing request description (`RequestEnvelope`, `OutputMode`)
//! - **`audio`** - decoded results (`AudioClip`, `DecodedResult`)

mod audio;
mod config;
mod content;
mod envelope;
mod generation;
mod http;
mod schema;

pub use audio::{AudioClip, DecodedResult, InlinePayload, WAV_HEADER_LEN};
pub use config::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_SAMPLE_RATE, DEFAULT_TTS_MODEL, DEFAULT_VOICE,
    GeminiConfig,
};
pub use content::{Blob, Content, Part};
pub use envelope::{ContentPart, OutputMode, RequestEnvelope, SpeechStyle};
pub use generation::{
    Candidate, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    PrebuiltVoiceConfig, PromptFeedback, SpeechConfig, UsageMetadata, VoiceConfig,
};
pub use http::{DEFAULT_REQUEST_TIMEOUT, HttpConfig, HttpConfigBuilder};
pub use schema::{ResponseSchema, SchemaKind};
