//! # medigen
//!
//! A resilient request pipeline for the Gemini `generateContent` API.
//!
//! One call runs four stages:
//!
//! 1. **Request building** (`transformers::request`): a [`RequestEnvelope`]
//!    (instruction, content parts, output mode) becomes the provider body,
//!    including the response schema for structured JSON and the voice
//!    selection for speech.
//! 2. **Backoff execution** (`retry`): transient failures (network, timeout,
//!    408, 429, 5xx) are retried with exponential backoff (5 attempts,
//!    1s doubling delay by default); other failures surface immediately.
//! 3. **Response extraction** (`transformers::response`): text, validated
//!    JSON or inline audio is pulled from the first candidate.
//! 4. **Audio decoding** (`transformers::audio`): raw 16-bit PCM is wrapped
//!    in a playable WAV container.
//!
//! ```rust,no_run
//! use medigen::prelude::*;
//!
//! # async fn example() -> Result<(), LlmError> {
//! let client = GeminiClient::builder().api_key("your-api-key").build()?;
//!
//! let advice = client.generate_text("How much water should an adult drink per day?").await?;
//!
//! let schema = ResponseSchema::object()
//!     .required_property("name", ResponseSchema::string())
//!     .required_property("phone", ResponseSchema::string());
//! let hospital = client.generate_json("Name one hospital in Lyon", schema).await?;
//!
//! let clip = client
//!     .synthesize_speech(advice, Some(SpeechStyle::Professional))
//!     .await?;
//! std::fs::write("advice.wav", clip.bytes).ok();
//! # let _ = hospital;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod client;
pub mod error;
pub mod execution;
pub mod executors;
pub mod observability;
pub mod prelude;
pub mod retry;
pub mod transformers;
pub mod types;
pub mod utils;

pub use builder::GeminiBuilder;
pub use client::GeminiClient;
pub use error::{ErrorCategory, LlmError, Result};
pub use retry::{RetryExecutor, RetryPolicy};
pub use types::{
    AudioClip, ContentPart, DecodedResult, GeminiConfig, HttpConfig, OutputMode,
    RequestEnvelope, ResponseSchema, SpeechStyle,
};
pub use utils::cancel::CancelHandle;
