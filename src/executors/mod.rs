//! Executors Layer
//!
//! HTTP orchestration that wires the transformers, the transport and the
//! retry executor into one pipeline call.

pub mod generate;

pub use generate::{GenerateExecutor, HttpGenerateExecutor};

use std::sync::Arc;

/// Hook to mutate JSON request bodies before sending.
pub type BeforeSendHook = Arc<
    dyn Fn(&serde_json::Value) -> Result<serde_json::Value, crate::error::LlmError> + Send + Sync,
>;
