//! Error Handling Module
//!
//! Error handling for the request pipeline:
//! - Core error types (`LlmError`, `ErrorCategory`)
//! - Type conversions from common error types
//!
//! # Example
//!
//! ```rust,ignore
//! use medigen::error::{LlmError, ErrorCategory};
//!
//! let error = LlmError::api_error(503, "Service Unavailable");
//! assert_eq!(error.category(), ErrorCategory::Transient);
//! assert!(error.is_retryable());
//! ```

mod conversions;
pub mod types;

pub use types::*;
