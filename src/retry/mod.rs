//! Retry module
//!
//! - `policy.rs`: `RetryPolicy` (bounded exponential backoff) and `RetryExecutor`

pub mod policy;

pub use policy::*;
