//! Execution layer
//!
//! Everything between a built provider request and raw provider bytes:
//! transport, headers and HTTP status classification.

pub mod http;
