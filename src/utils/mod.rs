//! Utility modules
//!
//! This module contains various utility functions and types used throughout the library.

pub mod cancel;

pub use cancel::{CancelHandle, new_cancel_handle};
