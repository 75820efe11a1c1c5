//! HTTP Utilities
//!
//! - `transport`: injectable JSON POST transport (`reqwest` by default)
//! - `headers`: Gemini request headers
//! - `errors`: mapping of non-success statuses to `LlmError`

pub mod errors;
pub mod headers;
pub mod transport;

pub use errors::classify_http_error;
pub use headers::{HttpHeaderBuilder, build_gemini_headers};
pub use transport::{
    HttpRequestContext, HttpTransport, HttpTransportRequest, HttpTransportResponse,
    ReqwestTransport, build_http_client,
};
