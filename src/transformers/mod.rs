//! Transformers layer
//!
//! - `request`: envelope -> Gemini request body
//! - `response`: Gemini response -> text / JSON / inline audio
//! - `audio`: inline PCM -> WAV

pub mod audio;
pub mod request;
pub mod response;

pub use audio::{WavHeader, decode_inline, decode_pcm_base64, encode_wav, sample_rate_from_mime};
pub use request::{GeminiRequestBuilder, RequestTransformer};
pub use response::{
    GeminiResponseExtractor, ResponseTransformer, extract_audio, extract_json, extract_text,
    parse_response,
};
