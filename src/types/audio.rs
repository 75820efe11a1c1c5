//! Decoded pipeline results.

use std::time::Duration;

/// Size of the canonical RIFF/WAVE header preceding the PCM data.
pub const WAV_HEADER_LEN: usize = 44;

/// A self-contained, playable WAV file holding 16-bit mono PCM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    /// Header followed by the raw PCM bytes.
    pub bytes: Vec<u8>,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub channels: u16,
}

impl AudioClip {
    pub const fn mime_type(&self) -> &'static str {
        "audio/wav"
    }

    /// The PCM section after the header.
    pub fn pcm(&self) -> &[u8] {
        self.bytes.get(WAV_HEADER_LEN..).unwrap_or_default()
    }

    /// Little-endian signed samples.
    pub fn samples(&self) -> impl Iterator<Item = i16> + '_ {
        self.pcm()
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
    }

    pub fn duration(&self) -> Duration {
        let bytes_per_second =
            u64::from(self.sample_rate) * u64::from(self.channels) * u64::from(self.bits_per_sample / 8);
        if bytes_per_second == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.pcm().len() as f64 / bytes_per_second as f64)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Inline binary payload as found in the first response part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinePayload {
    pub mime_type: String,
    /// Base64 encoded.
    pub data: String,
}

/// Result of one pipeline invocation, shaped by the requested output mode.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedResult {
    Text(String),
    Json(serde_json::Value),
    Audio(AudioClip),
}

impl DecodedResult {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_audio(&self) -> Option<&AudioClip> {
        match self {
            Self::Audio(a) => Some(a),
            _ => None,
        }
    }
}
