//! Audio payload decoding
//!
//! Gemini speech output arrives as base64 raw PCM (signed 16-bit
//! little-endian, mono) with a mime type such as
//! `audio/L16;codec=pcm;rate=24000`. This module wraps it in a 44-byte
//! RIFF/WAVE header so the result is directly playable.

use base64::Engine;

use crate::error::LlmError;
use crate::types::{AudioClip, DEFAULT_SAMPLE_RATE, InlinePayload, WAV_HEADER_LEN};

const BITS_PER_SAMPLE: u16 = 16;
const CHANNELS: u16 = 1;
const PCM_FORMAT: u16 = 1;

/// Parsed canonical WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    /// `36 + data_len`
    pub chunk_size: u32,
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_len: u32,
}

impl WavHeader {
    /// Header for `data_len` bytes of 16-bit mono PCM.
    pub const fn pcm16_mono(sample_rate: u32, data_len: u32) -> Self {
        let block_align = CHANNELS * (BITS_PER_SAMPLE / 8);
        Self {
            chunk_size: data_len.saturating_add(36),
            audio_format: PCM_FORMAT,
            channels: CHANNELS,
            sample_rate,
            byte_rate: sample_rate.saturating_mul(block_align as u32),
            block_align,
            bits_per_sample: BITS_PER_SAMPLE,
            data_len,
        }
    }

    pub fn to_bytes(&self) -> [u8; WAV_HEADER_LEN] {
        let mut out = [0u8; WAV_HEADER_LEN];
        out[0..4].copy_from_slice(b"RIFF");
        out[4..8].copy_from_slice(&self.chunk_size.to_le_bytes());
        out[8..12].copy_from_slice(b"WAVE");
        out[12..16].copy_from_slice(b"fmt ");
        out[16..20].copy_from_slice(&16u32.to_le_bytes());
        out[20..22].copy_from_slice(&self.audio_format.to_le_bytes());
        out[22..24].copy_from_slice(&self.channels.to_le_bytes());
        out[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[28..32].copy_from_slice(&self.byte_rate.to_le_bytes());
        out[32..34].copy_from_slice(&self.block_align.to_le_bytes());
        out[34..36].copy_from_slice(&self.bits_per_sample.to_le_bytes());
        out[36..40].copy_from_slice(b"data");
        out[40..44].copy_from_slice(&self.data_len.to_le_bytes());
        out
    }

    /// Read a canonical 44-byte header back.
    pub fn parse(bytes: &[u8]) -> Result<Self, LlmError> {
        let header = bytes.get(..WAV_HEADER_LEN).ok_or_else(|| {
            LlmError::InvalidAudioPayload(format!(
                "WAV data too short: {} bytes",
                bytes.len()
            ))
        })?;
        if &header[0..4] != b"RIFF" || &header[8..12] != b"WAVE" {
            return Err(LlmError::InvalidAudioPayload(
                "missing RIFF/WAVE signature".to_string(),
            ));
        }
        if &header[12..16] != b"fmt " || &header[36..40] != b"data" {
            return Err(LlmError::InvalidAudioPayload(
                "unsupported WAV layout".to_string(),
            ));
        }

        let u16_at = |i: usize| u16::from_le_bytes([header[i], header[i + 1]]);
        let u32_at =
            |i: usize| u32::from_le_bytes([header[i], header[i + 1], header[i + 2], header[i + 3]]);

        Ok(Self {
            chunk_size: u32_at(4),
            audio_format: u16_at(20),
            channels: u16_at(22),
            sample_rate: u32_at(24),
            byte_rate: u32_at(28),
            block_align: u16_at(32),
            bits_per_sample: u16_at(34),
            data_len: u32_at(40),
        })
    }
}

/// Prefix `pcm` with a 16-bit mono WAV header.
pub fn encode_wav(pcm: &[u8], sample_rate: u32) -> Result<AudioClip, LlmError> {
    let data_len = u32::try_from(pcm.len())
        .ok()
        .filter(|n| n.checked_add(36).is_some())
        .ok_or_else(|| {
            LlmError::InvalidAudioPayload(format!("PCM payload too large: {} bytes", pcm.len()))
        })?;
    let header = WavHeader::pcm16_mono(sample_rate, data_len);

    let mut bytes = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(pcm);

    Ok(AudioClip {
        bytes,
        sample_rate,
        bits_per_sample: BITS_PER_SAMPLE,
        channels: CHANNELS,
    })
}

/// Decode base64 16-bit PCM into a playable WAV clip.
pub fn decode_pcm_base64(data: &str, sample_rate: u32) -> Result<AudioClip, LlmError> {
    let pcm = base64::engine::general_purpose::STANDARD.decode(data.trim())?;
    if pcm.is_empty() {
        return Err(LlmError::InvalidAudioPayload(
            "audio payload is empty".to_string(),
        ));
    }
    if pcm.len() % 2 != 0 {
        tracing::warn!(
            target: "medigen::audio",
            bytes = pcm.len(),
            "PCM payload has odd length, cannot hold 16-bit samples"
        );
        return Err(LlmError::InvalidAudioPayload(format!(
            "odd PCM length {} for 16-bit samples",
            pcm.len()
        )));
    }
    if sample_rate == 0 {
        return Err(LlmError::InvalidAudioPayload(
            "sample rate must be positive".to_string(),
        ));
    }
    tracing::debug!(target: "medigen::audio", bytes = pcm.len(), sample_rate, "wrapping PCM");
    encode_wav(&pcm, sample_rate)
}

/// Decode an inline payload, honouring the sample rate declared in its mime type.
///
/// Payloads that already are WAV files are returned as is.
pub fn decode_inline(payload: &InlinePayload) -> Result<AudioClip, LlmError> {
    let mime = payload.mime_type.to_ascii_lowercase();
    if !mime.starts_with("audio/") {
        return Err(LlmError::InvalidAudioPayload(format!(
            "expected audio, got '{}'",
            payload.mime_type
        )));
    }

    if mime.starts_with("audio/wav") || mime.starts_with("audio/x-wav") {
        let bytes = base64::engine::general_purpose::STANDARD.decode(payload.data.trim())?;
        let header = WavHeader::parse(&bytes)?;
        return Ok(AudioClip {
            bytes,
            sample_rate: header.sample_rate,
            bits_per_sample: header.bits_per_sample,
            channels: header.channels,
        });
    }

    let rate = sample_rate_from_mime(&payload.mime_type).unwrap_or(DEFAULT_SAMPLE_RATE);
    decode_pcm_base64(&payload.data, rate)
}

/// `audio/L16;codec=pcm;rate=24000` -> `Some(24000)`
pub fn sample_rate_from_mime(mime_type: &str) -> Option<u32> {
    mime_type
        .split(';')
        .filter_map(|param| param.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("rate"))
        .and_then(|(_, value)| value.trim().parse::<u32>().ok())
        .filter(|rate| *rate > 0)
}
