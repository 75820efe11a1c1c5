//! Response transformation
//!
//! Pulls the payload out of a Gemini `generateContent` response. Only the
//! first part of the first candidate is considered.

use crate::error::LlmError;
use crate::types::{
    DecodedResult, GenerateContentResponse, InlinePayload, OutputMode, Part, ResponseSchema,
};

use super::audio::decode_inline;

/// Transform provider responses into decoded results
pub trait ResponseTransformer: Send + Sync {
    /// Provider identifier
    fn provider_id(&self) -> &str;

    /// Decode a raw response body according to the requested output mode
    fn transform_response(
        &self,
        body: &[u8],
        output: &OutputMode,
    ) -> Result<DecodedResult, LlmError>;
}

/// Gemini response extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeminiResponseExtractor;

impl ResponseTransformer for GeminiResponseExtractor {
    fn provider_id(&self) -> &str {
        "gemini"
    }

    fn transform_response(
        &self,
        body: &[u8],
        output: &OutputMode,
    ) -> Result<DecodedResult, LlmError> {
        let response = parse_response(body)?;
        match output {
            OutputMode::PlainText { fallback } => {
                extract_text(&response, fallback.as_deref()).map(DecodedResult::Text)
            }
            OutputMode::StructuredJson { schema } => {
                extract_json(&response, schema.as_ref()).map(DecodedResult::Json)
            }
            OutputMode::Audio { .. } => {
                let payload = extract_audio(&response)?;
                decode_inline(&payload).map(DecodedResult::Audio)
            }
        }
    }
}

/// Deserialize a response body.
pub fn parse_response(body: &[u8]) -> Result<GenerateContentResponse, LlmError> {
    serde_json::from_slice(body).map_err(|e| {
        LlmError::MalformedResponse(format!("response body is not a Gemini response: {e}"))
    })
}

/// First part of the first candidate.
///
/// `Ok(None)` when there are no candidates at all; an error when a candidate
/// exists but carries no content or no parts.
fn first_part(response: &GenerateContentResponse) -> Result<Option<&Part>, LlmError> {
    let Some(candidate) = response.candidates.first() else {
        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            tracing::debug!(target: "medigen::http", block_reason = reason, "prompt was blocked");
        }
        return Ok(None);
    };
    let content = candidate.content.as_ref().ok_or_else(|| {
        LlmError::MalformedResponse(format!(
            "candidate has no content (finish_reason={})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        ))
    })?;
    content
        .parts
        .first()
        .map(Some)
        .ok_or_else(|| LlmError::MalformedResponse("candidate content has no parts".to_string()))
}

fn require_first_part(response: &GenerateContentResponse) -> Result<&Part, LlmError> {
    first_part(response)?
        .ok_or_else(|| LlmError::MalformedResponse("response has no candidates".to_string()))
}

/// Free-text answer. An empty answer (no candidates, or a first part without
/// text) yields `fallback`, or an empty string when none is given.
pub fn extract_text(
    response: &GenerateContentResponse,
    fallback: Option<&str>,
) -> Result<String, LlmError> {
    let text = first_part(response)?
        .and_then(|part| part.text.as_deref())
        .filter(|text| !text.is_empty());
    Ok(text.or(fallback).unwrap_or_default().to_string())
}

/// Structured answer, parsed as JSON and checked against `schema` when given.
pub fn extract_json(
    response: &GenerateContentResponse,
    schema: Option<&ResponseSchema>,
) -> Result<serde_json::Value, LlmError> {
    let text = require_first_part(response)?
        .text
        .as_deref()
        .ok_or_else(|| LlmError::MalformedResponse("first part carries no text".to_string()))?;

    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| LlmError::SchemaViolation(format!("output is not valid JSON: {e}")))?;

    if let Some(schema) = schema {
        schema.validate(&value)?;
    }
    Ok(value)
}

/// Inline audio data of the first part.
pub fn extract_audio(response: &GenerateContentResponse) -> Result<InlinePayload, LlmError> {
    let blob = require_first_part(response)?
        .inline_data
        .as_ref()
        .ok_or_else(|| LlmError::MalformedResponse("first part carries no inline data".to_string()))?;
    Ok(InlinePayload {
        mime_type: blob.mime_type.clone(),
        data: blob.data.clone(),
    })
}
