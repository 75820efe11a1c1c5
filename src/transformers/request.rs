//! Request transformation
//!
//! Turns a caller-facing `RequestEnvelope` into the Gemini
//! `generateContent` body. Building is pure: the same envelope always
//! serializes to the same bytes.

use crate::error::LlmError;
use crate::types::{
    Content, ContentPart, DEFAULT_VOICE, GenerateContentRequest, GenerationConfig, OutputMode,
    Part, RequestEnvelope, SpeechConfig, SpeechStyle,
};

/// Transform a request envelope into a provider-specific payload
pub trait RequestTransformer: Send + Sync {
    /// Provider identifier (e.g. "gemini")
    fn provider_id(&self) -> &str;

    /// Build the typed provider request
    fn transform(&self, envelope: &RequestEnvelope) -> Result<GenerateContentRequest, LlmError>;

    /// Build the JSON body sent over the wire
    fn transform_json(&self, envelope: &RequestEnvelope) -> Result<serde_json::Value, LlmError> {
        let request = self.transform(envelope)?;
        Ok(serde_json::to_value(request)?)
    }
}

/// Gemini request builder.
#[derive(Debug, Clone)]
pub struct GeminiRequestBuilder {
    default_voice: String,
}

impl Default for GeminiRequestBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_VOICE)
    }
}

impl GeminiRequestBuilder {
    pub fn new(default_voice: impl Into<String>) -> Self {
        Self {
            default_voice: default_voice.into(),
        }
    }

    pub fn default_voice(&self) -> &str {
        &self.default_voice
    }

    pub fn build(&self, envelope: &RequestEnvelope) -> Result<GenerateContentRequest, LlmError> {
        validate_parts(envelope)?;

        let system_instruction = match envelope.instruction.as_deref() {
            Some(text) if text.trim().is_empty() => {
                return Err(LlmError::InvalidRequest(
                    "system instruction is blank".to_string(),
                ));
            }
            Some(text) => Some(Content::text(text)),
            None => None,
        };

        let (style, generation_config) = match &envelope.output {
            OutputMode::PlainText { .. } => (None, None),
            OutputMode::StructuredJson { schema } => {
                let schema = schema.as_ref().ok_or_else(|| {
                    LlmError::InvalidRequest(
                        "structured JSON output requires a response schema".to_string(),
                    )
                })?;
                let config = GenerationConfig::new()
                    .with_response_mime_type("application/json")
                    .with_response_schema(schema.to_provider_value());
                (None, Some(config))
            }
            OutputMode::Audio { voice, style } => {
                if envelope
                    .parts
                    .iter()
                    .any(|p| matches!(p, ContentPart::InlineImage(_)))
                {
                    return Err(LlmError::InvalidRequest(
                        "audio output accepts text parts only".to_string(),
                    ));
                }
                let voice = voice
                    .as_deref()
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .unwrap_or(self.default_voice.as_str());
                let config = GenerationConfig::new()
                    .with_response_modalities(vec!["AUDIO".to_string()])
                    .with_speech_config(SpeechConfig::prebuilt(voice));
                (style.as_ref(), Some(config))
            }
        };

        let parts = envelope
            .parts
            .iter()
            .map(|part| to_wire_part(part, style))
            .collect();

        Ok(GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            system_instruction,
            generation_config,
        })
    }
}

impl RequestTransformer for GeminiRequestBuilder {
    fn provider_id(&self) -> &str {
        "gemini"
    }

    fn transform(&self, envelope: &RequestEnvelope) -> Result<GenerateContentRequest, LlmError> {
        self.build(envelope)
    }
}

fn validate_parts(envelope: &RequestEnvelope) -> Result<(), LlmError> {
    if envelope.parts.is_empty() {
        return Err(LlmError::InvalidRequest(
            "request has no content parts".to_string(),
        ));
    }
    for (index, part) in envelope.parts.iter().enumerate() {
        match part {
            ContentPart::Text(text) if text.trim().is_empty() => {
                return Err(LlmError::InvalidRequest(format!(
                    "content part {index} is blank"
                )));
            }
            ContentPart::InlineImage(blob) if blob.mime_type.is_empty() || blob.data.is_empty() => {
                return Err(LlmError::InvalidRequest(format!(
                    "content part {index} has an empty image payload"
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

fn to_wire_part(part: &ContentPart, style: Option<&SpeechStyle>) -> Part {
    match part {
        ContentPart::Text(text) => match style {
            Some(style) => Part::text(style.apply(text)),
            None => Part::text(text.clone()),
        },
        ContentPart::InlineImage(blob) => Part::inline(blob.clone()),
    }
}
