//! Caller-facing request description.

use base64::Engine;

use super::{Blob, ResponseSchema};
use crate::error::LlmError;

/// A piece of user content.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    /// Image sent inline as base64 (vision-capable models).
    InlineImage(Blob),
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Inline image from raw bytes; the mime type is sniffed from the content.
    pub fn image(bytes: &[u8]) -> Result<Self, LlmError> {
        let kind = infer::get(bytes).ok_or_else(|| {
            LlmError::InvalidRequest("could not detect image type from bytes".to_string())
        })?;
        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(LlmError::InvalidRequest(format!(
                "expected image data, found {}",
                kind.mime_type()
            )));
        }
        let data = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(Self::InlineImage(Blob::new(kind.mime_type(), data)))
    }

    /// Inline image that is already base64 encoded.
    pub fn image_base64(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::InlineImage(Blob::new(mime_type, data))
    }
}

/// Speaking style prefixed to text sent for speech synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechStyle {
    /// `Say professionally: ...`
    Professional,
    /// `Say naturally: ...`
    Natural,
    /// `{directive}: ...`
    Custom(String),
}

impl SpeechStyle {
    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::Professional => format!("Say professionally: {text}"),
            Self::Natural => format!("Say naturally: {text}"),
            Self::Custom(directive) => format!("{directive}: {text}"),
        }
    }
}

/// Desired shape of the provider's answer.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputMode {
    /// Free text. `fallback` replaces an empty answer.
    PlainText { fallback: Option<String> },
    /// JSON constrained by `schema`. A missing schema is rejected at build time.
    StructuredJson { schema: Option<ResponseSchema> },
    /// Speech. `voice` defaults to the client's configured voice.
    Audio {
        voice: Option<String>,
        style: Option<SpeechStyle>,
    },
}

impl OutputMode {
    pub const fn text() -> Self {
        Self::PlainText { fallback: None }
    }

    pub fn text_or(fallback: impl Into<String>) -> Self {
        Self::PlainText {
            fallback: Some(fallback.into()),
        }
    }

    pub fn json(schema: ResponseSchema) -> Self {
        Self::StructuredJson {
            schema: Some(schema),
        }
    }

    pub const fn audio() -> Self {
        Self::Audio {
            voice: None,
            style: None,
        }
    }

    pub fn audio_with_voice(voice: impl Into<String>) -> Self {
        Self::Audio {
            voice: Some(voice.into()),
            style: None,
        }
    }

    /// Short name used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PlainText { .. } => "text",
            Self::StructuredJson { .. } => "json",
            Self::Audio { .. } => "audio",
        }
    }
}

/// Everything needed to build one provider request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    /// System-level framing, sent apart from user content.
    pub instruction: Option<String>,
    pub parts: Vec<ContentPart>,
    pub output: OutputMode,
}

impl RequestEnvelope {
    pub fn new(output: OutputMode) -> Self {
        Self {
            instruction: None,
            parts: Vec::new(),
            output,
        }
    }

    /// Single-prompt free text request.
    pub fn text(prompt: impl Into<String>) -> Self {
        Self::new(OutputMode::text()).with_text(prompt)
    }

    /// Single-prompt structured JSON request.
    pub fn json(prompt: impl Into<String>, schema: ResponseSchema) -> Self {
        Self::new(OutputMode::json(schema)).with_text(prompt)
    }

    /// Speech synthesis of `text` with the default voice.
    pub fn speech(text: impl Into<String>) -> Self {
        Self::new(OutputMode::audio()).with_text(text)
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(ContentPart::text(text));
        self
    }

    pub fn with_part(mut self, part: ContentPart) -> Self {
        self.parts.push(part);
        self
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89,
    ];

    #[test]
    fn image_part_sniffs_mime_type() {
        let part = ContentPart::image(PNG).unwrap();
        match part {
            ContentPart::InlineImage(blob) => {
                assert_eq!(blob.mime_type, "image/png");
                assert!(blob.data.starts_with("iVBORw0KGgo"));
            }
            other => panic!("unexpected part: {other:?}"),
        }
    }

    #[test]
    fn image_part_rejects_non_images() {
        let err = ContentPart::image(b"%PDF-1.7\n").unwrap_err();
        assert!(matches!(err, LlmError::InvalidRequest(_)));
        assert!(ContentPart::image(b"plain text").is_err());
    }

    #[test]
    fn speech_style_prefixes_text() {
        assert_eq!(
            SpeechStyle::Professional.apply("Take two tablets."),
            "Say professionally: Take two tablets."
        );
        assert_eq!(
            SpeechStyle::Custom("Whisper".into()).apply("hello"),
            "Whisper: hello"
        );
    }
}
