//! Photo keyword extraction: image payload handling and model-output parsing.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ai_client::{number_field, parse_json_object, text_field, AiError};

/// Confidence reported when the model omits one.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;
const DEFAULT_MIME: &str = "image/jpeg";

/// Raw image bytes on their way to the multimodal model.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlob {
    pub mime_type: String,
    pub data: Bytes,
}

impl ImageBlob {
    /// Accepts either a `data:<mime>;base64,<payload>` URL or bare base64.
    /// Bare base64 is assumed to be JPEG.
    pub fn decode(encoded: &str) -> Result<Self, base64::DecodeError> {
        let encoded = encoded.trim();
        let (mime_type, payload) = match encoded
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
        {
            Some((mime, payload)) if !mime.is_empty() => (mime, payload),
            Some((_, payload)) => (DEFAULT_MIME, payload),
            None => (DEFAULT_MIME, encoded),
        };

        Ok(Self {
            mime_type: mime_type.to_string(),
            data: Bytes::from(STANDARD.decode(payload)?),
        })
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordResult {
    pub keywords: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Deserialize)]
struct RawKeywords {
    #[serde(default)]
    keywords: Option<Value>,
    #[serde(default)]
    confidence: Option<Value>,
}

/// Parses the model's answer. Keywords are trimmed and de-duplicated in order.
/// A missing or non-list `keywords` becomes empty, non-string entries are skipped,
/// and a missing or non-numeric confidence becomes 0.8.
pub fn parse_keyword_response(text: &str) -> Result<KeywordResult, AiError> {
    let raw: RawKeywords = parse_json_object(text)?;

    let entries: &[Value] = match &raw.keywords {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    };
    let mut keywords: Vec<String> = Vec::new();
    for keyword in entries.iter().filter_map(|k| text_field(Some(k))) {
        let keyword = keyword.trim();
        if !keyword.is_empty() && !keywords.iter().any(|k| k == keyword) {
            keywords.push(keyword.to_string());
        }
    }

    let confidence = number_field(raw.confidence.as_ref())
        .map(|c| c.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_CONFIDENCE);

    Ok(KeywordResult {
        keywords,
        confidence,
    })
}
