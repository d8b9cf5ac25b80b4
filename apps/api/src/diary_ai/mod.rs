//! Diary AI: the three hosted-model collaborators the composer relies on.
//!
//! - keyword extraction: photo → Korean keywords + confidence
//! - diary drafting: title + keywords + photo count → diary text
//! - style recommendation: title + keywords + text → colors, font, size
//!
//! `AppState` holds an `Arc<dyn DiaryAi>`; `LlmDiaryAi` is the production backend
//! and tests swap in a canned one. Model output is always parsed and sanitised
//! here, so callers never see partial data.

pub mod handlers;
pub mod keywords;
pub mod prompts;
pub mod style;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ai_client::prompts::JSON_ONLY_SYSTEM;
use crate::ai_client::{AiClient, AiError, ChatMessage};
use crate::composer::segmenter::strip_annotations;
use crate::diary_ai::keywords::{parse_keyword_response, ImageBlob, KeywordResult};
use crate::diary_ai::style::{parse_style_response, StyleResponse};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiaryTextRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub photo_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub diary_text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait DiaryAi: Send + Sync {
    async fn extract_keywords(&self, image: &ImageBlob) -> Result<KeywordResult, AiError>;

    async fn draft_text(&self, req: &DiaryTextRequest) -> Result<String, AiError>;

    async fn recommend_style(&self, req: &StyleRequest) -> Result<StyleResponse, AiError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmDiaryAi: hosted model backend
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmDiaryAi(pub AiClient);

#[async_trait]
impl DiaryAi for LlmDiaryAi {
    async fn extract_keywords(&self, image: &ImageBlob) -> Result<KeywordResult, AiError> {
        let messages = [
            ChatMessage::system(JSON_ONLY_SYSTEM),
            ChatMessage::user_with_image(prompts::keyword_prompt(), image.to_data_url()),
        ];
        let text = self.0.call_text(&messages, prompts::KEYWORD_MAX_TOKENS).await?;
        let result = parse_keyword_response(&text)?;
        info!(
            keywords = result.keywords.len(),
            confidence = result.confidence,
            "Extracted photo keywords"
        );
        Ok(result)
    }

    async fn draft_text(&self, req: &DiaryTextRequest) -> Result<String, AiError> {
        let messages = [ChatMessage::user(prompts::diary_text_prompt(
            &req.title,
            &req.keywords,
            req.photo_count,
        ))];
        let text = self.0.call_text(&messages, prompts::DIARY_TEXT_MAX_TOKENS).await?;
        let text = strip_annotations(&text);
        if text.trim().is_empty() {
            return Err(AiError::EmptyContent);
        }
        info!(photos = req.photo_count, chars = text.chars().count(), "Drafted diary text");
        Ok(text)
    }

    async fn recommend_style(&self, req: &StyleRequest) -> Result<StyleResponse, AiError> {
        let messages = [
            ChatMessage::system(JSON_ONLY_SYSTEM),
            ChatMessage::user(prompts::style_prompt(
                &req.title,
                &req.keywords,
                &req.diary_text,
            )),
        ];
        let text = self.0.call_text(&messages, prompts::STYLE_MAX_TOKENS).await?;
        let style = parse_style_response(&text)?;
        info!(
            font = style.recommendation.font_family.css_name(),
            "Recommended page style"
        );
        Ok(style)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Canned backend for tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) struct StubDiaryAi;

#[cfg(test)]
#[async_trait]
impl DiaryAi for StubDiaryAi {
    async fn extract_keywords(&self, image: &ImageBlob) -> Result<KeywordResult, AiError> {
        if image.data.is_empty() {
            return Err(AiError::EmptyContent);
        }
        parse_keyword_response(r#"{"keywords": ["바다", "여유로웠다"]}"#)
    }

    async fn draft_text(&self, req: &DiaryTextRequest) -> Result<String, AiError> {
        Ok((1..=req.photo_count)
            .map(|i| format!("{i}번째 사진의 하루."))
            .collect::<Vec<_>>()
            .join("\n\n"))
    }

    async fn recommend_style(&self, _req: &StyleRequest) -> Result<StyleResponse, AiError> {
        parse_style_response(r##"{"backgroundColor": "#fef3c7", "fontFamily": "Nanum Pen Script"}"##)
    }
}
