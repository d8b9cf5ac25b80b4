use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::diary_ai::keywords::{ImageBlob, KeywordResult};
use crate::diary_ai::style::StyleResponse;
use crate::diary_ai::{DiaryTextRequest, StyleRequest};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct KeywordRequest {
    /// `data:` URL or bare base64.
    pub image_data: String,
}

#[derive(Debug, Serialize)]
pub struct DiaryTextResponse {
    pub text: String,
}

/// POST /api/v1/ai/keywords
pub async fn handle_extract_keywords(
    State(state): State<AppState>,
    Json(req): Json<KeywordRequest>,
) -> Result<Json<KeywordResult>, AppError> {
    if req.image_data.trim().is_empty() {
        return Err(AppError::Validation("image_data is required".to_string()));
    }
    let image = ImageBlob::decode(&req.image_data)
        .map_err(|e| AppError::Validation(format!("image_data is not valid base64: {e}")))?;
    if image.data.is_empty() {
        return Err(AppError::Validation("image_data decodes to no bytes".to_string()));
    }

    Ok(Json(state.ai.extract_keywords(&image).await?))
}

/// POST /api/v1/ai/diary-text
pub async fn handle_draft_text(
    State(state): State<AppState>,
    Json(req): Json<DiaryTextRequest>,
) -> Result<Json<DiaryTextResponse>, AppError> {
    if req.photo_count == 0 {
        return Err(AppError::Validation("photo_count must be at least 1".to_string()));
    }
    if req.title.trim().is_empty() && req.keywords.is_empty() {
        return Err(AppError::Validation(
            "a title or at least one keyword is required".to_string(),
        ));
    }

    let text = state.ai.draft_text(&req).await?;
    Ok(Json(DiaryTextResponse { text }))
}

/// POST /api/v1/ai/style
pub async fn handle_recommend_style(
    State(state): State<AppState>,
    Json(req): Json<StyleRequest>,
) -> Result<Json<StyleResponse>, AppError> {
    if req.title.trim().is_empty() && req.keywords.is_empty() && req.diary_text.trim().is_empty()
    {
        return Err(AppError::Validation("no diary content provided".to_string()));
    }

    Ok(Json(state.ai.recommend_style(&req).await?))
}
