use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::composer::segmenter::{excerpt, segment, strip_annotations};
use crate::composer::template::{layout_options, select_layout, TemplateName, TripCategory};
use crate::composer::{compose, ComposedDiary};
use crate::errors::AppError;
use crate::models::PhotoSegment;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ComposeRequest {
    pub title: String,
    #[serde(default)]
    pub full_text: String,
    /// Explicit template. When absent the template is looked up from
    /// `category` and `choice_index`, falling back to `default`.
    #[serde(default)]
    pub template: Option<TemplateName>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub choice_index: Option<usize>,
    #[serde(default)]
    pub segments: Vec<PhotoSegment>,
    /// Overlay board whose stickers should be attached to the composed pages.
    #[serde(default)]
    pub board_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SegmentRequest {
    pub full_text: String,
    pub target_count: usize,
}

#[derive(Debug, Serialize)]
pub struct SegmentResponse {
    pub chunks: Vec<String>,
    /// Thumbnail previews, one per chunk.
    pub excerpts: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectLayoutRequest {
    pub category: String,
    pub choice_index: usize,
}

#[derive(Debug, Serialize)]
pub struct SelectLayoutResponse {
    pub category: TripCategory,
    pub template: TemplateName,
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct LayoutOptionsResponse {
    pub category: TripCategory,
    pub label: &'static str,
    pub options: [TemplateName; 2],
}

/// POST /api/v1/compose
pub async fn handle_compose(
    State(state): State<AppState>,
    Json(req): Json<ComposeRequest>,
) -> Result<Json<ComposedDiary>, AppError> {
    let template = match (req.template, req.category.as_deref()) {
        (Some(template), _) => template,
        (None, Some(category)) => select_layout(category, req.choice_index.unwrap_or(0))?,
        (None, None) => TemplateName::default(),
    };

    let mut diary = compose(
        &req.title,
        &req.full_text,
        template,
        &req.segments,
        Utc::now(),
    )?;

    if let Some(board_id) = req.board_id {
        let overlays = state
            .boards
            .overlays_for_pages(board_id, diary.pages.len())
            .await?;
        for (page, overlays) in diary.pages.iter_mut().zip(overlays) {
            page.overlays = overlays;
        }
    }

    info!(
        template = template.as_str(),
        photos = req.segments.len(),
        pages = diary.pages.len(),
        board = ?req.board_id,
        "Composed diary"
    );
    Ok(Json(diary))
}

/// POST /api/v1/segments
pub async fn handle_segment(Json(req): Json<SegmentRequest>) -> Result<Json<SegmentResponse>, AppError> {
    let chunks = segment(&strip_annotations(&req.full_text), req.target_count)?;
    let excerpts = chunks.iter().map(|c| excerpt(c)).collect();
    Ok(Json(SegmentResponse { chunks, excerpts }))
}

/// POST /api/v1/layouts/select
pub async fn handle_select_layout(
    Json(req): Json<SelectLayoutRequest>,
) -> Result<Json<SelectLayoutResponse>, AppError> {
    let template = select_layout(&req.category, req.choice_index)?;
    Ok(Json(SelectLayoutResponse {
        category: TripCategory::parse(&req.category),
        template,
    }))
}

/// GET /api/v1/layouts/options?category=
pub async fn handle_layout_options(Query(q): Query<CategoryQuery>) -> Json<LayoutOptionsResponse> {
    let category = TripCategory::parse(&q.category);
    Json(LayoutOptionsResponse {
        category,
        label: category.label(),
        options: layout_options(category),
    })
}
