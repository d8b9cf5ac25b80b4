use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::overlay::board::{Overlay, OverlayEvent};
use crate::overlay::geometry::{PageBounds, Point};
use crate::overlay::session::BoardSnapshot;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PagesRequest {
    pub pages: Vec<PageBounds>,
}

#[derive(Debug, Deserialize)]
pub struct HitQuery {
    pub page: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Serialize)]
pub struct HitResponse {
    pub overlay: Option<Overlay>,
}

/// POST /api/v1/boards
pub async fn handle_create_board(
    State(state): State<AppState>,
    Json(req): Json<PagesRequest>,
) -> Result<(StatusCode, Json<BoardSnapshot>), AppError> {
    let snapshot = state.boards.open(req.pages).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// GET /api/v1/boards/:id
pub async fn handle_get_board(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BoardSnapshot>, AppError> {
    Ok(Json(state.boards.snapshot(id).await?))
}

/// POST /api/v1/boards/:id/events
///
/// Malformed events (unknown `type`, bad handle name) come back as validation
/// errors rather than axum's plain-text rejection.
pub async fn handle_board_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<OverlayEvent>, JsonRejection>,
) -> Result<Json<BoardSnapshot>, AppError> {
    let Json(event) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    Ok(Json(state.boards.apply(id, event).await?))
}

/// PUT /api/v1/boards/:id/pages
pub async fn handle_set_pages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PagesRequest>,
) -> Result<Json<BoardSnapshot>, AppError> {
    Ok(Json(state.boards.set_pages(id, req.pages).await?))
}

/// GET /api/v1/boards/:id/hit?page=&x=&y=
pub async fn handle_hit_test(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(q): Query<HitQuery>,
) -> Result<Json<HitResponse>, AppError> {
    let overlay = state
        .boards
        .hit_test(id, q.page, Point::new(q.x, q.y))
        .await?;
    Ok(Json(HitResponse { overlay }))
}

/// DELETE /api/v1/boards/:id
pub async fn handle_close_board(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.boards.close(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
