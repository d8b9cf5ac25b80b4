pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::composer::handlers as composer;
use crate::diary_ai::handlers as ai;
use crate::overlay::handlers as boards;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // AI collaborators take whole photos as base64 JSON
    let ai_routes = Router::new()
        .route("/api/v1/ai/keywords", post(ai::handle_extract_keywords))
        .route("/api/v1/ai/diary-text", post(ai::handle_draft_text))
        .route("/api/v1/ai/style", post(ai::handle_recommend_style))
        .layer(DefaultBodyLimit::max(state.config.ai_body_limit_bytes));

    Router::new()
        .route("/health", get(health::health_handler))
        // Composer
        .route("/api/v1/compose", post(composer::handle_compose))
        .route("/api/v1/segments", post(composer::handle_segment))
        .route("/api/v1/layouts/select", post(composer::handle_select_layout))
        .route("/api/v1/layouts/options", get(composer::handle_layout_options))
        // Overlay boards
        .route("/api/v1/boards", post(boards::handle_create_board))
        .route(
            "/api/v1/boards/:id",
            get(boards::handle_get_board).delete(boards::handle_close_board),
        )
        .route("/api/v1/boards/:id/events", post(boards::handle_board_event))
        .route("/api/v1/boards/:id/pages", put(boards::handle_set_pages))
        .route("/api/v1/boards/:id/hit", get(boards::handle_hit_test))
        .merge(ai_routes)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::state::test_state;

    fn app() -> Router {
        build_router(test_state())
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn segment(id: &str, capture_time: i64) -> Value {
        json!({
            "id": id,
            "image_ref": { "kind": "url", "url": format!("https://cdn.example.com/{id}.jpg") },
            "keywords": ["바다", "노을", "여유로웠다", "맛있었다"],
            "capture_time": capture_time
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "diary-api");
    }

    #[tokio::test]
    async fn test_compose_by_category() {
        let (status, body) = send(
            &app(),
            Method::POST,
            "/api/v1/compose",
            Some(json!({
                "title": "둘이서 강릉",
                "full_text": "커피를 마셨다.\n\n바다를 봤다.",
                "category": "커플여행",
                "choice_index": 0,
                "segments": [segment("b", 2_000), segment("a", 1_000)]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["template"], "couple");
        assert_eq!(body["pages"].as_array().unwrap().len(), 1);
        assert_eq!(body["pages"][0]["segments"][0]["id"], "a");
        assert_eq!(body["pages"][0]["text_chunks"][1], "바다를 봤다.");
    }

    #[tokio::test]
    async fn test_compose_rejects_bad_choice() {
        let (status, body) = send(
            &app(),
            Method::POST,
            "/api/v1/compose",
            Some(json!({
                "title": "t",
                "category": "가족여행",
                "choice_index": 2,
                "segments": [segment("a", 1)]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_segments_endpoint() {
        let (status, body) = send(
            &app(),
            Method::POST,
            "/api/v1/segments",
            Some(json!({ "full_text": "하나. 둘. 셋. 넷.", "target_count": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chunks"], json!(["하나. 둘.", "셋. 넷."]));
        assert_eq!(body["excerpts"][0], "하나....");

        let (status, _) = send(
            &app(),
            Method::POST,
            "/api/v1/segments",
            Some(json!({ "full_text": "x", "target_count": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app(),
            Method::POST,
            "/api/v1/segments",
            Some(json!({ "full_text": "하나. 둘.", "target_count": 1u64 << 40 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_layout_endpoints() {
        let (status, body) = send(
            &app(),
            Method::POST,
            "/api/v1/layouts/select",
            Some(json!({ "category": "맛집탐방여행", "choice_index": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["template"], "couple");
        assert_eq!(body["category"], "food_trip");

        let (status, body) = send(&app(), Method::GET, "/api/v1/layouts/options?category=unknown", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["options"], json!(["default", "default"]));
    }

    #[tokio::test]
    async fn test_board_lifecycle_and_compose_attaches_overlays() {
        let app = app();
        let page = json!({ "width": 800.0, "height": 1200.0 });

        let (status, board) = send(
            &app,
            Method::POST,
            "/api/v1/boards",
            Some(json!({ "pages": [page, page] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = board["board_id"].as_str().unwrap().to_string();

        let (status, snapshot) = send(
            &app,
            Method::POST,
            &format!("/api/v1/boards/{id}/events"),
            Some(json!({
                "type": "drop",
                "pointer": { "x": 0.0, "y": 0.0 },
                "page": 0,
                "image_ref": "/emotion/cw1.png"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let overlay = &snapshot["board"]["pages"]["0"][0];
        assert_eq!(overlay["position"], json!({ "x": 0.0, "y": 0.0 }));

        let (status, hit) = send(
            &app,
            Method::GET,
            &format!("/api/v1/boards/{id}/hit?page=0&x=10&y=10"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(hit["overlay"]["id"], overlay["id"]);

        let (status, diary) = send(
            &app,
            Method::POST,
            "/api/v1/compose",
            Some(json!({
                "title": "t",
                "full_text": "a.\n\nb.",
                "template": "default",
                "segments": [segment("a", 1), segment("b", 2)],
                "board_id": id
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(diary["pages"][0]["overlays"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/boards/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, body) = send(&app, Method::GET, &format!("/api/v1/boards/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_board_event_errors() {
        let app = app();
        let (_, board) = send(
            &app,
            Method::POST,
            "/api/v1/boards",
            Some(json!({ "pages": [{ "width": 800.0, "height": 1200.0 }] })),
        )
        .await;
        let id = board["board_id"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/boards/{id}/events");

        let (status, body) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({
                "type": "resize_grab_start",
                "pointer": { "x": 0.0, "y": 0.0 },
                "overlay_id": "overlay-1",
                "handle": "up",
                "page": 0
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, _) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({ "type": "remove", "overlay_id": "ghost", "page": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // drop, grab, then a second grab while dragging
        send(
            &app,
            Method::POST,
            &uri,
            Some(json!({ "type": "drop", "pointer": { "x": 400.0, "y": 600.0 }, "page": 0, "image_ref": "s.png" })),
        )
        .await;
        let grab = json!({ "type": "grab_start", "pointer": { "x": 400.0, "y": 600.0 }, "overlay_id": "overlay-1", "page": 0 });
        let (status, _) = send(&app, Method::POST, &uri, Some(grab.clone())).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, Method::POST, &uri, Some(grab)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_set_pages_drops_overlays_on_removed_pages() {
        let app = app();
        let page = json!({ "width": 800.0, "height": 1200.0 });
        let (_, board) = send(&app, Method::POST, "/api/v1/boards", Some(json!({ "pages": [page, page] }))).await;
        let id = board["board_id"].as_str().unwrap().to_string();
        send(
            &app,
            Method::POST,
            &format!("/api/v1/boards/{id}/events"),
            Some(json!({ "type": "drop", "pointer": { "x": 50.0, "y": 50.0 }, "page": 1, "image_ref": "s.png" })),
        )
        .await;

        let (status, snapshot) = send(
            &app,
            Method::PUT,
            &format!("/api/v1/boards/{id}/pages"),
            Some(json!({ "pages": [page] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(snapshot["board"]["pages"].get("1").is_none());
        assert_eq!(snapshot["pages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ai_endpoints_with_stub() {
        let app = app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/ai/keywords",
            Some(json!({ "image_data": "data:image/png;base64,aGVsbG8=" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["keywords"], json!(["바다", "여유로웠다"]));
        assert_eq!(body["confidence"], 0.8);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/ai/keywords",
            Some(json!({ "image_data": "%%%" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/ai/diary-text",
            Some(json!({ "title": "부산", "keywords": ["바다"], "photo_count": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "1번째 사진의 하루.\n\n2번째 사진의 하루.");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/ai/diary-text",
            Some(json!({ "title": "부산", "photo_count": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/ai/style",
            Some(json!({ "title": "부산" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recommendation"]["background_color"], "#fef3c7");
        assert_eq!(body["recommendation"]["text_color"], "#1f2937");
        assert_eq!(body["recommendation"]["font_family"], "Nanum Pen Script");
        assert_eq!(body["recommendation"]["font_size"], 18);

        let (status, _) = send(&app, Method::POST, "/api/v1/ai/style", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_keywords_accepts_photo_above_default_body_limit() {
        // 3 MiB of base64, past axum's 2 MB default
        let payload = "A".repeat(3 * 1024 * 1024);
        let (status, body) = send(
            &app(),
            Method::POST,
            "/api/v1/ai/keywords",
            Some(json!({ "image_data": format!("data:image/jpeg;base64,{payload}") })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["keywords"], json!(["바다", "여유로웠다"]));
    }

    #[tokio::test]
    async fn test_ai_body_limit_comes_from_config() {
        let mut state = test_state();
        state.config.ai_body_limit_bytes = 1024;
        let app = build_router(state);
        let body = json!({ "image_data": "A".repeat(4096) }).to_string();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/ai/keywords")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
