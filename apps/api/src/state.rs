use std::sync::Arc;

use crate::config::Config;
use crate::diary_ai::DiaryAi;
use crate::overlay::session::BoardRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable AI backend. Production uses `LlmDiaryAi`.
    pub ai: Arc<dyn DiaryAi>,
    /// Live overlay editing sessions.
    pub boards: BoardRegistry,
}

impl AppState {
    pub fn new(config: Config, ai: Arc<dyn DiaryAi>) -> Self {
        let boards = BoardRegistry::new(config.placement, config.board_idle_ttl);
        Self { config, ai, boards }
    }
}

#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    use std::time::Duration;

    use crate::config::{DEFAULT_AI_BODY_LIMIT_BYTES, DEFAULT_BOARD_IDLE_TTL_SECS};
    use crate::diary_ai::StubDiaryAi;
    use crate::overlay::geometry::PlacementConfig;

    let config = Config {
        ai_api_key: "test-key".to_string(),
        ai_api_url: "http://127.0.0.1:9/unused".to_string(),
        ai_model: "stub".to_string(),
        ai_body_limit_bytes: DEFAULT_AI_BODY_LIMIT_BYTES,
        placement: PlacementConfig::default(),
        board_idle_ttl: Duration::from_secs(DEFAULT_BOARD_IDLE_TTL_SECS),
        port: 0,
        rust_log: "debug".to_string(),
    };
    AppState::new(config, Arc::new(StubDiaryAi))
}
