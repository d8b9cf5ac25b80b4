// Overlay Placement Engine
// Free-form decorative images on composed pages. `board` holds the pure reducer,
// `session` keeps boards alive between HTTP requests.

pub mod board;
pub mod geometry;
pub mod handlers;
pub mod session;

use thiserror::Error;
use uuid::Uuid;

pub use board::Overlay;

#[derive(Debug, Error, PartialEq)]
pub enum OverlayError {
    #[error("overlay board {0} not found")]
    UnknownBoard(Uuid),

    #[error("page {page} does not exist (board has {page_count} pages)")]
    UnknownPage { page: usize, page_count: usize },

    #[error("overlay '{overlay_id}' not found")]
    UnknownOverlay {
        overlay_id: String,
        page: Option<usize>,
    },

    #[error("unknown resize handle '{0}', expected one of n, s, e, w, ne, nw, se, sw")]
    UnknownHandle(String),

    #[error("a gesture on overlay '{overlay_id}' is still in progress")]
    GestureInProgress { overlay_id: String },

    #[error("invalid placement config: {0}")]
    InvalidConfig(String),

    #[error("invalid page bounds {width}x{height}")]
    InvalidPageBounds { width: f64, height: f64 },
}
