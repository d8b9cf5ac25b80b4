//! In-memory overlay boards, one per open diary editor.
//!
//! Each session pairs an `OverlayBoard` with the page boxes last reported by the
//! client. Events are reduced under the write lock, so concurrent requests against
//! one board are applied one at a time and a failed event never leaves a partial
//! update behind.
//!
//! Editors that go away without closing their board are not told apart from idle
//! ones: any session untouched for the idle TTL is evicted, either by the periodic
//! sweeper or on the next `open`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::overlay::board::{Overlay, OverlayBoard, OverlayEvent};
use crate::overlay::geometry::{PageBounds, PlacementConfig, Point};
use crate::overlay::OverlayError;

#[derive(Debug, Clone, Serialize)]
pub struct BoardSnapshot {
    pub board_id: Uuid,
    pub pages: Vec<PageBounds>,
    pub board: OverlayBoard,
}

#[derive(Debug, Clone)]
struct BoardSession {
    board: OverlayBoard,
    pages: Vec<PageBounds>,
    last_touched: Instant,
}

/// Longest pause between idle sweeps.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct BoardRegistry {
    config: PlacementConfig,
    idle_ttl: Duration,
    sessions: Arc<RwLock<HashMap<Uuid, BoardSession>>>,
}

impl BoardRegistry {
    pub fn new(config: PlacementConfig, idle_ttl: Duration) -> Self {
        Self {
            config,
            idle_ttl,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Opens an empty board over the given page boxes.
    pub async fn open(&self, pages: Vec<PageBounds>) -> Result<BoardSnapshot, OverlayError> {
        validate_pages(&pages)?;
        self.evict_idle().await;

        let board_id = Uuid::new_v4();
        let session = BoardSession {
            board: OverlayBoard::new(),
            pages,
            last_touched: Instant::now(),
        };
        let snapshot = snapshot_of(board_id, &session);
        self.sessions.write().await.insert(board_id, session);
        info!(%board_id, pages = snapshot.pages.len(), "Opened overlay board");
        Ok(snapshot)
    }

    pub async fn snapshot(&self, board_id: Uuid) -> Result<BoardSnapshot, OverlayError> {
        let mut sessions = self.sessions.write().await;
        let session = touch(&mut sessions, board_id)?;
        Ok(snapshot_of(board_id, session))
    }

    /// Reduces one event into the board.
    pub async fn apply(
        &self,
        board_id: Uuid,
        event: OverlayEvent,
    ) -> Result<BoardSnapshot, OverlayError> {
        let mut sessions = self.sessions.write().await;
        let session = touch(&mut sessions, board_id)?;

        debug!(%board_id, ?event, "Applying overlay event");
        session.board = session
            .board
            .apply(event, session.pages.as_slice(), &self.config)?;
        Ok(snapshot_of(board_id, session))
    }

    /// Replaces the page boxes after a re-layout. Overlays on pages that no longer
    /// exist are discarded; the rest keep their positions.
    pub async fn set_pages(
        &self,
        board_id: Uuid,
        pages: Vec<PageBounds>,
    ) -> Result<BoardSnapshot, OverlayError> {
        validate_pages(&pages)?;
        let mut sessions = self.sessions.write().await;
        let session = touch(&mut sessions, board_id)?;

        session.board = session.board.retain_pages(pages.len());
        session.pages = pages;
        Ok(snapshot_of(board_id, session))
    }

    /// Overlays per page for `page_count` pages, trimming the board to that count.
    /// Used when a diary is recomposed against an existing board.
    pub async fn overlays_for_pages(
        &self,
        board_id: Uuid,
        page_count: usize,
    ) -> Result<Vec<Vec<Overlay>>, OverlayError> {
        let mut sessions = self.sessions.write().await;
        let session = touch(&mut sessions, board_id)?;

        session.board = session.board.retain_pages(page_count);
        session.pages.truncate(page_count);
        Ok((0..page_count)
            .map(|page| session.board.overlays(page).to_vec())
            .collect())
    }

    pub async fn hit_test(
        &self,
        board_id: Uuid,
        page: usize,
        point: Point,
    ) -> Result<Option<Overlay>, OverlayError> {
        let mut sessions = self.sessions.write().await;
        let session = touch(&mut sessions, board_id)?;
        Ok(session.board.hit_test(page, point, &self.config).cloned())
    }

    pub async fn close(&self, board_id: Uuid) -> Result<(), OverlayError> {
        self.sessions
            .write()
            .await
            .remove(&board_id)
            .map(|_| info!(%board_id, "Closed overlay board"))
            .ok_or(OverlayError::UnknownBoard(board_id))
    }

    /// Drops every session untouched for longer than the idle TTL and returns how
    /// many were dropped.
    pub async fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| now.duration_since(session.last_touched) < self.idle_ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Evicted idle overlay boards");
        }
        evicted
    }

    /// Runs `evict_idle` in the background for the lifetime of the runtime.
    pub fn spawn_idle_sweeper(&self) -> JoinHandle<()> {
        let registry = self.clone();
        let period = self.idle_ttl.min(MAX_SWEEP_INTERVAL).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                registry.evict_idle().await;
            }
        })
    }
}

/// Looks up a live session and marks it as used.
fn touch(
    sessions: &mut HashMap<Uuid, BoardSession>,
    board_id: Uuid,
) -> Result<&mut BoardSession, OverlayError> {
    let session = sessions
        .get_mut(&board_id)
        .ok_or(OverlayError::UnknownBoard(board_id))?;
    session.last_touched = Instant::now();
    Ok(session)
}

fn validate_pages(pages: &[PageBounds]) -> Result<(), OverlayError> {
    pages.iter().try_for_each(PageBounds::validate)
}

fn snapshot_of(board_id: Uuid, session: &BoardSession) -> BoardSnapshot {
    BoardSnapshot {
        board_id,
        pages: session.pages.clone(),
        board: session.board.clone(),
    }
}
