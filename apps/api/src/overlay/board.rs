//! Overlay board: decorative stickers per page, driven by pointer gestures.
//!
//! # Reducer
//! `OverlayBoard::apply` is a pure transition `(board, event) -> board`. Page boxes
//! come from a `PageGeometry` and unit constants from `PlacementConfig`; nothing is
//! measured here. Every change to a page replaces that page's whole overlay list.
//!
//! # Gestures
//! `Idle -> Dragging -> Idle` and `Idle -> Resizing -> Idle`. Only one gesture can
//! be live across all pages; a second grab while one is live is rejected.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::overlay::geometry::{PageBounds, PageGeometry, PlacementConfig, Point, Size};
use crate::overlay::OverlayError;

/// A decorative image placed on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub id: String,
    /// Source image (URL or asset path). Several overlays may share one.
    pub image_ref: String,
    /// Top-left corner, page-local pixels.
    pub position: Point,
    /// Physical units.
    pub size: Size,
}

impl Overlay {
    fn hit(&self, point: Point, config: &PlacementConfig) -> bool {
        let px = config.size_to_px(self.size);
        point.x >= self.position.x
            && point.x <= self.position.x + px.width
            && point.y >= self.position.y
            && point.y <= self.position.y + px.height
    }
}

/// One of the eight grab points around a selected overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl ResizeHandle {
    pub fn as_str(self) -> &'static str {
        match self {
            ResizeHandle::N => "n",
            ResizeHandle::S => "s",
            ResizeHandle::E => "e",
            ResizeHandle::W => "w",
            ResizeHandle::Ne => "ne",
            ResizeHandle::Nw => "nw",
            ResizeHandle::Se => "se",
            ResizeHandle::Sw => "sw",
        }
    }

    fn north(self) -> bool {
        matches!(self, ResizeHandle::N | ResizeHandle::Ne | ResizeHandle::Nw)
    }

    fn south(self) -> bool {
        matches!(self, ResizeHandle::S | ResizeHandle::Se | ResizeHandle::Sw)
    }

    fn east(self) -> bool {
        matches!(self, ResizeHandle::E | ResizeHandle::Ne | ResizeHandle::Se)
    }

    fn west(self) -> bool {
        matches!(self, ResizeHandle::W | ResizeHandle::Nw | ResizeHandle::Sw)
    }
}

impl FromStr for ResizeHandle {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "n" => Ok(ResizeHandle::N),
            "s" => Ok(ResizeHandle::S),
            "e" => Ok(ResizeHandle::E),
            "w" => Ok(ResizeHandle::W),
            "ne" => Ok(ResizeHandle::Ne),
            "nw" => Ok(ResizeHandle::Nw),
            "se" => Ok(ResizeHandle::Se),
            "sw" => Ok(ResizeHandle::Sw),
            other => Err(OverlayError::UnknownHandle(other.to_string())),
        }
    }
}

impl TryFrom<String> for ResizeHandle {
    type Error = OverlayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResizeHandle> for String {
    fn from(handle: ResizeHandle) -> Self {
        handle.as_str().to_string()
    }
}

/// The live pointer gesture, if any.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        page: usize,
        overlay_id: String,
        /// `pointer - position` at grab time.
        grab_offset: Point,
    },
    Resizing {
        page: usize,
        overlay_id: String,
        handle: ResizeHandle,
        pointer_start: Point,
        start_position: Point,
        start_size: Size,
    },
}

impl Gesture {
    fn overlay_id(&self) -> Option<&str> {
        match self {
            Gesture::Idle => None,
            Gesture::Dragging { overlay_id, .. } | Gesture::Resizing { overlay_id, .. } => {
                Some(overlay_id)
            }
        }
    }
}

/// Input events from the hosting UI. Pointer positions are page-local pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OverlayEvent {
    /// A source image released over `page`; the pointer becomes the overlay's centre.
    Drop {
        pointer: Point,
        page: usize,
        image_ref: String,
    },
    GrabStart {
        pointer: Point,
        overlay_id: String,
        page: usize,
    },
    ResizeGrabStart {
        pointer: Point,
        overlay_id: String,
        handle: ResizeHandle,
        page: usize,
    },
    PointerMove {
        pointer: Point,
    },
    PointerRelease,
    /// Double activation on an overlay.
    Remove {
        overlay_id: String,
        page: usize,
    },
    /// `None` clears the selection (click on empty page area).
    Select {
        overlay_id: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayBoard {
    pages: BTreeMap<usize, Vec<Overlay>>,
    selected: Option<String>,
    gesture: Gesture,
    next_serial: u64,
}

impl OverlayBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlays(&self, page: usize) -> &[Overlay] {
        self.pages.get(&page).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn pages(&self) -> &BTreeMap<usize, Vec<Overlay>> {
        &self.pages
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Topmost overlay under `point` on `page`. Later drops sit above earlier ones.
    pub fn hit_test(&self, page: usize, point: Point, config: &PlacementConfig) -> Option<&Overlay> {
        self.overlays(page).iter().rev().find(|o| o.hit(point, config))
    }

    /// Drops every overlay on pages at or beyond `page_count`, clearing selection and
    /// gesture state that referred to them.
    pub fn retain_pages(&self, page_count: usize) -> OverlayBoard {
        let mut next = self.clone();
        next.pages.retain(|&page, _| page < page_count);
        next.forget_missing();
        next
    }

    /// Applies one event and returns the resulting board. On error the current board
    /// is untouched.
    pub fn apply<G: PageGeometry + ?Sized>(
        &self,
        event: OverlayEvent,
        geometry: &G,
        config: &PlacementConfig,
    ) -> Result<OverlayBoard, OverlayError> {
        match event {
            OverlayEvent::Drop {
                pointer,
                page,
                image_ref,
            } => self.on_drop(pointer, page, image_ref, geometry, config),
            OverlayEvent::GrabStart {
                pointer,
                overlay_id,
                page,
            } => self.on_grab_start(pointer, &overlay_id, page, geometry),
            OverlayEvent::ResizeGrabStart {
                pointer,
                overlay_id,
                handle,
                page,
            } => self.on_resize_grab_start(pointer, &overlay_id, handle, page, geometry),
            OverlayEvent::PointerMove { pointer } => Ok(self.on_pointer_move(pointer, geometry, config)),
            OverlayEvent::PointerRelease => Ok(self.on_pointer_release()),
            OverlayEvent::Remove { overlay_id, page } => self.on_remove(&overlay_id, page),
            OverlayEvent::Select { overlay_id } => self.on_select(overlay_id),
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Transitions
    // ────────────────────────────────────────────────────────────────────────

    fn on_drop<G: PageGeometry + ?Sized>(
        &self,
        pointer: Point,
        page: usize,
        image_ref: String,
        geometry: &G,
        config: &PlacementConfig,
    ) -> Result<OverlayBoard, OverlayError> {
        let bounds = require_page(geometry, page)?;
        let size = fit_size(config.default_size(), &bounds, config);
        let size_px = config.size_to_px(size);
        let centered = Point::new(
            pointer.x - size_px.width / 2.0,
            pointer.y - size_px.height / 2.0,
        );

        let mut next = self.clone();
        next.next_serial += 1;
        let overlay = Overlay {
            id: format!("overlay-{}", next.next_serial),
            image_ref,
            position: bounds.clamp_origin(centered, size_px),
            size,
        };

        let mut list = self.overlays(page).to_vec();
        list.push(overlay);
        next.pages.insert(page, list);
        Ok(next)
    }

    fn on_grab_start<G: PageGeometry + ?Sized>(
        &self,
        pointer: Point,
        overlay_id: &str,
        page: usize,
        geometry: &G,
    ) -> Result<OverlayBoard, OverlayError> {
        self.require_idle()?;
        require_page(geometry, page)?;
        let overlay = self.require_overlay(overlay_id, page)?;

        let mut next = self.clone();
        next.selected = Some(overlay.id.clone());
        next.gesture = Gesture::Dragging {
            page,
            overlay_id: overlay.id.clone(),
            grab_offset: pointer.offset_from(overlay.position),
        };
        Ok(next)
    }

    fn on_resize_grab_start<G: PageGeometry + ?Sized>(
        &self,
        pointer: Point,
        overlay_id: &str,
        handle: ResizeHandle,
        page: usize,
        geometry: &G,
    ) -> Result<OverlayBoard, OverlayError> {
        self.require_idle()?;
        require_page(geometry, page)?;
        let overlay = self.require_overlay(overlay_id, page)?;

        let mut next = self.clone();
        next.selected = Some(overlay.id.clone());
        next.gesture = Gesture::Resizing {
            page,
            overlay_id: overlay.id.clone(),
            handle,
            pointer_start: pointer,
            start_position: overlay.position,
            start_size: overlay.size,
        };
        Ok(next)
    }

    /// Moves or resizes the gesture's overlay. Without a live gesture, or when the
    /// overlay or its page has vanished, the board is returned unchanged.
    fn on_pointer_move<G: PageGeometry + ?Sized>(
        &self,
        pointer: Point,
        geometry: &G,
        config: &PlacementConfig,
    ) -> OverlayBoard {
        let (page, overlay_id) = match &self.gesture {
            Gesture::Idle => return self.clone(),
            Gesture::Dragging {
                page, overlay_id, ..
            }
            | Gesture::Resizing {
                page, overlay_id, ..
            } => (*page, overlay_id.as_str()),
        };
        let Some(bounds) = geometry.page_bounds(page) else {
            return self.clone();
        };

        let updated: Vec<Overlay> = self
            .overlays(page)
            .iter()
            .map(|o| {
                if o.id != overlay_id {
                    return o.clone();
                }
                match &self.gesture {
                    Gesture::Dragging { grab_offset, .. } => {
                        moved(o, pointer, *grab_offset, &bounds, config)
                    }
                    Gesture::Resizing {
                        handle,
                        pointer_start,
                        start_position,
                        start_size,
                        ..
                    } => resized(
                        o,
                        *handle,
                        pointer.offset_from(*pointer_start),
                        *start_position,
                        *start_size,
                        &bounds,
                        config,
                    ),
                    Gesture::Idle => o.clone(),
                }
            })
            .collect();

        let mut next = self.clone();
        next.pages.insert(page, updated);
        next
    }

    fn on_pointer_release(&self) -> OverlayBoard {
        let mut next = self.clone();
        next.gesture = Gesture::Idle;
        next
    }

    fn on_remove(&self, overlay_id: &str, page: usize) -> Result<OverlayBoard, OverlayError> {
        self.require_overlay(overlay_id, page)?;

        let remaining: Vec<Overlay> = self
            .overlays(page)
            .iter()
            .filter(|o| o.id != overlay_id)
            .cloned()
            .collect();

        let mut next = self.clone();
        next.pages.insert(page, remaining);
        next.forget_missing();
        Ok(next)
    }

    fn on_select(&self, overlay_id: Option<String>) -> Result<OverlayBoard, OverlayError> {
        if let Some(id) = &overlay_id {
            if self.find_page_of(id).is_none() {
                return Err(OverlayError::UnknownOverlay {
                    overlay_id: id.clone(),
                    page: None,
                });
            }
        }
        let mut next = self.clone();
        next.selected = overlay_id;
        Ok(next)
    }

    // ────────────────────────────────────────────────────────────────────────
    // Helpers
    // ────────────────────────────────────────────────────────────────────────

    fn require_idle(&self) -> Result<(), OverlayError> {
        match self.gesture.overlay_id() {
            None => Ok(()),
            Some(active) => Err(OverlayError::GestureInProgress {
                overlay_id: active.to_string(),
            }),
        }
    }

    fn require_overlay(&self, overlay_id: &str, page: usize) -> Result<&Overlay, OverlayError> {
        self.overlays(page)
            .iter()
            .find(|o| o.id == overlay_id)
            .ok_or_else(|| OverlayError::UnknownOverlay {
                overlay_id: overlay_id.to_string(),
                page: Some(page),
            })
    }

    fn find_page_of(&self, overlay_id: &str) -> Option<usize> {
        self.pages
            .iter()
            .find(|(_, list)| list.iter().any(|o| o.id == overlay_id))
            .map(|(&page, _)| page)
    }

    /// Clears selection and gesture when their overlay no longer exists.
    fn forget_missing(&mut self) {
        if let Some(id) = self.selected.clone() {
            if self.find_page_of(&id).is_none() {
                self.selected = None;
            }
        }
        if let Some(id) = self.gesture.overlay_id().map(str::to_string) {
            if self.find_page_of(&id).is_none() {
                self.gesture = Gesture::Idle;
            }
        }
    }
}

fn require_page<G: PageGeometry + ?Sized>(geometry: &G, page: usize) -> Result<PageBounds, OverlayError> {
    geometry.page_bounds(page).ok_or(OverlayError::UnknownPage {
        page,
        page_count: geometry.page_count(),
    })
}

/// Caps a size so it never exceeds the page in either dimension.
fn fit_size(size: Size, bounds: &PageBounds, config: &PlacementConfig) -> Size {
    let max = bounds.max_size_units(config);
    Size {
        width: size.width.min(max.width),
        height: size.height.min(max.height),
    }
}

fn moved(
    overlay: &Overlay,
    pointer: Point,
    grab_offset: Point,
    bounds: &PageBounds,
    config: &PlacementConfig,
) -> Overlay {
    let target = pointer.offset_from(grab_offset);
    Overlay {
        position: bounds.clamp_origin(target, config.size_to_px(overlay.size)),
        ..overlay.clone()
    }
}

/// Resizes from the gesture's starting geometry, so repeated moves never accumulate
/// rounding. Pointer deltas are converted to units before they touch the size; the
/// minimum size wins over the drag, and the page size wins over both.
fn resized(
    overlay: &Overlay,
    handle: ResizeHandle,
    delta_px: Point,
    start_position: Point,
    start_size: Size,
    bounds: &PageBounds,
    config: &PlacementConfig,
) -> Overlay {
    let max = bounds.max_size_units(config);
    let limit = |value: f64, max: f64| value.max(config.min_size_units).min(max);
    let dx = config.px_to_units(delta_px.x);
    let dy = config.px_to_units(delta_px.y);

    let mut size = start_size;
    let mut position = start_position;

    if handle.east() {
        size.width = limit(start_size.width + dx, max.width);
    }
    if handle.west() {
        size.width = limit(start_size.width - dx, max.width);
        position.x = start_position.x + (start_size.width - size.width) * config.px_per_unit;
    }
    if handle.south() {
        size.height = limit(start_size.height + dy, max.height);
    }
    if handle.north() {
        size.height = limit(start_size.height - dy, max.height);
        position.y = start_position.y + (start_size.height - size.height) * config.px_per_unit;
    }

    Overlay {
        position: bounds.clamp_origin(position, config.size_to_px(size)),
        size,
        ..overlay.clone()
    }
}
