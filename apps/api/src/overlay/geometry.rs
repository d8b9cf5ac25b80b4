//! Units, page bounds, and clamping for overlay placement.
//!
//! Overlay sizes are stored in physical units (millimetres on the printed page).
//! Positions are page-local pixels as measured by the client. `px_per_unit` is the
//! bridge; the 3.78 default corresponds to a 96 DPI screen.

use serde::{Deserialize, Serialize};

use crate::overlay::OverlayError;

pub const DEFAULT_PX_PER_UNIT: f64 = 3.78;
pub const DEFAULT_MIN_SIZE_UNITS: f64 = 5.0;
pub const DEFAULT_OVERLAY_SIZE_UNITS: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    pub px_per_unit: f64,
    /// Smallest width or height an overlay can be resized to.
    pub min_size_units: f64,
    /// Square size given to a freshly dropped overlay.
    pub default_size_units: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            px_per_unit: DEFAULT_PX_PER_UNIT,
            min_size_units: DEFAULT_MIN_SIZE_UNITS,
            default_size_units: DEFAULT_OVERLAY_SIZE_UNITS,
        }
    }
}

impl PlacementConfig {
    pub fn validate(&self) -> Result<(), OverlayError> {
        let finite_positive = |v: f64| v.is_finite() && v > 0.0;
        if !finite_positive(self.px_per_unit)
            || !finite_positive(self.min_size_units)
            || !finite_positive(self.default_size_units)
        {
            return Err(OverlayError::InvalidConfig(
                "placement constants must be finite and positive".to_string(),
            ));
        }
        if self.default_size_units < self.min_size_units {
            return Err(OverlayError::InvalidConfig(format!(
                "default overlay size {} is below the minimum {}",
                self.default_size_units, self.min_size_units
            )));
        }
        Ok(())
    }

    pub fn size_to_px(&self, size: Size) -> Size {
        Size {
            width: size.width * self.px_per_unit,
            height: size.height * self.px_per_unit,
        }
    }

    pub fn px_to_units(&self, px: f64) -> f64 {
        px / self.px_per_unit
    }

    pub fn default_size(&self) -> Size {
        Size {
            width: self.default_size_units,
            height: self.default_size_units,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset_from(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// A page's measured pixel box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageBounds {
    pub width: f64,
    pub height: f64,
}

impl PageBounds {
    pub fn validate(&self) -> Result<(), OverlayError> {
        if self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0 {
            Ok(())
        } else {
            Err(OverlayError::InvalidPageBounds {
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Clamps a top-left corner so a box of `size_px` stays on the page:
    /// `0 <= x <= width - size.width`, same for y. A box wider than the page is
    /// pinned to 0.
    pub fn clamp_origin(&self, origin: Point, size_px: Size) -> Point {
        Point {
            x: origin.x.min(self.width - size_px.width).max(0.0),
            y: origin.y.min(self.height - size_px.height).max(0.0),
        }
    }

    /// Largest overlay size, in units, that still fits on this page.
    pub fn max_size_units(&self, config: &PlacementConfig) -> Size {
        Size {
            width: config.px_to_units(self.width),
            height: config.px_to_units(self.height),
        }
    }
}

/// Supplies page boxes to the placement math so it never touches a live view tree.
pub trait PageGeometry {
    fn page_bounds(&self, page: usize) -> Option<PageBounds>;

    fn page_count(&self) -> usize;
}

impl PageGeometry for [PageBounds] {
    fn page_bounds(&self, page: usize) -> Option<PageBounds> {
        self.get(page).copied()
    }

    fn page_count(&self) -> usize {
        self.len()
    }
}
