//! Geometry types and the native-to-screen projection.
//!
//! All geometry handed to this module is already normalized to a top-left
//! origin with Y increasing downward; source formats with other conventions
//! are flipped by the parser before they reach here.

use serde::Serialize;

use crate::document::MarkupItem;
use crate::error::{MarkupError, Result};

/// A point in 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Origin point (0, 0).
    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Per-page view state supplied by the base document renderer.
///
/// Native dimensions are in the base document's own units; rendered
/// dimensions are in screen pixels at the current zoom. Read-only to this
/// crate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom_scale: f64,
    pub page_width_native: f64,
    pub page_height_native: f64,
    pub page_width_rendered: f64,
    pub page_height_rendered: f64,
}

impl Viewport {
    /// Create a viewport, validating that the zoom and all dimensions are
    /// finite and strictly positive.
    pub fn new(
        zoom_scale: f64,
        page_width_native: f64,
        page_height_native: f64,
        page_width_rendered: f64,
        page_height_rendered: f64,
    ) -> Result<Self> {
        let dims = [
            ("zoom_scale", zoom_scale),
            ("page_width_native", page_width_native),
            ("page_height_native", page_height_native),
            ("page_width_rendered", page_width_rendered),
            ("page_height_rendered", page_height_rendered),
        ];
        for (name, value) in dims {
            if !value.is_finite() || value <= 0.0 {
                return Err(MarkupError::InvalidViewport(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }
        Ok(Self {
            zoom_scale,
            page_width_native,
            page_height_native,
            page_width_rendered,
            page_height_rendered,
        })
    }

    /// Horizontal native-to-screen scale factor.
    pub fn scale_x(&self) -> f64 {
        self.page_width_rendered / self.page_width_native
    }

    /// Vertical native-to-screen scale factor.
    pub fn scale_y(&self) -> f64 {
        self.page_height_rendered / self.page_height_native
    }
}

/// Project a single native-space point to screen space.
pub fn project_point(point: Point, viewport: &Viewport) -> Point {
    Point {
        x: point.x * viewport.scale_x(),
        y: point.y * viewport.scale_y(),
    }
}

/// Project an item's geometry to screen space.
///
/// Pure: does not mutate the item and returns a fresh point sequence each
/// call. Callers re-invoke this whenever the zoom or page dimensions
/// change; nothing is cached here.
pub fn project_item(item: &MarkupItem, viewport: &Viewport) -> Vec<Point> {
    item.geometry
        .iter()
        .map(|p| project_point(*p, viewport))
        .collect()
}
