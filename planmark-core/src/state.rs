//! Mutable per-session layer style and selection state.
//!
//! This is the only mutable state in the engine. It is rebuilt from the
//! parsed document on every load and discarded with it; it is never merged
//! with a prior session's state. All mutators are synchronous and take
//! effect for the next render pass.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::document::{MarkupDocument, AREA_FILL_OPACITY};
use crate::error::{MarkupError, Result};

/// Per-layer visibility and style, keyed by layer id in the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerStyleState {
    pub visible: bool,
    /// `#RRGGBB` hex string.
    pub color: String,
    /// In `[0, 1]`.
    pub opacity: f64,
}

/// Holds per-layer style state and the single-item selection.
///
/// Single-writer by construction: only the sidebar controller (via the
/// engine surface) mutates it; the renderer only reads.
#[derive(Debug, Clone, Default)]
pub struct LayerStateStore {
    states: HashMap<String, LayerStyleState>,
    selection: Option<String>,
}

impl LayerStateStore {
    /// Initialize state for every layer of a freshly parsed document.
    ///
    /// Visibility defaults to true, color to the layer's default color,
    /// and opacity to 1.0 for stroke layers or the domain fill default for
    /// area-style layers.
    pub fn for_document(document: &MarkupDocument) -> Self {
        let states = document
            .layers
            .iter()
            .map(|layer| {
                let fill = layer.items.iter().any(|i| i.kind.is_fill())
                    && layer.items.iter().all(|i| i.kind.is_fill());
                (
                    layer.id.clone(),
                    LayerStyleState {
                        visible: true,
                        color: layer.default_color.clone(),
                        opacity: if fill { AREA_FILL_OPACITY } else { 1.0 },
                    },
                )
            })
            .collect();
        Self {
            states,
            selection: None,
        }
    }

    pub fn state(&self, layer_id: &str) -> Option<&LayerStyleState> {
        self.states.get(layer_id)
    }

    pub fn set_visible(&mut self, layer_id: &str, visible: bool) -> Result<()> {
        let state = self.state_mut(layer_id)?;
        state.visible = visible;
        Ok(())
    }

    /// Set a layer's color. Invalid hex input is rejected: the prior color
    /// is left unchanged and the failure surfaced to the caller, never
    /// silently substituted with a default.
    pub fn set_color(&mut self, layer_id: &str, color: &str) -> Result<()> {
        if !is_valid_hex_color(color) {
            warn!(layer_id, color, "rejected invalid layer color");
            return Err(MarkupError::InvalidStyleValue {
                layer_id: layer_id.to_string(),
                reason: format!("'{color}' is not a #RRGGBB color"),
            });
        }
        let state = self.state_mut(layer_id)?;
        state.color = color.to_string();
        Ok(())
    }

    /// Set a layer's opacity. Values outside `[0, 1]` (or non-finite) are
    /// rejected with the prior value retained.
    pub fn set_opacity(&mut self, layer_id: &str, opacity: f64) -> Result<()> {
        if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
            warn!(layer_id, opacity, "rejected out-of-range layer opacity");
            return Err(MarkupError::InvalidStyleValue {
                layer_id: layer_id.to_string(),
                reason: format!("opacity {opacity} outside [0, 1]"),
            });
        }
        let state = self.state_mut(layer_id)?;
        state.opacity = opacity;
        Ok(())
    }

    /// Replace the selection (single-select). `None` clears it. Selecting
    /// an item in a hidden layer is permitted; selection and visibility
    /// are orthogonal.
    pub fn select(&mut self, item_id: Option<String>) {
        self.selection = item_id;
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    fn state_mut(&mut self, layer_id: &str) -> Result<&mut LayerStyleState> {
        self.states
            .get_mut(layer_id)
            .ok_or_else(|| MarkupError::UnknownLayer(layer_id.to_string()))
    }
}

/// Strict `#RRGGBB` validation.
pub fn is_valid_hex_color(color: &str) -> bool {
    let Some(hex) = color.strip_prefix('#') else {
        return false;
    };
    hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit())
}
