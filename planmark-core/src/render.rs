//! Per-page overlay rendering.
//!
//! Pure derivation: for fixed inputs the output is identical, and its
//! ordering (document layer order, then item order within layer) is the
//! paint order, so visual stacking is reproducible. Nothing here mutates
//! the layer state store or the selection.

use serde::Serialize;

use crate::document::{ItemKind, MarkupDocument};
use crate::geometry::{project_item, Point, Viewport};
use crate::state::LayerStateStore;

/// One shape of the overlay, ready for the host to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawableShape {
    pub item_id: String,
    pub layer_id: String,
    pub kind: ItemKind,
    /// Screen-space points at the viewport's current zoom.
    pub points: Vec<Point>,
    pub color: String,
    pub opacity: f64,
    pub selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Produce the overlay for one page.
///
/// Iterates layers in document order; hidden layers are omitted entirely,
/// not emitted at zero opacity. Only items anchored to `page_number` are
/// considered; items referencing pages the base document does not have
/// simply never match a requested page.
pub fn render_page(
    document: &MarkupDocument,
    page_number: u32,
    viewport: &Viewport,
    states: &LayerStateStore,
) -> Vec<DrawableShape> {
    let selection = states.selection();
    let mut shapes = Vec::new();

    for layer in &document.layers {
        let Some(state) = states.state(&layer.id) else {
            continue;
        };
        if !state.visible {
            continue;
        }
        for item in layer.items.iter().filter(|i| i.page_number == page_number) {
            shapes.push(DrawableShape {
                item_id: item.id.clone(),
                layer_id: layer.id.clone(),
                kind: item.kind,
                points: project_item(item, viewport),
                color: state.color.clone(),
                opacity: state.opacity,
                selected: selection == Some(item.id.as_str()),
                label: item.label.clone(),
            });
        }
    }
    shapes
}
