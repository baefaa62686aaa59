//! Sidebar aggregate listing and its own open/closed flag.
//!
//! The open/closed flag is pure UI state: it is consumed only by the
//! sidebar's own visibility and has no effect on layer state or overlay
//! rendering. Closing the sidebar never hides the overlay.

use serde::Serialize;

use crate::document::MarkupDocument;
use crate::state::{LayerStateStore, LayerStyleState};

/// One row of the sidebar's layer listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerListing {
    pub layer_id: String,
    pub name: String,
    pub item_count: usize,
    pub state: LayerStyleState,
}

/// Drives layer-state mutations from user input and exposes the aggregate
/// layer listing. Holds only the sidebar's own visibility flag.
#[derive(Debug, Clone)]
pub struct SidebarController {
    open: bool,
}

impl Default for SidebarController {
    fn default() -> Self {
        Self { open: true }
    }
}

impl SidebarController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate listing in document layer order.
    pub fn list_layers(
        &self,
        document: &MarkupDocument,
        states: &LayerStateStore,
    ) -> Vec<LayerListing> {
        document
            .layers
            .iter()
            .filter_map(|layer| {
                states.state(&layer.id).map(|state| LayerListing {
                    layer_id: layer.id.clone(),
                    name: layer.name.clone(),
                    item_count: layer.items.len(),
                    state: state.clone(),
                })
            })
            .collect()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle_open(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ItemKind, Layer, MarkupItem};
    use crate::geometry::Point;

    fn doc() -> MarkupDocument {
        MarkupDocument {
            layers: vec![Layer {
                id: "measurements".to_string(),
                name: "Measurements".to_string(),
                items: vec![MarkupItem {
                    id: "m0".to_string(),
                    page_number: 1,
                    kind: ItemKind::PointMeasurement,
                    geometry: vec![Point::origin()],
                    label: None,
                }],
                default_color: "#1E88E5".to_string(),
            }],
        }
    }

    #[test]
    fn test_listing_reflects_current_state() {
        let document = doc();
        let mut states = LayerStateStore::for_document(&document);
        let sidebar = SidebarController::new();

        let listing = sidebar.list_layers(&document, &states);
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].layer_id, "measurements");
        assert_eq!(listing[0].item_count, 1);
        assert!(listing[0].state.visible);

        states.set_visible("measurements", false).unwrap();
        let listing = sidebar.list_layers(&document, &states);
        assert!(!listing[0].state.visible);
    }

    #[test]
    fn test_toggle_is_independent_of_layer_state() {
        let document = doc();
        let states = LayerStateStore::for_document(&document);
        let mut sidebar = SidebarController::new();

        assert!(sidebar.is_open());
        assert!(!sidebar.toggle_open());
        assert!(!sidebar.is_open());

        // Layer state is untouched by the sidebar's own flag.
        assert!(states.state("measurements").unwrap().visible);

        assert!(sidebar.toggle_open());
    }
}
