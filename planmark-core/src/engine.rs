//! The host-facing engine: one loaded document, its session state, and the
//! overlay derivation, behind a single synchronous surface.

use tracing::{debug, info};

use crate::document::MarkupDocument;
use crate::error::{ItemWarning, Result};
use crate::geometry::Viewport;
use crate::parser::{parse, FormatHint};
use crate::render::{render_page, DrawableShape};
use crate::sidebar::{LayerListing, SidebarController};
use crate::state::LayerStateStore;

/// Token identifying one requested load. Monotonically increasing; a
/// completed load whose token is no longer current is stale and is
/// discarded without touching the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadToken(u64);

/// Outcome of applying a load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The document was installed; per-item warnings are attached.
    Loaded { warnings: Vec<ItemWarning> },
    /// A newer load was requested before this one completed; the result
    /// was discarded. Not an error and never user-visible.
    Superseded,
}

/// The markup overlay engine.
///
/// Owns the immutable parsed document and the mutable per-session state,
/// and exposes the surface consumed by the host view and sidebar:
/// loading, layer listing, style/selection mutation, and per-page overlay
/// derivation. Everything is synchronous; hosts with asynchronous byte
/// decoding use the [`begin_load`](Self::begin_load) /
/// [`apply_load`](Self::apply_load) pair so that the last requested load
/// always wins, regardless of completion order.
#[derive(Debug, Default)]
pub struct MarkupOverlayEngine {
    document: Option<MarkupDocument>,
    warnings: Vec<ItemWarning>,
    states: LayerStateStore,
    sidebar: SidebarController,
    load_counter: u64,
}

impl MarkupOverlayEngine {
    pub fn new() -> Self {
        Self {
            document: None,
            warnings: Vec::new(),
            states: LayerStateStore::default(),
            sidebar: SidebarController::new(),
            load_counter: 0,
        }
    }

    /// Register a load request and obtain its token. Any token handed out
    /// earlier becomes stale immediately.
    pub fn begin_load(&mut self) -> LoadToken {
        self.load_counter += 1;
        LoadToken(self.load_counter)
    }

    /// Complete a load started with [`begin_load`](Self::begin_load).
    ///
    /// A stale token yields [`LoadOutcome::Superseded`] and leaves the
    /// engine untouched. A parse failure also leaves the prior document
    /// and state unchanged, so a bad upload cannot blank out a working
    /// overlay. On success the document is replaced wholesale, the layer
    /// state store is rebuilt, and the selection is cleared.
    pub fn apply_load(
        &mut self,
        token: LoadToken,
        raw: &[u8],
        hint: Option<FormatHint>,
    ) -> Result<LoadOutcome> {
        if token.0 != self.load_counter {
            debug!(
                token = token.0,
                current = self.load_counter,
                "discarding superseded markup load"
            );
            return Ok(LoadOutcome::Superseded);
        }

        let output = parse(raw, hint)?;
        self.states = LayerStateStore::for_document(&output.document);
        info!(
            layers = output.document.layers.len(),
            items = output.document.item_count(),
            warnings = output.warnings.len(),
            "markup document installed"
        );
        self.document = Some(output.document);
        self.warnings = output.warnings.clone();
        Ok(LoadOutcome::Loaded {
            warnings: output.warnings,
        })
    }

    /// Convenience for hosts that decode synchronously.
    pub fn load_markup(&mut self, raw: &[u8], hint: Option<FormatHint>) -> Result<LoadOutcome> {
        let token = self.begin_load();
        self.apply_load(token, raw, hint)
    }

    pub fn document(&self) -> Option<&MarkupDocument> {
        self.document.as_ref()
    }

    /// Warnings recorded by the most recent successful load.
    pub fn warnings(&self) -> &[ItemWarning] {
        &self.warnings
    }

    /// Aggregate layer listing for the sidebar; empty before a load.
    pub fn layers(&self) -> Vec<LayerListing> {
        match &self.document {
            Some(document) => self.sidebar.list_layers(document, &self.states),
            None => Vec::new(),
        }
    }

    pub fn set_layer_visible(&mut self, layer_id: &str, visible: bool) -> Result<()> {
        self.states.set_visible(layer_id, visible)
    }

    pub fn set_layer_color(&mut self, layer_id: &str, color: &str) -> Result<()> {
        self.states.set_color(layer_id, color)
    }

    pub fn set_layer_opacity(&mut self, layer_id: &str, opacity: f64) -> Result<()> {
        self.states.set_opacity(layer_id, opacity)
    }

    /// Replace the single-item selection; `None` clears it. Selection is
    /// orthogonal to layer visibility and survives visibility toggles.
    pub fn select_item(&mut self, item_id: Option<&str>) {
        self.states.select(item_id.map(str::to_string));
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.states.selection()
    }

    /// Derive the overlay for one page at the given viewport. Re-run on
    /// every zoom, scroll, or state change; empty before a load.
    pub fn overlay_for_page(&self, page_number: u32, viewport: &Viewport) -> Vec<DrawableShape> {
        match &self.document {
            Some(document) => render_page(document, page_number, viewport, &self.states),
            None => Vec::new(),
        }
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar.is_open()
    }

    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar.toggle_open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MarkupError;

    const STRUCTURED: &[u8] = br#"{
        "layers": [
            {"name": "Measurements", "items": [
                {"kind": "linear-measurement", "page": 1,
                 "points": [[0, 0], [10, 0]], "label": "10"}
            ]}
        ]
    }"#;

    const STRUCTURED_B: &[u8] = br#"{
        "layers": [
            {"name": "Areas", "items": [
                {"kind": "area-polygon", "page": 1,
                 "points": [[0, 0], [10, 0], [10, 10]]}
            ]}
        ]
    }"#;

    fn viewport() -> Viewport {
        Viewport::new(1.0, 100.0, 100.0, 100.0, 100.0).unwrap()
    }

    #[test]
    fn test_load_and_render() {
        let mut engine = MarkupOverlayEngine::new();
        assert!(engine.overlay_for_page(1, &viewport()).is_empty());

        let outcome = engine.load_markup(STRUCTURED, None).unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded { warnings: vec![] });

        let shapes = engine.overlay_for_page(1, &viewport());
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].item_id, "measurements-item-0");
    }

    #[test]
    fn test_failed_load_retains_prior_document() {
        let mut engine = MarkupOverlayEngine::new();
        engine.load_markup(STRUCTURED, None).unwrap();
        engine.select_item(Some("measurements-item-0"));

        let err = engine.load_markup(b"{broken", None).unwrap_err();
        assert!(matches!(err, MarkupError::MalformedContainer(_)));

        // Prior document, state, and selection untouched.
        assert_eq!(engine.document().unwrap().layers[0].id, "measurements");
        assert_eq!(engine.selected_item(), Some("measurements-item-0"));
        assert_eq!(engine.overlay_for_page(1, &viewport()).len(), 1);
    }

    #[test]
    fn test_reload_rebuilds_state_and_clears_selection() {
        let mut engine = MarkupOverlayEngine::new();
        engine.load_markup(STRUCTURED, None).unwrap();
        engine.set_layer_visible("measurements", false).unwrap();
        engine.select_item(Some("measurements-item-0"));

        engine.load_markup(STRUCTURED_B, None).unwrap();
        assert!(engine.selected_item().is_none());
        let layers = engine.layers();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].layer_id, "areas");
        assert!(layers[0].state.visible);
    }

    #[test]
    fn test_stale_load_is_discarded() {
        let mut engine = MarkupOverlayEngine::new();

        // Two loads are requested; the first completes after the second.
        let token_a = engine.begin_load();
        let token_b = engine.begin_load();

        let outcome_b = engine.apply_load(token_b, STRUCTURED_B, None).unwrap();
        assert!(matches!(outcome_b, LoadOutcome::Loaded { .. }));

        let outcome_a = engine.apply_load(token_a, STRUCTURED, None).unwrap();
        assert_eq!(outcome_a, LoadOutcome::Superseded);

        // The engine reflects the second request, never the first.
        assert_eq!(engine.document().unwrap().layers[0].id, "areas");
    }

    #[test]
    fn test_stale_load_discarded_even_when_current_failed() {
        let mut engine = MarkupOverlayEngine::new();
        engine.load_markup(STRUCTURED, None).unwrap();

        let token_a = engine.begin_load();
        let token_b = engine.begin_load();

        // The newest request fails to parse; the prior document stays.
        assert!(engine.apply_load(token_b, b"garbage", None).is_err());
        // The older in-flight result must still not sneak in.
        assert_eq!(
            engine.apply_load(token_a, STRUCTURED_B, None).unwrap(),
            LoadOutcome::Superseded
        );
        assert_eq!(engine.document().unwrap().layers[0].id, "measurements");
    }

    #[test]
    fn test_sidebar_toggle_does_not_affect_overlay() {
        let mut engine = MarkupOverlayEngine::new();
        engine.load_markup(STRUCTURED, None).unwrap();

        assert!(engine.sidebar_open());
        engine.toggle_sidebar();
        assert!(!engine.sidebar_open());
        // Overlay untouched by the sidebar flag.
        assert_eq!(engine.overlay_for_page(1, &viewport()).len(), 1);
    }

    #[test]
    fn test_style_mutations_flow_through() {
        let mut engine = MarkupOverlayEngine::new();
        engine.load_markup(STRUCTURED, None).unwrap();

        engine.set_layer_color("measurements", "#123ABC").unwrap();
        engine.set_layer_opacity("measurements", 0.5).unwrap();
        assert!(engine.set_layer_opacity("measurements", 2.0).is_err());

        let shapes = engine.overlay_for_page(1, &viewport());
        assert_eq!(shapes[0].color, "#123ABC");
        assert_eq!(shapes[0].opacity, 0.5);
    }
}
