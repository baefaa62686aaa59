//! The parsed, format-agnostic markup document model.
//!
//! A `MarkupDocument` is produced once per successful parse and is
//! immutable thereafter; a new upload replaces it wholesale. Mutable
//! per-session style and selection state lives in
//! [`crate::state::LayerStateStore`], never here.

use serde::Serialize;

use crate::geometry::Point;

/// Deterministic fallback palette for layers whose source document carries
/// no color, keyed by layer index.
pub const FALLBACK_PALETTE: [&str; 8] = [
    "#E53935", "#1E88E5", "#43A047", "#FB8C00", "#8E24AA", "#00ACC1", "#F4511E", "#3949AB",
];

/// Default fill opacity applied to area-style layers at load time.
pub const AREA_FILL_OPACITY: f64 = 0.35;

/// The kind of a drawable annotation.
///
/// A closed vocabulary plus the generic `FreeShape` fallback, so a newer
/// markup vocabulary degrades gracefully instead of failing the load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    PointMeasurement,
    LinearMeasurement,
    AreaPolygon,
    FreeShape,
}

impl ItemKind {
    /// Minimum number of geometry points an item of this kind must carry.
    pub fn min_points(&self) -> usize {
        match self {
            ItemKind::PointMeasurement => 1,
            ItemKind::LinearMeasurement => 2,
            ItemKind::AreaPolygon => 3,
            // The permissive fallback: anything with at least one point
            // can be drawn as a free shape.
            ItemKind::FreeShape => 1,
        }
    }

    /// Stable display name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::PointMeasurement => "point-measurement",
            ItemKind::LinearMeasurement => "linear-measurement",
            ItemKind::AreaPolygon => "area-polygon",
            ItemKind::FreeShape => "free-shape",
        }
    }

    /// Whether items of this kind are filled regions rather than strokes.
    pub fn is_fill(&self) -> bool {
        matches!(self, ItemKind::AreaPolygon | ItemKind::FreeShape)
    }
}

/// One drawable annotation, anchored to a single page.
///
/// Geometry is in the markup's native coordinate space, normalized by the
/// parser to a top-left origin with Y increasing downward.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupItem {
    /// Unique within the owning layer.
    pub id: String,
    /// 1-based page of the base document this item is anchored to. Items
    /// referencing a page the base document does not have are retained but
    /// never rendered.
    pub page_number: u32,
    pub kind: ItemKind,
    pub geometry: Vec<Point>,
    /// Optional display text, e.g. a measured value with unit.
    pub label: Option<String>,
}

/// A named, independently stylable group of markup items.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Unique within the document; derived from the source id or name.
    pub id: String,
    pub name: String,
    pub items: Vec<MarkupItem>,
    /// Color from the source document, or a palette fallback by index.
    pub default_color: String,
}

impl Layer {
    /// Look up an item by id.
    pub fn item(&self, item_id: &str) -> Option<&MarkupItem> {
        self.items.iter().find(|i| i.id == item_id)
    }
}

/// The parsed, format-agnostic representation of an annotation file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarkupDocument {
    /// Insertion order is document order; display stacking follows it.
    pub layers: Vec<Layer>,
}

impl MarkupDocument {
    pub fn layer(&self, layer_id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == layer_id)
    }

    /// Total item count across all layers.
    pub fn item_count(&self) -> usize {
        self.layers.iter().map(|l| l.items.len()).sum()
    }

    /// Find an item and its owning layer by item id.
    pub fn find_item(&self, item_id: &str) -> Option<(&Layer, &MarkupItem)> {
        self.layers
            .iter()
            .find_map(|l| l.item(item_id).map(|i| (l, i)))
    }
}

/// Derive a layer id from its source name, falling back to the layer
/// index. Deterministic so the same logical markup in either source format
/// yields the same ids.
pub(crate) fn derive_layer_id(name: &str, index: usize) -> String {
    let slug: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        format!("layer-{index}")
    } else {
        slug
    }
}

/// Derive an item id from its owning layer id and source ordinal.
pub(crate) fn derive_item_id(layer_id: &str, index: usize) -> String {
    format!("{layer_id}-item-{index}")
}

/// Fallback color for the layer at `index`, cycling through the palette.
pub(crate) fn palette_color(index: usize) -> String {
    FALLBACK_PALETTE[index % FALLBACK_PALETTE.len()].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_points_per_kind() {
        assert_eq!(ItemKind::PointMeasurement.min_points(), 1);
        assert_eq!(ItemKind::LinearMeasurement.min_points(), 2);
        assert_eq!(ItemKind::AreaPolygon.min_points(), 3);
        assert_eq!(ItemKind::FreeShape.min_points(), 1);
    }

    #[test]
    fn test_kind_as_str_matches_serde() {
        for kind in [
            ItemKind::PointMeasurement,
            ItemKind::LinearMeasurement,
            ItemKind::AreaPolygon,
            ItemKind::FreeShape,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_derive_layer_id_slugs_name() {
        assert_eq!(derive_layer_id("Measurements", 0), "measurements");
        assert_eq!(derive_layer_id("Net Areas (2nd floor)", 1), "net-areas--2nd-floor");
        assert_eq!(derive_layer_id("   ", 3), "layer-3");
        assert_eq!(derive_layer_id("", 7), "layer-7");
    }

    #[test]
    fn test_derive_item_id() {
        assert_eq!(derive_item_id("measurements", 0), "measurements-item-0");
        assert_eq!(derive_item_id("layer-2", 11), "layer-2-item-11");
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(palette_color(0), FALLBACK_PALETTE[0]);
        assert_eq!(palette_color(8), FALLBACK_PALETTE[0]);
        assert_eq!(palette_color(9), FALLBACK_PALETTE[1]);
    }

    #[test]
    fn test_document_lookups() {
        let doc = MarkupDocument {
            layers: vec![Layer {
                id: "areas".to_string(),
                name: "Areas".to_string(),
                items: vec![MarkupItem {
                    id: "areas-item-0".to_string(),
                    page_number: 1,
                    kind: ItemKind::AreaPolygon,
                    geometry: vec![
                        Point::new(0.0, 0.0),
                        Point::new(10.0, 0.0),
                        Point::new(10.0, 10.0),
                    ],
                    label: Some("100 m2".to_string()),
                }],
                default_color: "#E53935".to_string(),
            }],
        };

        assert_eq!(doc.item_count(), 1);
        assert!(doc.layer("areas").is_some());
        assert!(doc.layer("missing").is_none());

        let (layer, item) = doc.find_item("areas-item-0").unwrap();
        assert_eq!(layer.id, "areas");
        assert_eq!(item.label.as_deref(), Some("100 m2"));
        assert!(doc.find_item("nope").is_none());
    }
}
