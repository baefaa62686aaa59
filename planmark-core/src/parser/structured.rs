//! Decoder for the structured-text (JSON) markup format.
//!
//! Container shape:
//!
//! ```json
//! {
//!   "layers": [
//!     {
//!       "name": "Measurements",
//!       "color": "#1E88E5",
//!       "items": [
//!         {
//!           "kind": "linear-measurement",
//!           "page": 1,
//!           "points": [[120.0, 473.5], [412.3, 473.5]],
//!           "label": "2.50 m"
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! This format is already top-left/Y-down, so no coordinate flip is
//! applied. Items are decoded individually so one malformed item drops
//! only itself, not the document.

use serde::Deserialize;
use serde_json::Value;

use super::{RawItem, RawLayer};
use crate::error::{MarkupError, Result};
use crate::geometry::Point;

#[derive(Debug, Deserialize)]
struct StructuredDocument {
    layers: Vec<StructuredLayer>,
}

#[derive(Debug, Deserialize)]
struct StructuredLayer {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    color: Option<String>,
    // Items stay as raw values here; each is decoded on its own below so
    // a bad item cannot fail the whole container.
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct StructuredItem {
    #[serde(default)]
    id: Option<String>,
    kind: String,
    page: u32,
    points: Vec<[f64; 2]>,
    #[serde(default)]
    label: Option<String>,
}

pub(crate) fn decode(raw: &[u8]) -> Result<Vec<RawLayer>> {
    let doc: StructuredDocument = serde_json::from_slice(raw)
        .map_err(|e| MarkupError::MalformedContainer(format!("not a structured markup document: {e}")))?;

    Ok(doc
        .layers
        .into_iter()
        .map(|layer| RawLayer {
            id: layer.id,
            name: layer.name,
            color: layer.color,
            items: layer.items.into_iter().map(decode_item).collect(),
        })
        .collect())
}

fn decode_item(value: Value) -> RawItem {
    match serde_json::from_value::<StructuredItem>(value) {
        Ok(item) if item.page >= 1 => RawItem::Decoded {
            id: item.id,
            kind: item.kind,
            page_number: item.page,
            points: item.points.iter().map(|[x, y]| Point::new(*x, *y)).collect(),
            label: item.label,
        },
        Ok(_) => RawItem::Malformed("item page is not a 1-based page number".to_string()),
        Err(e) => RawItem::Malformed(format!("undecodable item: {e}")),
    }
}
