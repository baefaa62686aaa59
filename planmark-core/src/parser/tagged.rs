//! Decoder for the tag-structured (XML) markup format.
//!
//! Container shape:
//!
//! ```xml
//! <markup page-height="792" origin="bottom-left">
//!   <layer name="Measurements" color="#1E88E5">
//!     <item kind="linear-measurement" page="1" label="2.50 m">
//!       <point x="120.0" y="318.5"/>
//!       <point x="412.3" y="318.5"/>
//!     </item>
//!   </layer>
//! </markup>
//! ```
//!
//! This format inherits the bottom-left/Y-up convention of page-description
//! formats, so geometry is flipped to the internal top-left/Y-down
//! convention here, using the container's `page-height`. A container may
//! opt out with `origin="top-left"`. The flip happens once, in this
//! decoder; nothing downstream knows the source convention existed.

use super::{RawItem, RawLayer};
use crate::error::{MarkupError, Result};
use crate::geometry::Point;

pub(crate) fn decode(raw: &[u8]) -> Result<Vec<RawLayer>> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| MarkupError::MalformedContainer(format!("invalid UTF-8: {e}")))?;
    let xml = roxmltree::Document::parse(text)
        .map_err(|e| MarkupError::MalformedContainer(format!("not well-formed XML: {e}")))?;

    let root = xml.root_element();
    if !root.has_tag_name("markup") {
        return Err(MarkupError::MalformedContainer(format!(
            "expected <markup> root element, found <{}>",
            root.tag_name().name()
        )));
    }

    let flip_height = flip_height(&root)?;

    let mut layers = Vec::new();
    for layer_node in root.children().filter(|n| n.has_tag_name("layer")) {
        let name = layer_node.attribute("name").unwrap_or_default().to_string();
        let mut items = Vec::new();
        for item_node in layer_node.children().filter(|n| n.has_tag_name("item")) {
            items.push(decode_item(&item_node, flip_height));
        }
        layers.push(RawLayer {
            id: layer_node.attribute("id").map(str::to_string),
            name,
            color: layer_node.attribute("color").map(str::to_string),
            items,
        });
    }
    Ok(layers)
}

/// Page height to flip against, or `None` when the container is already
/// top-left/Y-down.
fn flip_height(root: &roxmltree::Node<'_, '_>) -> Result<Option<f64>> {
    match root.attribute("origin").unwrap_or("bottom-left") {
        "top-left" => Ok(None),
        "bottom-left" => {
            let raw = root.attribute("page-height").ok_or_else(|| {
                MarkupError::MalformedContainer(
                    "bottom-left markup container requires a page-height attribute".to_string(),
                )
            })?;
            let height: f64 = raw.parse().map_err(|_| {
                MarkupError::MalformedContainer(format!("invalid page-height '{raw}'"))
            })?;
            if !height.is_finite() || height <= 0.0 {
                return Err(MarkupError::MalformedContainer(format!(
                    "page-height must be positive, got {height}"
                )));
            }
            Ok(Some(height))
        }
        other => Err(MarkupError::MalformedContainer(format!(
            "unknown origin '{other}' (expected bottom-left or top-left)"
        ))),
    }
}

fn decode_item(node: &roxmltree::Node<'_, '_>, flip_height: Option<f64>) -> RawItem {
    let kind = match node.attribute("kind") {
        Some(kind) => kind.to_string(),
        None => return RawItem::Malformed("item is missing a kind attribute".to_string()),
    };
    let page_number = match node.attribute("page").map(str::parse::<u32>) {
        Some(Ok(page)) if page >= 1 => page,
        Some(_) => return RawItem::Malformed("item page attribute is not a 1-based page number".to_string()),
        None => return RawItem::Malformed("item is missing a page attribute".to_string()),
    };

    let points = node
        .children()
        .filter(|n| n.has_tag_name("point"))
        .map(|p| {
            // Unparseable coordinates become NaN so the shared validation
            // pass drops the item with a non-finite-coordinate warning.
            let x = p
                .attribute("x")
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(f64::NAN);
            let y = p
                .attribute("y")
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(f64::NAN);
            match flip_height {
                Some(h) => Point::new(x, h - y),
                None => Point::new(x, y),
            }
        })
        .collect();

    RawItem::Decoded {
        id: node.attribute("id").map(str::to_string),
        kind,
        page_number,
        points,
        label: node.attribute("label").map(str::to_string),
    }
}
