//! Markup parsing: two interchangeable source formats, one internal model.
//!
//! The raw bytes are either a tag-structured (XML) document or a
//! structured-text (JSON) document. Format is chosen from an explicit hint
//! or by sniffing the first significant byte, then dispatched to a
//! format-specific decoder. Decoder differences are fully absorbed here:
//! both produce the same intermediate [`RawLayer`] shape, which a shared
//! validation pass turns into the final [`MarkupDocument`]. No downstream
//! component ever branches on source format.
//!
//! Coordinate convention: the internal model is top-left origin, Y-down.
//! The tagged format is bottom-left/Y-up by default and is flipped inside
//! its decoder, so the geometry projector never has to know about source
//! conventions.

mod structured;
mod tagged;

use tracing::{debug, warn};

use crate::document::{
    derive_item_id, derive_layer_id, palette_color, ItemKind, Layer, MarkupDocument, MarkupItem,
};
use crate::error::{ItemWarning, MarkupError, Result, WarningReason};
use crate::geometry::Point;
use crate::state::is_valid_hex_color;

/// The two supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupFormat {
    /// Tag-structured (XML) markup container.
    Tagged,
    /// Structured-text (JSON) markup container.
    Structured,
}

/// Explicit format hint, typically derived from a file extension or MIME
/// type. Sniffing is used when no hint is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    Tagged,
    Structured,
}

impl FormatHint {
    /// Derive a hint from a file extension (without dot, case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xml" | "markup" => Some(FormatHint::Tagged),
            "json" => Some(FormatHint::Structured),
            _ => None,
        }
    }

    /// Derive a hint from a MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/xml" | "text/xml" => Some(FormatHint::Tagged),
            "application/json" => Some(FormatHint::Structured),
            _ => None,
        }
    }
}

/// Result of a successful parse: the document plus any per-item warnings
/// recorded along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    pub document: MarkupDocument,
    pub warnings: Vec<ItemWarning>,
    pub format: MarkupFormat,
}

/// Layer as emitted by a format decoder, before shared validation.
#[derive(Debug, Clone, Default)]
pub(crate) struct RawLayer {
    pub id: Option<String>,
    pub name: String,
    pub color: Option<String>,
    pub items: Vec<RawItem>,
}

/// Item as emitted by a format decoder. Geometry is already normalized to
/// top-left/Y-down; `kind` is the raw source string.
#[derive(Debug, Clone)]
pub(crate) enum RawItem {
    Decoded {
        id: Option<String>,
        kind: String,
        page_number: u32,
        points: Vec<Point>,
        label: Option<String>,
    },
    /// The decoder could not make sense of the item at all; carried
    /// through so the shared pass records a warning at the right ordinal.
    Malformed(String),
}

/// Parse raw markup bytes into the internal document model.
///
/// Pure transform: byte-identical input always yields an identical
/// document. Fails only when the container itself is malformed
/// ([`MarkupError::MalformedContainer`]) or no valid item survives
/// validation ([`MarkupError::NoValidItems`]); individual bad items are
/// dropped with a recorded warning instead.
pub fn parse(raw: &[u8], hint: Option<FormatHint>) -> Result<ParseOutput> {
    let format = detect_format(raw, hint)?;
    debug!(?format, bytes = raw.len(), "decoding markup document");

    let raw_layers = match format {
        MarkupFormat::Tagged => tagged::decode(raw)?,
        MarkupFormat::Structured => structured::decode(raw)?,
    };

    let (document, warnings) = validate_layers(raw_layers)?;
    if !warnings.is_empty() {
        warn!(
            dropped_or_coerced = warnings.len(),
            "markup document loaded with item warnings"
        );
    }
    debug!(
        layers = document.layers.len(),
        items = document.item_count(),
        "markup document parsed"
    );
    Ok(ParseOutput {
        document,
        warnings,
        format,
    })
}

/// Choose the decoder: explicit hint wins, otherwise sniff the first
/// significant byte (`<` for the tagged container, `{` or `[` for the
/// structured one).
fn detect_format(raw: &[u8], hint: Option<FormatHint>) -> Result<MarkupFormat> {
    match hint {
        Some(FormatHint::Tagged) => return Ok(MarkupFormat::Tagged),
        Some(FormatHint::Structured) => return Ok(MarkupFormat::Structured),
        None => {}
    }

    // Skip a UTF-8 BOM and leading whitespace before sniffing.
    let body = raw.strip_prefix(b"\xef\xbb\xbf").unwrap_or(raw);
    match body.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'<') => Ok(MarkupFormat::Tagged),
        Some(b'{') | Some(b'[') => Ok(MarkupFormat::Structured),
        Some(other) => Err(MarkupError::MalformedContainer(format!(
            "unrecognized leading byte 0x{other:02x}; expected a tagged or structured markup container"
        ))),
        None => Err(MarkupError::MalformedContainer("empty input".to_string())),
    }
}

/// Shared validation pass: maps raw kinds to the closed [`ItemKind`]
/// vocabulary, drops items with non-finite coordinates or too few points,
/// derives missing ids deterministically, and enforces id uniqueness.
fn validate_layers(raw_layers: Vec<RawLayer>) -> Result<(MarkupDocument, Vec<ItemWarning>)> {
    let mut warnings = Vec::new();
    let mut layers = Vec::with_capacity(raw_layers.len());
    let mut seen_layer_ids = std::collections::HashSet::new();

    for (layer_index, raw_layer) in raw_layers.into_iter().enumerate() {
        let mut layer_id = raw_layer
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| derive_layer_id(&raw_layer.name, layer_index));
        // Layer ids must be unique within the document.
        while !seen_layer_ids.insert(layer_id.clone()) {
            layer_id.push_str("-dup");
        }

        let default_color = raw_layer
            .color
            .filter(|c| is_valid_hex_color(c))
            .unwrap_or_else(|| palette_color(layer_index));

        let mut items = Vec::with_capacity(raw_layer.items.len());
        let mut seen_item_ids = std::collections::HashSet::new();
        for (item_index, raw_item) in raw_layer.items.into_iter().enumerate() {
            match validate_item(raw_item, &layer_id, item_index, &raw_layer.name, &mut warnings) {
                Some(mut item) => {
                    while !seen_item_ids.insert(item.id.clone()) {
                        item.id.push_str("-dup");
                    }
                    items.push(item);
                }
                None => continue,
            }
        }

        layers.push(Layer {
            id: layer_id,
            name: raw_layer.name,
            items,
            default_color,
        });
    }

    let document = MarkupDocument { layers };
    if document.item_count() == 0 {
        return Err(MarkupError::NoValidItems);
    }
    Ok((document, warnings))
}

fn validate_item(
    raw: RawItem,
    layer_id: &str,
    item_index: usize,
    layer_name: &str,
    warnings: &mut Vec<ItemWarning>,
) -> Option<MarkupItem> {
    let mut push_warning = |reason: WarningReason| {
        warnings.push(ItemWarning {
            layer: layer_name.to_string(),
            item_index,
            reason,
        });
    };

    let (id, kind_str, page_number, points, label) = match raw {
        RawItem::Decoded {
            id,
            kind,
            page_number,
            points,
            label,
        } => (id, kind, page_number, points, label),
        RawItem::Malformed(detail) => {
            push_warning(WarningReason::MalformedItem(detail));
            return None;
        }
    };

    let kind = match map_kind(&kind_str) {
        Some(kind) => kind,
        None => {
            // Unknown vocabulary degrades to the generic free shape rather
            // than rejecting the item.
            push_warning(WarningReason::UnknownKind(kind_str));
            ItemKind::FreeShape
        }
    };

    if points.iter().any(|p| !p.is_finite()) {
        push_warning(WarningReason::NonFiniteCoordinate);
        return None;
    }

    let need = kind.min_points();
    if points.len() < need {
        push_warning(WarningReason::TooFewPoints {
            kind: kind.as_str(),
            got: points.len(),
            need,
        });
        return None;
    }

    Some(MarkupItem {
        id: id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| derive_item_id(layer_id, item_index)),
        page_number,
        kind,
        geometry: points,
        label,
    })
}

/// Map a source kind string onto the closed vocabulary. Both formats share
/// the same aliases so logically equal documents decode identically.
fn map_kind(kind: &str) -> Option<ItemKind> {
    match kind.trim().to_ascii_lowercase().as_str() {
        "point-measurement" | "point" | "measurement" => Some(ItemKind::PointMeasurement),
        "linear-measurement" | "linear" | "distance" | "length" => Some(ItemKind::LinearMeasurement),
        "area-polygon" | "area" | "polygon" => Some(ItemKind::AreaPolygon),
        "free-shape" | "shape" | "freehand" => Some(ItemKind::FreeShape),
        _ => None,
    }
}
