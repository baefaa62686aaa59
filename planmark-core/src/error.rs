use std::fmt;

use thiserror::Error;

/// Errors produced by the markup overlay engine.
#[derive(Error, Debug)]
pub enum MarkupError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The raw bytes are not a well-formed instance of either supported
    /// markup format. The load fails entirely; any previously loaded
    /// document is retained unchanged.
    #[error("Malformed markup container: {0}")]
    MalformedContainer(String),

    /// Structurally well-formed input in which every item failed per-item
    /// validation. Treated as a load failure, same retention rule as
    /// `MalformedContainer`.
    #[error("Markup document contains no valid items")]
    NoValidItems,

    /// A style mutation with out-of-domain input. The mutation is rejected
    /// and the prior state retained.
    #[error("Invalid style value for layer '{layer_id}': {reason}")]
    InvalidStyleValue { layer_id: String, reason: String },

    /// A style mutation addressed a layer id not present in the loaded
    /// document.
    #[error("Unknown layer: {0}")]
    UnknownLayer(String),

    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),
}

pub type Result<T> = std::result::Result<T, MarkupError>;

/// A non-fatal, per-item condition recorded during parsing.
///
/// The offending item is dropped (or, for an unknown kind, coerced to the
/// generic free-shape kind) and the document load still succeeds. Warnings
/// are collected so hosts can display or log them.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemWarning {
    /// Display name of the layer the item belonged to.
    pub layer: String,
    /// Zero-based ordinal of the item within its layer in the source.
    pub item_index: usize,
    pub reason: WarningReason,
}

/// Why a single markup item was dropped or coerced during parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum WarningReason {
    /// Fewer geometry points than the item kind requires.
    TooFewPoints { kind: &'static str, got: usize, need: usize },
    /// A coordinate failed to parse as a finite number.
    NonFiniteCoordinate,
    /// The source `kind` value is not part of the known vocabulary; the
    /// item was kept as a generic free shape.
    UnknownKind(String),
    /// The item element/object itself could not be decoded (missing page,
    /// non-numeric coordinate pair, wrong shape).
    MalformedItem(String),
}

impl fmt::Display for ItemWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            WarningReason::TooFewPoints { kind, got, need } => write!(
                f,
                "layer '{}', item {}: {} needs at least {} points, got {} (item dropped)",
                self.layer, self.item_index, kind, need, got
            ),
            WarningReason::NonFiniteCoordinate => write!(
                f,
                "layer '{}', item {}: non-finite coordinate (item dropped)",
                self.layer, self.item_index
            ),
            WarningReason::UnknownKind(kind) => write!(
                f,
                "layer '{}', item {}: unknown kind '{}' (kept as free shape)",
                self.layer, self.item_index, kind
            ),
            WarningReason::MalformedItem(detail) => write!(
                f,
                "layer '{}', item {}: {} (item dropped)",
                self.layer, self.item_index, detail
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MarkupError::MalformedContainer("unexpected end of input".to_string());
        assert_eq!(
            err.to_string(),
            "Malformed markup container: unexpected end of input"
        );

        let err = MarkupError::NoValidItems;
        assert_eq!(err.to_string(), "Markup document contains no valid items");

        let err = MarkupError::InvalidStyleValue {
            layer_id: "measurements".to_string(),
            reason: "opacity 1.5 outside [0, 1]".to_string(),
        };
        assert!(err.to_string().contains("measurements"));
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn test_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = MarkupError::from(io);
        match err {
            MarkupError::Io(inner) => assert_eq!(inner.kind(), std::io::ErrorKind::NotFound),
            _ => panic!("expected Io variant"),
        }
    }

    #[test]
    fn test_warning_display() {
        let warning = ItemWarning {
            layer: "Areas".to_string(),
            item_index: 2,
            reason: WarningReason::TooFewPoints {
                kind: "area-polygon",
                got: 2,
                need: 3,
            },
        };
        let text = warning.to_string();
        assert!(text.contains("Areas"));
        assert!(text.contains("at least 3"));
        assert!(text.contains("got 2"));

        let warning = ItemWarning {
            layer: "Misc".to_string(),
            item_index: 0,
            reason: WarningReason::UnknownKind("cloud".to_string()),
        };
        assert!(warning.to_string().contains("free shape"));
    }

    #[test]
    fn test_error_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MarkupError>();
        assert_send_sync::<ItemWarning>();
    }
}
