//! # planmark
//!
//! A markup overlay engine: parse externally authored annotation documents
//! (measurements, areas, free shapes) and render them as coordinate-accurate,
//! independently stylable, selectable vector overlays on top of a paginated
//! base document.
//!
//! ## Features
//!
//! - **Two interchangeable input formats**: a tag-structured (XML) container
//!   and a structured-text (JSON) container, normalized into one internal
//!   model — downstream code never sees the source format
//! - **Coordinate normalization**: Y-up page-description geometry is flipped
//!   to the internal top-left/Y-down convention at parse time
//! - **Per-layer style state**: visibility, color, and opacity, validated on
//!   mutation and kept separate from the immutable parsed document
//! - **Single-item selection** orthogonal to layer visibility
//! - **Deterministic per-page overlays**: stable paint order at any zoom
//! - **Last-request-wins loading**: a superseded load can never overwrite a
//!   newer one
//!
//! ## Quick Start
//!
//! ```rust
//! use planmark::{MarkupOverlayEngine, Viewport};
//!
//! # fn main() -> planmark::Result<()> {
//! let raw = br#"{
//!     "layers": [
//!         {"name": "Measurements", "items": [
//!             {"kind": "linear-measurement", "page": 1,
//!              "points": [[100.0, 200.0], [400.0, 200.0]], "label": "3.00 m"}
//!         ]}
//!     ]
//! }"#;
//!
//! let mut engine = MarkupOverlayEngine::new();
//! engine.load_markup(raw, None)?;
//!
//! // The base document renderer supplies the per-page viewport.
//! let viewport = Viewport::new(2.0, 612.0, 792.0, 1224.0, 1584.0)?;
//! let shapes = engine.overlay_for_page(1, &viewport);
//! assert_eq!(shapes.len(), 1);
//! assert_eq!(shapes[0].points[0].x, 200.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`parser`] - format detection and the two decoders
//! - [`document`] - the immutable parsed model
//! - [`geometry`] - viewport and native-to-screen projection
//! - [`state`] - mutable layer style and selection state
//! - [`render`] - per-page overlay derivation
//! - [`sidebar`] - aggregate layer listing and sidebar UI flag
//! - [`engine`] - the host-facing surface tying it all together

pub mod document;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod parser;
pub mod render;
pub mod sidebar;
pub mod state;

pub use document::{ItemKind, Layer, MarkupDocument, MarkupItem};
pub use engine::{LoadOutcome, LoadToken, MarkupOverlayEngine};
pub use error::{ItemWarning, MarkupError, Result, WarningReason};
pub use geometry::{Point, Viewport};
pub use parser::{parse, FormatHint, MarkupFormat, ParseOutput};
pub use render::{render_page, DrawableShape};
pub use sidebar::{LayerListing, SidebarController};
pub use state::{is_valid_hex_color, LayerStateStore, LayerStyleState};
