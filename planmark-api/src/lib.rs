//! REST API for persisting named element-selection worksets per model.
//!
//! Worksets pair a display name with highlight styling (color, opacity)
//! and the set of element ids they select. The HTTP surface is a small
//! CRUD resource under `/api/models/{model_id}/worksets`; updates are
//! partial merges and deletes answer 404 for unknown ids.

mod api;
pub mod store;

pub use api::{app, app_with_store, AppError, ErrorResponse};
pub use store::{ElementIdSet, NewWorkset, Workset, WorksetPatch, WorksetStore};
