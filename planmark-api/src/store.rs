//! In-process workset storage.
//!
//! Worksets are named element-selection sets scoped to a model. Insertion
//! order is preserved per model, and updates are partial merges: omitted
//! fields retain their prior value. The store is the seam where a
//! relational backend would plug in; handlers only see this interface.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use planmark::document::AREA_FILL_OPACITY;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Default highlight color for worksets created without one.
pub const DEFAULT_WORKSET_COLOR: &str = "#1E88E5";

/// The element identifiers a workset selects, carrying both the numeric
/// per-file ids and the globally unique ids of the source model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementIdSet {
    #[serde(default)]
    pub express_ids: Vec<u64>,
    #[serde(default)]
    pub global_ids: Vec<String>,
}

/// A persisted workset. Ids and timestamps are server-assigned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workset {
    pub id: String,
    pub model_id: String,
    pub name: String,
    pub color: String,
    pub opacity: f64,
    pub element_ids: ElementIdSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted on create.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkset {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub opacity: Option<f64>,
    #[serde(default)]
    pub element_ids: Option<ElementIdSet>,
}

/// Fields accepted on update; every field optional (partial merge).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorksetPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub opacity: Option<f64>,
    #[serde(default)]
    pub element_ids: Option<ElementIdSet>,
}

/// Thread-safe per-model workset collections.
#[derive(Debug, Default)]
pub struct WorksetStore {
    models: RwLock<HashMap<String, Vec<Workset>>>,
}

impl WorksetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All worksets of a model in insertion order. An unknown model is an
    /// empty list, not an error.
    pub fn list(&self, model_id: &str) -> Vec<Workset> {
        self.read_models().get(model_id).cloned().unwrap_or_default()
    }

    pub fn create(&self, model_id: &str, new: NewWorkset) -> Workset {
        let now = Utc::now();
        let workset = Workset {
            id: Uuid::new_v4().to_string(),
            model_id: model_id.to_string(),
            name: new.name,
            color: new.color.unwrap_or_else(|| DEFAULT_WORKSET_COLOR.to_string()),
            opacity: new.opacity.unwrap_or(AREA_FILL_OPACITY),
            element_ids: new.element_ids.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        debug!(model_id, workset_id = %workset.id, "created workset");
        self.write_models()
            .entry(model_id.to_string())
            .or_default()
            .push(workset.clone());
        workset
    }

    /// Partial-merge update. Returns the merged workset, or `None` when
    /// the id does not exist under the model.
    pub fn update(&self, model_id: &str, workset_id: &str, patch: WorksetPatch) -> Option<Workset> {
        let mut models = self.write_models();
        let workset = models
            .get_mut(model_id)?
            .iter_mut()
            .find(|w| w.id == workset_id)?;

        if let Some(name) = patch.name {
            workset.name = name;
        }
        if let Some(color) = patch.color {
            workset.color = color;
        }
        if let Some(opacity) = patch.opacity {
            workset.opacity = opacity;
        }
        if let Some(element_ids) = patch.element_ids {
            workset.element_ids = element_ids;
        }
        workset.updated_at = Utc::now();
        debug!(model_id, workset_id, "updated workset");
        Some(workset.clone())
    }

    /// Delete by id. Returns false when the id does not exist, so the
    /// handler can answer 404 rather than pretending success.
    pub fn delete(&self, model_id: &str, workset_id: &str) -> bool {
        let mut models = self.write_models();
        match models.get_mut(model_id) {
            Some(worksets) => {
                let before = worksets.len();
                worksets.retain(|w| w.id != workset_id);
                let deleted = worksets.len() != before;
                if deleted {
                    debug!(model_id, workset_id, "deleted workset");
                }
                deleted
            }
            None => false,
        }
    }

    // A poisoned lock only means some caller panicked mid-operation; each
    // critical section leaves the maps structurally valid, so the guard is
    // recovered instead of propagating the poison.
    fn read_models(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<Workset>>> {
        self.models.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_models(&self) -> RwLockWriteGuard<'_, HashMap<String, Vec<Workset>>> {
        self.models.write().unwrap_or_else(|e| e.into_inner())
    }
}
