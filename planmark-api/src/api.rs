use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};
use planmark::is_valid_hex_color;
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::store::{NewWorkset, WorksetPatch, WorksetStore};

/// Standard error response structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message describing what went wrong.
    pub error: String,
}

/// Application-specific error types for the API.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The addressed workset (or model) does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The request payload is out of domain (empty name, bad color,
    /// out-of-range opacity).
    #[error("{0}")]
    Validation(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        let error_response = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(error_response)).into_response()
    }
}

/// Build the application router with all routes configured.
pub fn app() -> Router {
    app_with_store(Arc::new(WorksetStore::new()))
}

/// Build the router over an existing store (shared between tests and the
/// binary).
pub fn app_with_store(store: Arc<WorksetStore>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route(
            "/api/models/{model_id}/worksets",
            get(list_worksets).post(create_workset),
        )
        .route(
            "/api/models/{model_id}/worksets/{workset_id}",
            put(update_workset).delete(delete_workset),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(store)
}

/// Health check endpoint for monitoring and load balancing.
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "planmark API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// List all worksets of a model in insertion order.
pub async fn list_worksets(
    State(store): State<Arc<WorksetStore>>,
    Path(model_id): Path<String>,
) -> Response {
    Json(store.list(&model_id)).into_response()
}

/// Create a workset; the server assigns the id and timestamps.
pub async fn create_workset(
    State(store): State<Arc<WorksetStore>>,
    Path(model_id): Path<String>,
    Json(payload): Json<NewWorkset>,
) -> Result<Response, AppError> {
    validate_fields(Some(&payload.name), payload.color.as_deref(), payload.opacity)?;
    let workset = store.create(&model_id, payload);
    Ok((StatusCode::CREATED, Json(workset)).into_response())
}

/// Partial-merge update; omitted fields retain their prior values.
pub async fn update_workset(
    State(store): State<Arc<WorksetStore>>,
    Path((model_id, workset_id)): Path<(String, String)>,
    Json(payload): Json<WorksetPatch>,
) -> Result<Response, AppError> {
    validate_fields(payload.name.as_deref(), payload.color.as_deref(), payload.opacity)?;
    match store.update(&model_id, &workset_id, payload) {
        Some(workset) => Ok(Json(workset).into_response()),
        None => Err(AppError::NotFound(format!(
            "workset '{workset_id}' not found for model '{model_id}'"
        ))),
    }
}

/// Delete a workset. Deleting a nonexistent id answers 404, not success.
pub async fn delete_workset(
    State(store): State<Arc<WorksetStore>>,
    Path((model_id, workset_id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    if store.delete(&model_id, &workset_id) {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(AppError::NotFound(format!(
            "workset '{workset_id}' not found for model '{model_id}'"
        )))
    }
}

/// Shared field validation for create and update payloads.
fn validate_fields(
    name: Option<&str>,
    color: Option<&str>,
    opacity: Option<f64>,
) -> Result<(), AppError> {
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("name must not be empty".to_string()));
        }
    }
    if let Some(color) = color {
        if !is_valid_hex_color(color) {
            return Err(AppError::Validation(format!(
                "'{color}' is not a #RRGGBB color"
            )));
        }
    }
    if let Some(opacity) = opacity {
        if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
            return Err(AppError::Validation(format!(
                "opacity {opacity} outside [0, 1]"
            )));
        }
    }
    Ok(())
}
