//! Model catalog HTTP handlers.
//!
//! Endpoints:
//! - GET /api/v1/models - List the supported models

use std::time::Instant;

use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use threadbot_core::catalog::{ModelCatalog, ModelEntry};

use crate::http::response::ApiResponse;

/// One catalog entry as exposed over the API.
#[derive(Debug, Serialize)]
pub struct ModelView {
    /// Full model identifier, e.g. `@cf/meta/llama-2-7b-chat-fp16`.
    pub id: String,
    pub name: &'static str,
    pub description: &'static str,
}

impl From<&ModelEntry> for ModelView {
    fn from(entry: &ModelEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            name: entry.name,
            description: entry.description,
        }
    }
}

/// GET /api/v1/models - List the supported models in menu order.
pub async fn list_models() -> Json<ApiResponse<Vec<ModelView>>> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let models: Vec<ModelView> = ModelCatalog::all().iter().map(ModelView::from).collect();

    let elapsed = start.elapsed().as_millis() as u64;
    Json(ApiResponse::success(models, request_id, elapsed))
}
