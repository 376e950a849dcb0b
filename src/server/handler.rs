use crate::core::etl::ImportEngine;
use crate::core::pipeline::ConversionImportPipeline;
use crate::core::request;
use crate::server::AppState;
use crate::utils::error::{ImportError, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResponse {
    pub status: String,
}

impl ImportResponse {
    pub fn completed() -> Self {
        Self {
            status: "COMPLETED".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedResponse {
    pub status: String,
    pub message: String,
    pub payload_keys: Vec<String>,
    pub expected_keys: Vec<String>,
}

/// Validates the body and runs one import against the shared clients.
pub async fn run_import(state: &AppState, body: &[u8]) -> Result<ImportResponse> {
    let request = request::validate_payload(body)?;

    let pipeline = ConversionImportPipeline::new(
        state.engine.clone(),
        state.writer.clone(),
        request,
        state.default_project_id.as_deref(),
    )?;
    tracing::info!("Importing conversions from {}", pipeline.table());

    ImportEngine::new(pipeline).run().await?;
    Ok(ImportResponse::completed())
}

pub async fn import_conversions(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> std::result::Result<Json<ImportResponse>, ImportError> {
    run_import(&state, &body).await.map(Json)
}

pub async fn health() -> &'static str {
    "ok"
}

impl IntoResponse for ImportError {
    fn into_response(self) -> Response {
        match self {
            ImportError::BadRequest {
                message,
                payload_keys,
                expected_keys,
            } => {
                let body = FailedResponse {
                    status: "FAILED".to_string(),
                    message,
                    payload_keys,
                    expected_keys,
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            other => {
                tracing::error!(
                    "❌ Conversion import failed: {} (Category: {:?})",
                    other,
                    other.category()
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
