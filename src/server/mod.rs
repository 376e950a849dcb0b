//! HTTP endpoint for the conversion import.

pub mod handler;

use crate::adapters::auth::{MetadataTokenProvider, StaticTokenProvider};
use crate::adapters::bigquery::BigQueryClient;
use crate::adapters::sheets::SheetsClient;
use crate::config::AppConfig;
use crate::domain::ports::{QueryEngine, SheetWriter, TokenProvider};
use axum::routing::{any, get};
use axum::Router;
use reqwest::Client;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Process-wide clients, built once and shared by every request.
pub struct AppState {
    pub engine: Arc<dyn QueryEngine>,
    pub writer: Arc<dyn SheetWriter>,
    pub default_project_id: Option<String>,
}

impl AppState {
    pub fn new(
        engine: Arc<dyn QueryEngine>,
        writer: Arc<dyn SheetWriter>,
        default_project_id: Option<String>,
    ) -> Self {
        Self {
            engine,
            writer,
            default_project_id,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let client = Client::new();

        let tokens: Arc<dyn TokenProvider> = match &config.auth.access_token {
            Some(token) => {
                tracing::info!("Using configured access token");
                Arc::new(StaticTokenProvider::new(token.clone()))
            }
            None => {
                tracing::info!("Using metadata server credentials");
                Arc::new(MetadataTokenProvider::new(
                    client.clone(),
                    config.auth.metadata_endpoint.clone(),
                ))
            }
        };

        let engine = BigQueryClient::new(
            client.clone(),
            config.gcp.bigquery_endpoint.clone(),
            tokens.clone(),
            config.gcp.query_timeout_ms,
        );
        let writer = SheetsClient::new(client, config.gcp.sheets_endpoint.clone(), tokens);

        Self::new(
            Arc::new(engine),
            Arc::new(writer),
            config.gcp.default_project_id.clone(),
        )
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", any(handler::import_conversions))
        .route("/healthz", get(handler::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the listen address; `addr` may name a host, which is resolved.
pub async fn bind(addr: &str) -> std::io::Result<TcpListener> {
    TcpListener::bind(addr).await.map_err(|e| {
        std::io::Error::new(e.kind(), format!("Cannot listen on '{}': {}", addr, e))
    })
}

pub async fn serve(state: Arc<AppState>, addr: &str) -> std::io::Result<()> {
    let listener = bind(addr).await?;
    tracing::info!(
        "🚀 Conversion import endpoint listening on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, router(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_resolves_hostnames() {
        let listener = bind("localhost:0").await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[tokio::test]
    async fn test_bind_reports_port_and_rejects_bad_address() {
        let listener = bind("127.0.0.1:0").await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);

        assert!(bind("not a host:port").await.is_err());
    }
}
