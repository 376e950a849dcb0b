use crate::adapters::{api_url, ApiFailure};
use crate::domain::ports::TokenProvider;
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

pub const DEFAULT_METADATA_ENDPOINT: &str = "http://metadata.google.internal/computeMetadata/v1";

/// Tokens are refreshed this long before the metadata server says they expire.
const MAX_TOKEN_LIFETIME_SECONDS: i64 = 86_400;
const EXPIRY_MARGIN_SECONDS: i64 = 60;

/// A fixed bearer token, e.g. from `gcloud auth print-access-token`.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Service-account token from the GCE / Cloud Functions metadata server.
pub struct MetadataTokenProvider {
    client: Client,
    endpoint: String,
    cached: Mutex<Option<CachedToken>>,
}

impl MetadataTokenProvider {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            cached: Mutex::new(None),
        }
    }

    async fn fetch(&self) -> Result<CachedToken> {
        let url = api_url(
            &self.endpoint,
            &["instance", "service-accounts", "default", "token"],
        )?;
        tracing::debug!("Requesting access token from metadata server: {}", url);

        let response = self
            .client
            .get(url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;

        if !response.status().is_success() {
            let failure = ApiFailure::from_response(response).await;
            return Err(ImportError::AuthError {
                message: format!("metadata server refused token request: {}", failure),
            });
        }

        let token: MetadataToken = response.json().await?;
        Ok(CachedToken {
            token: token.access_token,
            expires_at: Utc::now() + token_lifetime(token.expires_in),
        })
    }
}

/// 扣除安全邊界後的有效期，限制在 0 到一天之間
fn token_lifetime(expires_in: i64) -> Duration {
    Duration::seconds(
        expires_in
            .saturating_sub(EXPIRY_MARGIN_SECONDS)
            .clamp(0, MAX_TOKEN_LIFETIME_SECONDS),
    )
}

#[async_trait]
impl TokenProvider for MetadataTokenProvider {
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at > Utc::now() {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.fetch().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}
