// Adapters layer: Google REST clients behind the domain ports.

pub mod auth;
pub mod bigquery;
pub mod sheets;

use crate::utils::error::{ImportError, Result};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use url::Url;

/// Appends path segments to an API base URL, percent-encoding each one.
pub(crate) fn api_url(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| ImportError::ConfigError {
            message: format!("API endpoint cannot be a base URL: {}", base),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    status: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}

/// Non-success answer from a Google API, decoded from the standard error envelope.
#[derive(Debug, Clone)]
pub(crate) struct ApiFailure {
    pub status: StatusCode,
    pub message: String,
    pub rpc_status: Option<String>,
    pub reasons: Vec<String>,
}

impl ApiFailure {
    pub async fn from_response(response: Response) -> Self {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => Self {
                status,
                message: envelope.error.message,
                rpc_status: envelope.error.status,
                reasons: envelope
                    .error
                    .errors
                    .into_iter()
                    .filter_map(|detail| detail.reason)
                    .collect(),
            },
            // 非標準錯誤格式，保留原始內容
            Err(_) => Self {
                status,
                message: body,
                rpc_status: None,
                reasons: Vec::new(),
            },
        }
    }

    pub fn is_quota_exceeded(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS
            || self.rpc_status.as_deref() == Some("RESOURCE_EXHAUSTED")
            || self.reasons.iter().any(|reason| {
                matches!(
                    reason.as_str(),
                    "rateLimitExceeded" | "userRateLimitExceeded" | "quotaExceeded"
                )
            })
    }
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.message.is_empty() {
            write!(f, "HTTP {}", self.status)
        } else {
            write!(f, "HTTP {}: {}", self.status, self.message)
        }
    }
}
