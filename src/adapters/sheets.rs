use crate::adapters::{api_url, ApiFailure};
use crate::domain::model::CellValue;
use crate::domain::ports::{SheetWriter, TokenProvider};
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use std::sync::Arc;

pub const DEFAULT_SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    major_dimension: &'static str,
    values: Vec<Vec<CellValue>>,
}

/// Google Sheets REST v4 `spreadsheets.values` client.
pub struct SheetsClient {
    client: Client,
    endpoint: String,
    tokens: Arc<dyn TokenProvider>,
}

impl SheetsClient {
    pub fn new(client: Client, endpoint: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            tokens,
        }
    }

    async fn check(response: Response, range: &str) -> Result<()> {
        if response.status().is_success() {
            return Ok(());
        }

        let failure = ApiFailure::from_response(response).await;
        if failure.is_quota_exceeded() {
            Err(ImportError::QuotaExceeded {
                message: failure.to_string(),
            })
        } else {
            Err(ImportError::RangeAccess {
                range: range.to_string(),
                message: failure.to_string(),
            })
        }
    }
}

#[async_trait]
impl SheetWriter for SheetsClient {
    async fn clear(&self, sheet_id: &str, range: &str) -> Result<()> {
        let action = format!("{}:clear", range);
        let url = api_url(&self.endpoint, &["spreadsheets", sheet_id, "values", action.as_str()])?;
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        Self::check(response, range).await
    }

    async fn append(&self, sheet_id: &str, range: &str, rows: Vec<Vec<CellValue>>) -> Result<()> {
        let action = format!("{}:append", range);
        let mut url = api_url(&self.endpoint, &["spreadsheets", sheet_id, "values", action.as_str()])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&ValueRange {
                major_dimension: "ROWS",
                values: rows,
            })
            .send()
            .await?;

        Self::check(response, range).await
    }
}
