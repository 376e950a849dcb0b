use crate::adapters::{api_url, ApiFailure};
use crate::domain::model::ResultSet;
use crate::domain::ports::{QueryEngine, TokenProvider};
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_BIGQUERY_ENDPOINT: &str = "https://bigquery.googleapis.com/bigquery/v2";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    query: &'a str,
    use_legacy_sql: bool,
    timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TableSchema {
    #[serde(default)]
    fields: Vec<TableFieldSchema>,
}

#[derive(Debug, Deserialize)]
struct TableFieldSchema {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TableRow {
    #[serde(default)]
    f: Vec<TableCell>,
}

#[derive(Debug, Deserialize)]
struct TableCell {
    #[serde(default)]
    v: serde_json::Value,
}

/// Shared shape of `jobs.query` and `jobs.getQueryResults` responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    job_reference: Option<JobReference>,
    #[serde(default)]
    job_complete: bool,
    schema: Option<TableSchema>,
    #[serde(default)]
    rows: Vec<TableRow>,
    page_token: Option<String>,
}

impl QueryResponse {
    fn take_rows(&mut self) -> Vec<Vec<serde_json::Value>> {
        std::mem::take(&mut self.rows)
            .into_iter()
            .map(|row| row.f.into_iter().map(|cell| cell.v).collect())
            .collect()
    }
}

/// BigQuery REST v2 client.
pub struct BigQueryClient {
    client: Client,
    endpoint: String,
    tokens: Arc<dyn TokenProvider>,
    timeout_ms: u64,
}

impl BigQueryClient {
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
        timeout_ms: u64,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            tokens,
            timeout_ms,
        }
    }

    async fn start_query(&self, project_id: &str, sql: &str) -> Result<QueryResponse> {
        let url = api_url(&self.endpoint, &["projects", project_id, "queries"])?;
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&QueryRequest {
                query: sql,
                use_legacy_sql: false,
                timeout_ms: self.timeout_ms,
            })
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Long-polls job completion when `page_token` is `None`, otherwise fetches that page.
    async fn get_results(
        &self,
        project_id: &str,
        job: &JobReference,
        page_token: Option<&str>,
    ) -> Result<QueryResponse> {
        let mut url = api_url(&self.endpoint, &["projects", project_id, "queries", job.job_id.as_str()])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("timeoutMs", &self.timeout_ms.to_string());
            if let Some(location) = &job.location {
                query.append_pair("location", location);
            }
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }
        let token = self.tokens.access_token().await?;

        let response = self.client.get(url).bearer_auth(token).send().await?;
        Self::decode(response).await
    }

    async fn decode(response: Response) -> Result<QueryResponse> {
        if !response.status().is_success() {
            let failure = ApiFailure::from_response(response).await;
            return Err(ImportError::QueryExecution {
                message: failure.to_string(),
            });
        }
        Ok(response.json().await?)
    }
}

fn job_of(response: &QueryResponse) -> Result<JobReference> {
    response
        .job_reference
        .clone()
        .ok_or_else(|| ImportError::QueryExecution {
            message: "query response carries no job reference".to_string(),
        })
}

#[async_trait]
impl QueryEngine for BigQueryClient {
    async fn run_query(&self, project_id: &str, sql: &str) -> Result<ResultSet> {
        let mut response = self.start_query(project_id, sql).await?;

        while !response.job_complete {
            let job = job_of(&response)?;
            tracing::debug!("Query job {} still running, waiting for completion", job.job_id);
            response = self.get_results(project_id, &job, None).await?;
            if response.job_reference.is_none() {
                response.job_reference = Some(job);
            }
        }

        let columns: Vec<String> = response
            .schema
            .as_ref()
            .map(|schema| schema.fields.iter().map(|f| f.name.clone()).collect())
            .unwrap_or_default();
        let mut rows = response.take_rows();

        // 依 pageToken 取得其餘分頁
        let mut page_token = response.page_token.take();
        while let Some(token) = page_token {
            let job = job_of(&response)?;
            tracing::debug!("Fetching result page {} of job {}", token, job.job_id);
            let mut page = self.get_results(project_id, &job, Some(&token)).await?;
            rows.extend(page.take_rows());
            page_token = page.page_token.take();
        }

        Ok(ResultSet { columns, rows })
    }
}
