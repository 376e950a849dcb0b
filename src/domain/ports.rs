use crate::domain::model::{CellValue, ConversionRows, OutputRow, ResultSet};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Read-only SQL execution against a warehouse project.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    async fn run_query(&self, project_id: &str, sql: &str) -> Result<ResultSet>;
}

/// Range-addressed spreadsheet operations.
#[async_trait]
pub trait SheetWriter: Send + Sync {
    async fn clear(&self, sheet_id: &str, range: &str) -> Result<()>;

    /// Inserts `rows` after the existing content of `range`, values taken verbatim.
    async fn append(&self, sheet_id: &str, range: &str, rows: Vec<Vec<CellValue>>) -> Result<()>;
}

#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ConversionRows>;
    async fn prepare(&self) -> Result<()>;
    async fn transform(&self, rows: ConversionRows) -> Result<Vec<OutputRow>>;
    async fn load(&self, rows: Vec<OutputRow>) -> Result<usize>;
}
