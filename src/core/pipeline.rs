use crate::core::{destination, source, transform};
use crate::domain::model::{ConversionRows, ImportRequest, OutputRow, TableRef};
use crate::domain::ports::{Pipeline, QueryEngine, SheetWriter};
use crate::utils::error::Result;
use std::sync::Arc;

/// One import invocation: a validated request bound to the shared clients.
pub struct ConversionImportPipeline {
    engine: Arc<dyn QueryEngine>,
    writer: Arc<dyn SheetWriter>,
    request: ImportRequest,
    table: TableRef,
}

impl ConversionImportPipeline {
    pub fn new(
        engine: Arc<dyn QueryEngine>,
        writer: Arc<dyn SheetWriter>,
        request: ImportRequest,
        default_project_id: Option<&str>,
    ) -> Result<Self> {
        let project_id = request.resolve_project_id(default_project_id)?;
        let table = request.table_ref(&project_id)?;

        Ok(Self {
            engine,
            writer,
            request,
            table,
        })
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }
}

#[async_trait::async_trait]
impl Pipeline for ConversionImportPipeline {
    async fn extract(&self) -> Result<ConversionRows> {
        source::fetch_conversions(self.engine.as_ref(), &self.table).await
    }

    async fn prepare(&self) -> Result<()> {
        let sheet_id = &self.request.google_sheet_id;
        let range = &self.request.google_sheet_range;

        destination::clear(self.writer.as_ref(), sheet_id, range).await?;
        destination::write_header(self.writer.as_ref(), sheet_id, range).await
    }

    async fn transform(&self, rows: ConversionRows) -> Result<Vec<OutputRow>> {
        transform::transform_rows(rows, &self.request.conversion_map)
    }

    async fn load(&self, rows: Vec<OutputRow>) -> Result<usize> {
        destination::write_rows(
            self.writer.as_ref(),
            &rows,
            &self.request.google_sheet_id,
            &self.request.google_sheet_range,
        )
        .await?;
        Ok(rows.len())
    }
}
