use crate::domain::model::{header_cells, OutputRow};
use crate::domain::ports::SheetWriter;
use crate::utils::error::Result;

/// Clears the values in `range`, leaving formatting untouched.
pub async fn clear(writer: &dyn SheetWriter, sheet_id: &str, range: &str) -> Result<()> {
    tracing::info!("- Clearing range: {}", range);
    writer.clear(sheet_id, range).await
}

pub async fn write_header(writer: &dyn SheetWriter, sheet_id: &str, range: &str) -> Result<()> {
    tracing::info!("- Adding headers to the sheet.");
    writer.append(sheet_id, range, vec![header_cells()]).await
}

/// Appends the data rows after whatever is already in the range. An empty
/// row set issues no request.
pub async fn write_rows(
    writer: &dyn SheetWriter,
    rows: &[OutputRow],
    sheet_id: &str,
    range: &str,
) -> Result<()> {
    if rows.is_empty() {
        tracing::info!("- No conversion rows to write.");
        return Ok(());
    }

    tracing::info!("- Writing {} rows to Google Sheet.", rows.len());
    let values = rows.iter().map(OutputRow::to_cells).collect();
    writer.append(sheet_id, range, values).await
}
