use crate::utils::error::{ImportError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Column titles written once per invocation, ahead of the data rows.
pub const HEADER_ROW: [&str; 4] = [
    "Google Click ID",
    "Conversion Name",
    "Conversion Time",
    "Conversion value",
];

/// Validated import payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub gcp_project_id: Option<String>,
    pub gcp_dataset_id: String,
    pub gcp_table_name: String,
    pub google_sheet_id: String,
    pub google_sheet_range: String,
    pub conversion_map: HashMap<String, String>,
}

impl ImportRequest {
    /// 請求中的 project id 優先，否則使用設定的預設值
    pub fn resolve_project_id(&self, default_project_id: Option<&str>) -> Result<String> {
        let requested = self
            .gcp_project_id
            .as_deref()
            .filter(|id| !id.trim().is_empty());

        requested
            .or(default_project_id.filter(|id| !id.trim().is_empty()))
            .map(str::to_string)
            .ok_or_else(|| ImportError::MissingConfigError {
                field: "gcp.default_project_id".to_string(),
            })
    }

    pub fn table_ref(&self, project_id: &str) -> Result<TableRef> {
        TableRef::new(project_id, &self.gcp_dataset_id, &self.gcp_table_name)
    }
}

/// Fully-qualified `project.dataset.table` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub project_id: String,
    pub dataset_id: String,
    pub table_name: String,
}

impl TableRef {
    pub fn new(project_id: &str, dataset_id: &str, table_name: &str) -> Result<Self> {
        for (part, value) in [
            ("project", project_id),
            ("dataset", dataset_id),
            ("table", table_name),
        ] {
            if value.trim().is_empty() || value.contains('`') {
                return Err(ImportError::QueryExecution {
                    message: format!("Invalid {} identifier in table reference: '{}'", part, value),
                });
            }
        }

        Ok(Self {
            project_id: project_id.to_string(),
            dataset_id: dataset_id.to_string(),
            table_name: table_name.to_string(),
        })
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project_id, self.dataset_id, self.table_name)
    }
}

/// Tabular query output: named columns plus positional cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// Decimal as returned by the query engine. BigQuery encodes numerics as
/// JSON strings, other engines may send plain numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DecimalValue {
    Number(serde_json::Number),
    Text(String),
}

impl DecimalValue {
    pub fn to_f64(&self) -> Result<f64> {
        let parsed = match self {
            DecimalValue::Number(n) => n.as_f64(),
            DecimalValue::Text(s) => s.trim().parse::<f64>().ok(),
        };

        parsed
            .filter(|v| v.is_finite())
            .ok_or_else(|| ImportError::InvalidValue {
                field: "conversionValue".to_string(),
                value: self.to_string(),
                reason: "not a numeric value".to_string(),
            })
    }
}

impl fmt::Display for DecimalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecimalValue::Number(n) => write!(f, "{}", n),
            DecimalValue::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRow {
    pub gcl_id: String,
    pub conversion_date_time: String,
    pub conversion_value: DecimalValue,
    pub conversion_type: String,
}

const GCL_ID: &str = "gclId";
const CONVERSION_DATE_TIME: &str = "conversionDateTime";
const CONVERSION_VALUE: &str = "conversionValue";
const CONVERSION_TYPE: &str = "conversionType";

#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    gcl_id: usize,
    conversion_date_time: usize,
    conversion_value: usize,
    conversion_type: usize,
}

impl ColumnIndex {
    fn from_columns(columns: &[String]) -> Result<Self> {
        let position = |name: &str| {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| ImportError::RowDecode {
                    message: format!("result set has no '{}' column", name),
                })
        };

        Ok(Self {
            gcl_id: position(GCL_ID)?,
            conversion_date_time: position(CONVERSION_DATE_TIME)?,
            conversion_value: position(CONVERSION_VALUE)?,
            conversion_type: position(CONVERSION_TYPE)?,
        })
    }
}

/// Forward-only sequence of decoded rows. Each row is decoded when it is
/// pulled; re-reading requires a fresh query.
#[derive(Debug)]
pub struct ConversionRows {
    columns: Option<ColumnIndex>,
    rows: std::vec::IntoIter<Vec<serde_json::Value>>,
    position: usize,
}

impl ConversionRows {
    pub fn new(result: ResultSet) -> Result<Self> {
        // 沒有資料列時不要求 schema
        let columns = if result.rows.is_empty() {
            None
        } else {
            Some(ColumnIndex::from_columns(&result.columns)?)
        };

        Ok(Self {
            columns,
            rows: result.rows.into_iter(),
            position: 0,
        })
    }

    fn decode(&self, columns: ColumnIndex, row: &[serde_json::Value]) -> Result<ConversionRow> {
        let text = |index: usize, name: &str| -> Result<String> {
            match row.get(index) {
                Some(serde_json::Value::String(s)) => Ok(s.clone()),
                Some(serde_json::Value::Null) | None => Err(self.missing(name)),
                Some(other) => Ok(other.to_string()),
            }
        };

        let conversion_value = match row.get(columns.conversion_value) {
            Some(serde_json::Value::Number(n)) => DecimalValue::Number(n.clone()),
            Some(serde_json::Value::String(s)) => DecimalValue::Text(s.clone()),
            Some(serde_json::Value::Null) | None => return Err(self.missing(CONVERSION_VALUE)),
            Some(other) => DecimalValue::Text(other.to_string()),
        };

        Ok(ConversionRow {
            gcl_id: text(columns.gcl_id, GCL_ID)?,
            conversion_date_time: text(columns.conversion_date_time, CONVERSION_DATE_TIME)?,
            conversion_value,
            conversion_type: text(columns.conversion_type, CONVERSION_TYPE)?,
        })
    }

    fn missing(&self, name: &str) -> ImportError {
        ImportError::RowDecode {
            message: format!("row {} has no value for '{}'", self.position, name),
        }
    }
}

impl Iterator for ConversionRows {
    type Item = Result<ConversionRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        self.position += 1;
        let decoded = match self.columns {
            Some(columns) => self.decode(columns, &row),
            None => Err(self.missing(GCL_ID)),
        };
        Some(decoded)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    pub gcl_id: String,
    pub conversion_label: String,
    pub conversion_date_time: String,
    pub conversion_value: f64,
}

impl OutputRow {
    pub fn to_cells(&self) -> Vec<CellValue> {
        vec![
            self.gcl_id.clone().into(),
            self.conversion_label.clone().into(),
            self.conversion_date_time.clone().into(),
            self.conversion_value.into(),
        ]
    }
}

pub fn header_cells() -> Vec<CellValue> {
    HEADER_ROW.iter().map(|title| CellValue::from(*title)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(project: Option<&str>) -> ImportRequest {
        ImportRequest {
            gcp_project_id: project.map(str::to_string),
            gcp_dataset_id: "coop_analytics".to_string(),
            gcp_table_name: "BrandConversions".to_string(),
            google_sheet_id: "abcdefg123".to_string(),
            google_sheet_range: "Sheet1!A:D".to_string(),
            conversion_map: HashMap::new(),
        }
    }

    #[test]
    fn test_project_fallback_only_when_absent() {
        assert_eq!(
            request(Some("project123"))
                .resolve_project_id(Some("ambient"))
                .unwrap(),
            "project123"
        );
        assert_eq!(request(None).resolve_project_id(Some("ambient")).unwrap(), "ambient");
        assert_eq!(request(Some("")).resolve_project_id(Some("ambient")).unwrap(), "ambient");
        assert!(matches!(
            request(None).resolve_project_id(None),
            Err(ImportError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_table_ref_display_and_rejects_backticks() {
        let table = request(None).table_ref("project123").unwrap();
        assert_eq!(table.to_string(), "project123.coop_analytics.BrandConversions");

        assert!(TableRef::new("p", "d`; DROP", "t").is_err());
        assert!(TableRef::new("p", "", "t").is_err());
    }

    #[test]
    fn test_decimal_value_conversion() {
        let text: DecimalValue = serde_json::from_value(json!("12.5")).unwrap();
        assert_eq!(text.to_f64().unwrap(), 12.5);

        let int: DecimalValue = serde_json::from_value(json!(12)).unwrap();
        assert_eq!(int.to_f64().unwrap(), 12.0);

        let bad = DecimalValue::Text("twelve".to_string());
        assert!(matches!(bad.to_f64(), Err(ImportError::InvalidValue { .. })));
    }

    fn columns() -> Vec<String> {
        ["gclId", "conversionDateTime", "conversionValue", "conversionType"]
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    #[test]
    fn test_conversion_rows_decode_by_column_name() {
        // 欄位順序與查詢不同也應正確解析
        let result = ResultSet {
            columns: vec![
                "conversionType".to_string(),
                "gclId".to_string(),
                "conversionValue".to_string(),
                "conversionDateTime".to_string(),
            ],
            rows: vec![vec![
                json!("PURCHASE"),
                json!("abc123"),
                json!("9.99"),
                json!("2023-01-01T10:00:00+0000"),
            ]],
        };

        let rows: Vec<ConversionRow> = ConversionRows::new(result)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].gcl_id, "abc123");
        assert_eq!(rows[0].conversion_type, "PURCHASE");
        assert_eq!(rows[0].conversion_date_time, "2023-01-01T10:00:00+0000");
        assert_eq!(rows[0].conversion_value, DecimalValue::Text("9.99".to_string()));
    }

    #[test]
    fn test_conversion_rows_missing_column_or_null_cell() {
        let missing_column = ResultSet {
            columns: vec!["gclId".to_string()],
            rows: vec![vec![json!("abc123")]],
        };
        assert!(matches!(
            ConversionRows::new(missing_column),
            Err(ImportError::RowDecode { .. })
        ));

        let null_cell = ResultSet {
            columns: columns(),
            rows: vec![vec![json!(null), json!("2023-01-01T10:00:00+0000"), json!(1), json!("PURCHASE")]],
        };
        let mut rows = ConversionRows::new(null_cell).unwrap();
        assert!(matches!(rows.next(), Some(Err(ImportError::RowDecode { .. }))));
        assert!(rows.next().is_none());
    }

    #[test]
    fn test_empty_result_set_needs_no_schema() {
        let mut rows = ConversionRows::new(ResultSet::default()).unwrap();
        assert!(rows.next().is_none());
    }

    #[test]
    fn test_output_row_cells_serialize_verbatim() {
        let row = OutputRow {
            gcl_id: "abc123".to_string(),
            conversion_label: "Revenue".to_string(),
            conversion_date_time: "2023-01-01T10:00:00+0000".to_string(),
            conversion_value: 9.99,
        };

        assert_eq!(
            serde_json::to_value(row.to_cells()).unwrap(),
            json!(["abc123", "Revenue", "2023-01-01T10:00:00+0000", 9.99])
        );
        assert_eq!(
            serde_json::to_value(header_cells()).unwrap(),
            json!(["Google Click ID", "Conversion Name", "Conversion Time", "Conversion value"])
        );
    }
}
