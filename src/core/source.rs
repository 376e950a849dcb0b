use crate::domain::model::{ConversionRows, TableRef};
use crate::domain::ports::QueryEngine;
use crate::utils::error::Result;

/// Trailing window of conversion dates to export, inclusive of today.
pub const LOOKBACK_DAYS: u32 = 3;

pub fn build_conversion_query(table: &TableRef) -> String {
    format!(
        r#"
    SELECT
      gclId,
      FORMAT_TIMESTAMP('%Y-%m-%dT%H:%M:%S%z', conversionDateTime) AS conversionDateTime,
      conversionValue,
      conversionType
    FROM
      `{table}`
    WHERE
      DATE(conversionDateTime) >= DATE_SUB(CURRENT_DATE(), INTERVAL {days} DAY)"#,
        table = table,
        days = LOOKBACK_DAYS,
    )
}

pub async fn fetch_conversions(engine: &dyn QueryEngine, table: &TableRef) -> Result<ConversionRows> {
    tracing::info!("- Getting rows from BigQuery.");
    let query = build_conversion_query(table);
    tracing::debug!("Running query: {}", query);

    let result = engine.run_query(&table.project_id, &query).await?;
    tracing::info!("- {} rows retrieved from {}", result.rows.len(), table);

    ConversionRows::new(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ResultSet;
    use crate::utils::error::ImportError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct RecordingEngine {
        result: ResultSet,
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl QueryEngine for RecordingEngine {
        async fn run_query(&self, project_id: &str, sql: &str) -> Result<ResultSet> {
            self.calls
                .lock()
                .unwrap()
                .push((project_id.to_string(), sql.to_string()));
            Ok(self.result.clone())
        }
    }

    struct FailingEngine;

    #[async_trait]
    impl QueryEngine for FailingEngine {
        async fn run_query(&self, _project_id: &str, _sql: &str) -> Result<ResultSet> {
            Err(ImportError::QueryExecution {
                message: "Access Denied".to_string(),
            })
        }
    }

    fn table() -> TableRef {
        TableRef::new("project123", "coop_analytics", "BrandConversions").unwrap()
    }

    #[test]
    fn test_query_selects_columns_and_window() {
        let query = build_conversion_query(&table());

        assert!(query.contains("gclId,"));
        assert!(query.contains(
            "FORMAT_TIMESTAMP('%Y-%m-%dT%H:%M:%S%z', conversionDateTime) AS conversionDateTime"
        ));
        assert!(query.contains("conversionValue,"));
        assert!(query.contains("conversionType"));
        assert!(query.contains("`project123.coop_analytics.BrandConversions`"));
        assert!(query.contains(
            "DATE(conversionDateTime) >= DATE_SUB(CURRENT_DATE(), INTERVAL 3 DAY)"
        ));
    }

    #[tokio::test]
    async fn test_fetch_runs_against_table_project() {
        let engine = RecordingEngine {
            result: ResultSet {
                columns: vec![
                    "gclId".to_string(),
                    "conversionDateTime".to_string(),
                    "conversionValue".to_string(),
                    "conversionType".to_string(),
                ],
                rows: vec![
                    vec![json!("a"), json!("2023-01-01T10:00:00+0000"), json!("1.5"), json!("PURCHASE")],
                    vec![json!("b"), json!("2023-01-02T10:00:00+0000"), json!("2"), json!("ADD_TO_BASKET")],
                ],
            },
            calls: Mutex::new(Vec::new()),
        };

        let rows: Vec<_> = fetch_conversions(&engine, &table())
            .await
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].gcl_id, "a");
        assert_eq!(rows[1].conversion_type, "ADD_TO_BASKET");

        let calls = engine.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "project123");
    }

    #[tokio::test]
    async fn test_query_failure_propagates() {
        let result = fetch_conversions(&FailingEngine, &table()).await;
        assert!(matches!(result, Err(ImportError::QueryExecution { .. })));
    }
}
