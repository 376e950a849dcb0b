use crate::domain::model::{ConversionRow, OutputRow};
use crate::utils::error::{ImportError, Result};
use std::collections::HashMap;

pub fn transform_row(row: ConversionRow, conversion_map: &HashMap<String, String>) -> Result<OutputRow> {
    let conversion_label = conversion_map
        .get(&row.conversion_type)
        .cloned()
        .ok_or_else(|| ImportError::KeyLookup {
            code: row.conversion_type.clone(),
        })?;

    Ok(OutputRow {
        conversion_value: row.conversion_value.to_f64()?,
        gcl_id: row.gcl_id,
        conversion_label,
        conversion_date_time: row.conversion_date_time,
    })
}

/// Maps every source row to an output row, preserving order. The first
/// failing row aborts the whole set.
pub fn transform_rows<I>(rows: I, conversion_map: &HashMap<String, String>) -> Result<Vec<OutputRow>>
where
    I: IntoIterator<Item = Result<ConversionRow>>,
{
    tracing::info!("- Parse rows and output.");

    let output = rows
        .into_iter()
        .map(|row| row.and_then(|row| transform_row(row, conversion_map)))
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(rows = ?output, "Transformed {} conversion rows", output.len());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::DecimalValue;

    fn conversion_map() -> HashMap<String, String> {
        HashMap::from([
            ("PURCHASE".to_string(), "Revenue".to_string()),
            ("ADD_TO_BASKET".to_string(), "Add to basket".to_string()),
        ])
    }

    fn row(id: &str, code: &str, value: DecimalValue) -> Result<ConversionRow> {
        Ok(ConversionRow {
            gcl_id: id.to_string(),
            conversion_date_time: "2023-01-01T10:00:00+0000".to_string(),
            conversion_value: value,
            conversion_type: code.to_string(),
        })
    }

    #[test]
    fn test_transform_preserves_order() {
        let rows = vec![
            row("c", "PURCHASE", DecimalValue::Text("3".to_string())),
            row("a", "ADD_TO_BASKET", DecimalValue::Text("1".to_string())),
            row("b", "PURCHASE", DecimalValue::Text("2".to_string())),
        ];

        let output = transform_rows(rows, &conversion_map()).unwrap();

        let ids: Vec<&str> = output.iter().map(|r| r.gcl_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(output[1].conversion_label, "Add to basket");
        assert_eq!(output[2].conversion_label, "Revenue");
    }

    #[test]
    fn test_numeric_conversion() {
        let rows = vec![
            row("a", "PURCHASE", DecimalValue::Text("12.5".to_string())),
            row("b", "PURCHASE", DecimalValue::Number(12.into())),
        ];

        let output = transform_rows(rows, &conversion_map()).unwrap();
        assert_eq!(output[0].conversion_value, 12.5);
        assert_eq!(output[1].conversion_value, 12.0);
    }

    #[test]
    fn test_unmapped_code_is_lookup_failure() {
        let rows = vec![
            row("a", "PURCHASE", DecimalValue::Text("1".to_string())),
            row("b", "REFUND", DecimalValue::Text("1".to_string())),
        ];

        match transform_rows(rows, &conversion_map()) {
            Err(ImportError::KeyLookup { code }) => assert_eq!(code, "REFUND"),
            other => panic!("expected KeyLookup, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_value_fails() {
        let rows = vec![row("a", "PURCHASE", DecimalValue::Text("n/a".to_string()))];
        assert!(matches!(
            transform_rows(rows, &conversion_map()),
            Err(ImportError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        let output = transform_rows(Vec::new(), &conversion_map()).unwrap();
        assert!(output.is_empty());
    }
}
