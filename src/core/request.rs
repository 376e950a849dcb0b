use crate::domain::model::ImportRequest;
use crate::utils::error::{ImportError, Result};
use serde_json::{Map, Value};

pub const REQUIRED_KEYS: [&str; 5] = [
    "gcp_dataset_id",
    "gcp_table_name",
    "google_sheet_id",
    "google_sheet_range",
    "conversion_map",
];

/// Validates a raw request body. Undecodable or non-object bodies are
/// treated as payloads with no keys.
pub fn validate_payload(body: &[u8]) -> Result<ImportRequest> {
    let payload = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => Map::new(),
    };

    validate_object(payload)
}

pub fn validate_object(payload: Map<String, Value>) -> Result<ImportRequest> {
    tracing::info!("Checking payload is as expected.");

    // null 值視同缺少
    let mut payload_keys: Vec<String> = payload
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, _)| key.clone())
        .collect();
    payload_keys.sort();
    let mut expected_keys: Vec<String> = REQUIRED_KEYS.iter().map(|k| k.to_string()).collect();
    expected_keys.sort();

    let complete = REQUIRED_KEYS
        .iter()
        .all(|key| payload_keys.iter().any(|k| k == key));

    if !complete {
        tracing::error!(
            ?payload_keys,
            ?expected_keys,
            "Payload keys do not match the expected keys."
        );
        return Err(ImportError::bad_request(
            "The payload keys do not match the expected keys.",
            payload_keys,
            expected_keys,
        ));
    }

    serde_json::from_value::<ImportRequest>(Value::Object(payload)).map_err(|e| {
        tracing::error!("Payload values could not be decoded: {}", e);
        ImportError::bad_request(
            format!("The payload values could not be decoded: {}", e),
            payload_keys,
            expected_keys,
        )
    })
}
