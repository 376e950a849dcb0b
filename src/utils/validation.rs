use crate::utils::error::{ImportError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ImportError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 確認 `${VAR}` 已被環境變數替換
pub fn validate_resolved(field_name: &str, value: &str) -> Result<()> {
    if value.contains("${") {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Unresolved environment variable placeholder".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("gcp.bigquery_endpoint", "https://example.com").is_ok());
        assert!(validate_url("gcp.bigquery_endpoint", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("gcp.bigquery_endpoint", "").is_err());
        assert!(validate_url("gcp.bigquery_endpoint", "invalid-url").is_err());
        assert!(validate_url("gcp.bigquery_endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("server.port", 8080, 1).is_ok());
        assert!(validate_positive_number("server.port", 0, 1).is_err());
    }

    #[test]
    fn test_validate_resolved() {
        assert!(validate_resolved("gcp.default_project_id", "my-project").is_ok());
        assert!(validate_resolved("gcp.default_project_id", "${GCP_PROJECT}").is_err());
    }

    #[test]
    fn test_validate_range_and_non_empty() {
        assert!(validate_range("gcp.query_timeout_ms", 10_000u64, 1, 600_000).is_ok());
        assert!(validate_range("gcp.query_timeout_ms", 0u64, 1, 600_000).is_err());

        assert!(validate_non_empty_string("server.host", "  ").is_err());
    }
}
