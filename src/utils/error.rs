use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Bad request: {message}")]
    BadRequest {
        message: String,
        payload_keys: Vec<String>,
        expected_keys: Vec<String>,
    },

    #[error("Query execution failed: {message}")]
    QueryExecution { message: String },

    #[error("Range access failed for '{range}': {message}")]
    RangeAccess { range: String, message: String },

    #[error("Quota exceeded: {message}")]
    QuotaExceeded { message: String },

    #[error("Conversion type '{code}' is not present in the conversion map")]
    KeyLookup { code: String },

    #[error("Invalid value for {field} '{value}': {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Row decode error: {message}")]
    RowDecode { message: String },

    #[error("Authentication error: {message}")]
    AuthError { message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} '{value}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// 錯誤分類：只有 Validation 會回傳結構化的 400
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Downstream,
    Configuration,
}

impl ImportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ImportError::BadRequest { .. } => ErrorCategory::Validation,
            ImportError::ConfigError { .. }
            | ImportError::MissingConfigError { .. }
            | ImportError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            _ => ErrorCategory::Downstream,
        }
    }

    pub fn bad_request(
        message: impl Into<String>,
        payload_keys: Vec<String>,
        expected_keys: Vec<String>,
    ) -> Self {
        ImportError::BadRequest {
            message: message.into(),
            payload_keys,
            expected_keys,
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
