#[cfg(feature = "cli")]
pub mod cli;

use crate::adapters::auth::DEFAULT_METADATA_ENDPOINT;
use crate::adapters::bigquery::DEFAULT_BIGQUERY_ENDPOINT;
use crate::adapters::sheets::DEFAULT_SHEETS_ENDPOINT;
use crate::utils::error::{ImportError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gcp: GcpConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcpConfig {
    /// Project queried when a request carries no `gcp_project_id`.
    pub default_project_id: Option<String>,
    #[serde(default = "default_bigquery_endpoint")]
    pub bigquery_endpoint: String,
    #[serde(default = "default_sheets_endpoint")]
    pub sheets_endpoint: String,
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Fixed bearer token; when unset the metadata server is used.
    pub access_token: Option<String>,
    #[serde(default = "default_metadata_endpoint")]
    pub metadata_endpoint: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_bigquery_endpoint() -> String {
    DEFAULT_BIGQUERY_ENDPOINT.to_string()
}

fn default_sheets_endpoint() -> String {
    DEFAULT_SHEETS_ENDPOINT.to_string()
}

fn default_query_timeout_ms() -> u64 {
    10_000
}

fn default_metadata_endpoint() -> String {
    DEFAULT_METADATA_ENDPOINT.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for GcpConfig {
    fn default() -> Self {
        Self {
            default_project_id: None,
            bigquery_endpoint: default_bigquery_endpoint(),
            sheets_endpoint: default_sheets_endpoint(),
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            metadata_endpoint: default_metadata_endpoint(),
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ImportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let config: Self =
            toml::from_str(&processed_content).map_err(|e| ImportError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            })?;
        Ok(config.normalized())
    }

    /// 只從環境變數建立配置 (託管環境沒有設定檔時)
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = env::var("HOST") {
            config.server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            config.server.port = port.parse().map_err(|_| ImportError::InvalidConfigValueError {
                field: "PORT".to_string(),
                value: port.clone(),
                reason: "Port must be a number between 1 and 65535".to_string(),
            })?;
        }

        config.gcp.default_project_id = env::var("GCP_PROJECT").ok();
        if let Ok(endpoint) = env::var("BIGQUERY_ENDPOINT") {
            config.gcp.bigquery_endpoint = endpoint;
        }
        if let Ok(endpoint) = env::var("SHEETS_ENDPOINT") {
            config.gcp.sheets_endpoint = endpoint;
        }
        if let Ok(timeout) = env::var("QUERY_TIMEOUT_MS") {
            config.gcp.query_timeout_ms =
                timeout
                    .parse()
                    .map_err(|_| ImportError::InvalidConfigValueError {
                        field: "QUERY_TIMEOUT_MS".to_string(),
                        value: timeout.clone(),
                        reason: "Timeout must be a whole number of milliseconds".to_string(),
                    })?;
        }

        config.auth.access_token = env::var("GOOGLE_OAUTH_ACCESS_TOKEN").ok();
        if let Ok(endpoint) = env::var("METADATA_ENDPOINT") {
            config.auth.metadata_endpoint = endpoint;
        }

        Ok(config.normalized())
    }

    /// 替換環境變數 (例如 ${GCP_PROJECT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ImportError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 空字串的選填欄位視為未設定
    fn normalized(mut self) -> Self {
        fn blank_to_none(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        self.gcp.default_project_id = blank_to_none(self.gcp.default_project_id);
        self.auth.access_token = blank_to_none(self.auth.access_token);
        self
    }

    pub fn socket_addr(&self) -> String {
        // IPv6 位址需加上中括號
        if self.server.host.contains(':') && !self.server.host.starts_with('[') {
            format!("[{}]:{}", self.server.host, self.server.port)
        } else {
            format!("{}:{}", self.server.host, self.server.port)
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("server.host", &self.server.host)?;
        validation::validate_resolved("server.host", &self.server.host)?;
        validation::validate_positive_number("server.port", u64::from(self.server.port), 1)?;

        validation::validate_url("gcp.bigquery_endpoint", &self.gcp.bigquery_endpoint)?;
        validation::validate_url("gcp.sheets_endpoint", &self.gcp.sheets_endpoint)?;
        validation::validate_range("gcp.query_timeout_ms", self.gcp.query_timeout_ms, 1, 600_000)?;
        validation::validate_url("auth.metadata_endpoint", &self.auth.metadata_endpoint)?;

        if let Some(project) = &self.gcp.default_project_id {
            validation::validate_resolved("gcp.default_project_id", project)?;
        }
        if let Some(token) = &self.auth.access_token {
            validation::validate_resolved("auth.access_token", token)?;
        }

        if self.gcp.default_project_id.is_none() {
            tracing::warn!(
                "No default project configured; requests must carry gcp_project_id"
            );
        }

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }
}
