use serde::Deserialize;

use crate::helpers::time::SAFETY_MARGIN_SECONDS_DEFAULT;

/// ================================
/// Service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub token: TokenConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

/// ================================
/// BQE Core endpoints
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_clients_page_size")]
    pub clients_page_size: u32,
    #[serde(default = "default_projects_page_size")]
    pub projects_page_size: u32,
    /// page size used when walking a whole collection
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            token_url: default_token_url(),
            clients_page_size: default_clients_page_size(),
            projects_page_size: default_projects_page_size(),
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TokenConfig {
    #[serde(default = "default_token_path")]
    pub path: String,
    #[serde(default = "default_safety_margin_seconds")]
    pub safety_margin_seconds: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self { path: default_token_path(), safety_margin_seconds: default_safety_margin_seconds() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_path")]
    pub path: String,
    #[serde(default)]
    pub is_enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { path: default_metrics_path(), is_enabled: false }
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), format: LogFormat::Compact }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_api_base() -> String {
    "https://api.bqecore.com/api".to_string()
}

fn default_token_url() -> String {
    "https://api-identity.bqecore.com/idp/connect/token".to_string()
}

fn default_clients_page_size() -> u32 {
    50
}

fn default_projects_page_size() -> u32 {
    100
}

fn default_page_size() -> u32 {
    100
}

fn default_token_path() -> String {
    "bqe_token.json".to_string()
}

fn default_safety_margin_seconds() -> u64 {
    SAFETY_MARGIN_SECONDS_DEFAULT
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}
