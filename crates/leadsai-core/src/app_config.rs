use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Serialize;

use crate::IntegrationSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Remote store connection URL. Blank values are normalised to `None`.
    pub database_url: Option<String>,
    /// Remote store access credential. Blank values are normalised to `None`.
    pub database_key: Option<String>,
    /// Directory holding the local store files.
    pub data_dir: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    /// `0` disables the classifier request timeout.
    pub classifier_timeout_secs: u64,
    pub integrations: IntegrationSettings,
}

impl AppConfig {
    /// `true` when both the remote URL and the access credential are present.
    #[must_use]
    pub fn has_remote_credentials(&self) -> bool {
        self.database_url.is_some() && self.database_key.is_some()
    }

    #[must_use]
    pub fn backend_debug_info(&self) -> BackendDebugInfo {
        BackendDebugInfo {
            url_configured: self.database_url.is_some(),
            key_configured: self.database_key.is_some(),
            url_preview: preview(self.database_url.as_deref(), 12),
            key_preview: preview(self.database_key.as_deref(), 6),
            using_local_mode: !self.has_remote_credentials(),
        }
    }
}

/// What an operator needs to diagnose backend selection without exposing
/// the credentials themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendDebugInfo {
    pub url_configured: bool,
    pub key_configured: bool,
    pub url_preview: String,
    pub key_preview: String,
    pub using_local_mode: bool,
}

fn preview(value: Option<&str>, keep: usize) -> String {
    match value {
        Some(v) => format!("{}...", v.chars().take(keep).collect::<String>()),
        None => "Not Set".to_string(),
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "database_key",
                &self.database_key.as_ref().map(|_| "[redacted]"),
            )
            .field("data_dir", &self.data_dir)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("classifier_timeout_secs", &self.classifier_timeout_secs)
            .field("integrations", &self.integrations)
            .finish()
    }
}
