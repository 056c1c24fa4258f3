use std::net::SocketAddr;
use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::{ConfigError, IntegrationSettings, PlatformSettings};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Unset, empty, and whitespace-only values all count as absent.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("LEADSAI_ENV", "development"))?;

    let bind_raw = or_default("LEADSAI_BIND_ADDR", "0.0.0.0:3000");
    let bind_addr = bind_raw
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "LEADSAI_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;
    let log_level = or_default("LEADSAI_LOG_LEVEL", "info");

    let database_url = optional("LEADSAI_DATABASE_URL");
    let database_key = optional("LEADSAI_DATABASE_KEY");
    let data_dir = PathBuf::from(or_default("LEADSAI_DATA_DIR", "./.leadsai"));

    let db_max_connections = parse_u32("LEADSAI_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("LEADSAI_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("LEADSAI_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "LEADSAI_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        });
    }

    let gemini_api_key = optional("GEMINI_API_KEY");
    let gemini_model = or_default("LEADSAI_GEMINI_MODEL", DEFAULT_GEMINI_MODEL);
    let gemini_base_url = or_default("LEADSAI_GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL);
    let classifier_timeout_secs = parse_u64("LEADSAI_CLASSIFIER_TIMEOUT_SECS", "0")?;

    let platform = |name: &str| -> Result<PlatformSettings, ConfigError> {
        let var = |suffix: &str| format!("LEADSAI_{name}_{suffix}");
        let enabled_var = var("ENABLED");
        Ok(PlatformSettings {
            enabled: parse_bool(&enabled_var, &or_default(&enabled_var, "false"))?,
            app_id: or_default(&var("APP_ID"), ""),
            app_secret: or_default(&var("APP_SECRET"), ""),
            access_token: or_default(&var("ACCESS_TOKEN"), ""),
            webhook_token: optional(&var("WEBHOOK_TOKEN")),
            page_id: optional(&var("PAGE_ID")),
        })
    };

    let integrations = IntegrationSettings {
        instagram: platform("INSTAGRAM")?,
        facebook: platform("FACEBOOK")?,
        linkedin: platform("LINKEDIN")?,
        youtube: platform("YOUTUBE")?,
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        database_url,
        database_key,
        data_dir,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        gemini_api_key,
        gemini_model,
        gemini_base_url,
        classifier_timeout_secs,
        integrations,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LEADSAI_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
