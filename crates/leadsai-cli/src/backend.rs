//! Backend inspection and remote database maintenance.

use std::fmt::Write as _;

use anyhow::bail;
use leadsai_core::AppConfig;
use leadsai_db::{BackendSelection, PoolConfig};

/// Connection diagnostics without revealing credentials.
pub(crate) fn run_backend(config: &AppConfig) -> String {
    let info = config.backend_debug_info();
    let mode = BackendSelection::from_app_config(config).mode();

    let mut out = String::new();
    let _ = writeln!(out, "Backend:        {mode}");
    let _ = writeln!(out, "Database URL:   {}", info.url_preview);
    let _ = writeln!(out, "Database key:   {}", info.key_preview);
    if info.using_local_mode {
        let _ = writeln!(out, "Data directory: {}", config.data_dir.display());
        let _ = writeln!(
            out,
            "note: leads stay on this machine; set LEADSAI_DATABASE_URL and LEADSAI_DATABASE_KEY to use the remote store"
        );
    }
    let classifier = if config.gemini_api_key.is_some() {
        format!("gemini ({})", config.gemini_model)
    } else {
        "sentinel (GEMINI_API_KEY not set)".to_string()
    };
    let _ = writeln!(out, "Classifier:     {classifier}");
    for (name, platform) in config.integrations.iter() {
        let state = match (platform.enabled, platform.looks_connected()) {
            (true, true) => "enabled",
            (true, false) => "enabled, missing access token",
            (false, _) => "disabled",
        };
        let _ = writeln!(out, "{:<16}{state}", format!("{name}:"));
    }
    out
}

fn remote_parts(selection: &BackendSelection) -> anyhow::Result<(&str, &str, PoolConfig)> {
    match selection {
        BackendSelection::Remote {
            database_url,
            database_key,
            pool,
        } => Ok((database_url, database_key, *pool)),
        BackendSelection::Local { .. } => bail!(
            "database commands need LEADSAI_DATABASE_URL and LEADSAI_DATABASE_KEY; the local store has no database"
        ),
    }
}

/// # Errors
///
/// Returns an error if no remote store is configured or it cannot be reached.
pub(crate) async fn run_db_ping(selection: &BackendSelection) -> anyhow::Result<()> {
    let (url, key, pool_config) = remote_parts(selection)?;
    let pool = leadsai_db::connect_pool(url, key, pool_config).await?;
    leadsai_db::ping(&pool).await?;
    println!("database connection ok");
    Ok(())
}

/// # Errors
///
/// Returns an error if no remote store is configured, it cannot be reached,
/// or a migration fails.
pub(crate) async fn run_db_migrate(selection: &BackendSelection) -> anyhow::Result<()> {
    let (url, key, pool_config) = remote_parts(selection)?;
    let pool = leadsai_db::connect_pool(url, key, pool_config).await?;
    let applied = leadsai_db::run_migrations(&pool).await?;
    println!("migrations applied: {applied}");
    Ok(())
}
