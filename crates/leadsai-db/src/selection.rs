//! One-time backend choice, resolved from configuration at startup.

use std::path::PathBuf;
use std::sync::Arc;

use leadsai_core::AppConfig;

use crate::store::{BackendMode, LeadStore};
use crate::{DbError, LocalLeadStore, PgLeadStore, PoolConfig};

/// The backend a process will use. Decided once; never switched at runtime.
#[derive(Clone, PartialEq, Eq)]
pub enum BackendSelection {
    Remote {
        database_url: String,
        database_key: String,
        pool: PoolConfig,
    },
    Local {
        data_dir: PathBuf,
    },
}

impl std::fmt::Debug for BackendSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote { pool, .. } => f
                .debug_struct("Remote")
                .field("database_url", &"[redacted]")
                .field("database_key", &"[redacted]")
                .field("pool", pool)
                .finish(),
            Self::Local { data_dir } => {
                f.debug_struct("Local").field("data_dir", data_dir).finish()
            }
        }
    }
}

impl BackendSelection {
    /// Remote iff both the database URL and key are set; local otherwise.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        match (&config.database_url, &config.database_key) {
            (Some(url), Some(key)) => Self::Remote {
                database_url: url.clone(),
                database_key: key.clone(),
                pool: PoolConfig::from_app_config(config),
            },
            _ => Self::Local {
                data_dir: config.data_dir.clone(),
            },
        }
    }

    #[must_use]
    pub fn mode(&self) -> BackendMode {
        match self {
            Self::Remote { .. } => BackendMode::Remote,
            Self::Local { .. } => BackendMode::Local,
        }
    }
}

/// Open the selected store. The remote path connects and applies pending
/// migrations before returning.
///
/// # Errors
///
/// Returns [`DbError::StoreUnavailable`] if the remote store cannot be
/// reached, or [`DbError::Migration`] if migrations fail. Opening the local
/// store never fails.
pub async fn open_store(selection: &BackendSelection) -> Result<Arc<dyn LeadStore>, DbError> {
    match selection {
        BackendSelection::Remote {
            database_url,
            database_key,
            pool,
        } => {
            let pg = crate::connect_pool(database_url, database_key, *pool)
                .await
                .map_err(DbError::StoreUnavailable)?;
            let applied = crate::run_migrations(&pg).await?;
            tracing::info!(
                backend = %BackendMode::Remote,
                migrations_applied = applied,
                "lead store connected"
            );
            Ok(Arc::new(PgLeadStore::new(pg)))
        }
        BackendSelection::Local { data_dir } => {
            tracing::warn!(
                backend = %BackendMode::Local,
                data_dir = %data_dir.display(),
                "remote store credentials not set; leads are kept in local files only"
            );
            Ok(Arc::new(LocalLeadStore::new(data_dir.clone())))
        }
    }
}
