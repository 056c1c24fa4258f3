//! The persistence contract shared by both backends.

use async_trait::async_trait;
use leadsai_core::{CrmStatus, HistoryItem, Lead};
use serde::Serialize;

use crate::DbError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    Remote,
    Local,
}

impl std::fmt::Display for BackendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendMode::Remote => write!(f, "remote"),
            BackendMode::Local => write!(f, "local"),
        }
    }
}

/// Durable storage of leads and their append-only history.
///
/// History entries are never updated or deleted individually; the only way
/// to remove one is [`LeadStore::clear_all`].
#[async_trait]
pub trait LeadStore: Send + Sync {
    fn mode(&self) -> BackendMode;

    /// All leads, newest capture first, each with its history attached
    /// newest first. A lead without history rows comes back with an empty
    /// history.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::StoreUnavailable`] if the remote store cannot be
    /// queried. The local store never fails here.
    async fn fetch_all(&self) -> Result<Vec<Lead>, DbError>;

    /// One lead with its history, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if no lead has `lead_id`, or any error
    /// from [`LeadStore::fetch_all`].
    async fn fetch_one(&self, lead_id: &str) -> Result<Lead, DbError> {
        self.fetch_all()
            .await?
            .into_iter()
            .find(|l| l.id == lead_id)
            .ok_or_else(|| DbError::not_found(lead_id))
    }

    /// Persist a new lead and the history entries it carries.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::DuplicateId`] if the id is already stored; nothing
    /// is written in that case.
    async fn create(&self, lead: &Lead) -> Result<(), DbError>;

    /// Set the lead's status and append one `status_change` entry.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if no lead has `lead_id`; no entry is
    /// appended in that case.
    async fn update_status(&self, lead_id: &str, status: CrmStatus)
        -> Result<HistoryItem, DbError>;

    /// Append one `note` entry. Content is stored as given; blank notes are
    /// rejected by callers before they get here.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if no lead has `lead_id`.
    async fn add_note(
        &self,
        lead_id: &str,
        content: &str,
        author: Option<&str>,
    ) -> Result<HistoryItem, DbError>;

    /// Irrecoverably delete every lead and every history entry.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] or [`DbError::LocalIo`] if the backend
    /// cannot be written.
    async fn clear_all(&self) -> Result<(), DbError>;

    /// Verify the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns the backend's connection error if it cannot be reached.
    async fn health_check(&self) -> Result<(), DbError> {
        Ok(())
    }
}
