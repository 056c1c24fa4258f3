//! File-backed [`LeadStore`] used when no remote credentials are configured.
//!
//! Two flat JSON arrays live in the data directory: `leads.json` (lead
//! scalars, no history) and `history.json` (every entry, tagged with its
//! `lead_id`). Each file is replaced atomically via write-to-temp + rename.
//! A missing or unreadable file reads as an empty collection.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadsai_core::{AnalysisResult, CrmStatus, HistoryItem, Lead, MessageSource};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::store::{BackendMode, LeadStore};
use crate::DbError;

pub const LEADS_FILE: &str = "leads.json";
pub const HISTORY_FILE: &str = "history.json";

/// A lead as stored in `leads.json`: everything except the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LeadRecord {
    id: String,
    username: String,
    platform: MessageSource,
    message_text: String,
    timestamp: DateTime<Utc>,
    analysis: AnalysisResult,
    crm_status: CrmStatus,
    #[serde(default)]
    tags: Vec<String>,
}

impl From<&Lead> for LeadRecord {
    fn from(lead: &Lead) -> Self {
        Self {
            id: lead.id.clone(),
            username: lead.username.clone(),
            platform: lead.platform,
            message_text: lead.message_text.clone(),
            timestamp: lead.timestamp,
            analysis: lead.analysis.clone(),
            crm_status: lead.crm_status,
            tags: lead.tags.clone(),
        }
    }
}

impl LeadRecord {
    fn into_lead(self, history: Vec<HistoryItem>) -> Lead {
        Lead {
            id: self.id,
            username: self.username,
            platform: self.platform,
            message_text: self.message_text,
            timestamp: self.timestamp,
            analysis: self.analysis,
            crm_status: self.crm_status,
            tags: self.tags,
            history,
        }
    }
}

#[derive(Debug)]
pub struct LocalLeadStore {
    dir: PathBuf,
    leads_path: PathBuf,
    history_path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl LocalLeadStore {
    /// Store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            leads_path: dir.join(LEADS_FILE),
            history_path: dir.join(HISTORY_FILE),
            dir,
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn load_leads(&self) -> Vec<LeadRecord> {
        read_collection(&self.leads_path).await
    }

    async fn load_history(&self) -> Vec<HistoryItem> {
        read_collection(&self.history_path).await
    }

    async fn save_leads(&self, leads: &[LeadRecord]) -> Result<(), DbError> {
        self.write_collection(&self.leads_path, leads).await
    }

    async fn save_history(&self, history: &[HistoryItem]) -> Result<(), DbError> {
        self.write_collection(&self.history_path, history).await
    }

    async fn write_collection<T: Serialize>(&self, path: &Path, items: &[T]) -> Result<(), DbError> {
        let io_err = |source| DbError::LocalIo {
            path: path.display().to_string(),
            source,
        };

        let bytes = serde_json::to_vec_pretty(items).map_err(|source| DbError::LocalFormat {
            path: path.display().to_string(),
            source,
        })?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(io_err)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
        Ok(())
    }
}

/// Read a JSON array, falling back to empty when the file is absent or
/// cannot be parsed.
async fn read_collection<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "local store unreadable; treating as empty");
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "local store corrupt; treating as empty");
            Vec::new()
        }
    }
}

async fn remove_if_exists(path: &Path) -> Result<(), DbError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(DbError::LocalIo {
            path: path.display().to_string(),
            source,
        }),
    }
}

#[async_trait]
impl LeadStore for LocalLeadStore {
    fn mode(&self) -> BackendMode {
        BackendMode::Local
    }

    async fn fetch_all(&self) -> Result<Vec<Lead>, DbError> {
        let _guard = self.lock.lock().await;
        let records = self.load_leads().await;
        let history = self.load_history().await;

        // Walk newest-appended first so entries sharing a date come out in
        // reverse insertion order after the stable sort below.
        let mut by_lead: HashMap<String, Vec<HistoryItem>> = HashMap::new();
        for item in history.into_iter().rev() {
            by_lead.entry(item.lead_id.clone()).or_default().push(item);
        }

        let mut leads: Vec<Lead> = records
            .into_iter()
            .map(|record| {
                let history = by_lead.remove(&record.id).unwrap_or_default();
                let mut lead = record.into_lead(history);
                lead.sort_history_newest_first();
                lead
            })
            .collect();

        leadsai_core::sort_leads_newest_first(&mut leads);
        Ok(leads)
    }

    async fn create(&self, lead: &Lead) -> Result<(), DbError> {
        let _guard = self.lock.lock().await;
        let mut records = self.load_leads().await;

        if records.iter().any(|r| r.id == lead.id) {
            return Err(DbError::DuplicateId(lead.id.clone()));
        }

        records.push(LeadRecord::from(lead));
        self.save_leads(&records).await?;

        if !lead.history.is_empty() {
            let mut history = self.load_history().await;
            history.extend(lead.history.iter().map(|item| HistoryItem {
                lead_id: lead.id.clone(),
                ..item.clone()
            }));
            self.save_history(&history).await?;
        }

        tracing::debug!(lead_id = %lead.id, platform = %lead.platform, "lead created");
        Ok(())
    }

    async fn update_status(
        &self,
        lead_id: &str,
        status: CrmStatus,
    ) -> Result<HistoryItem, DbError> {
        let _guard = self.lock.lock().await;
        let mut records = self.load_leads().await;

        let record = records
            .iter_mut()
            .find(|r| r.id == lead_id)
            .ok_or_else(|| DbError::not_found(lead_id))?;

        let item = HistoryItem::status_changed(
            Uuid::new_v4().to_string(),
            lead_id.to_string(),
            Utc::now(),
            status,
        );

        // History first; a failed leads write removes the entry again.
        let mut history = self.load_history().await;
        history.push(item.clone());
        self.save_history(&history).await?;

        record.crm_status = status;
        if let Err(e) = self.save_leads(&records).await {
            history.pop();
            if let Err(rollback) = self.save_history(&history).await {
                tracing::error!(lead_id, error = %rollback, "failed to roll back status_change entry");
            }
            return Err(e);
        }

        tracing::debug!(lead_id, status = %status, "lead status updated");
        Ok(item)
    }

    async fn add_note(
        &self,
        lead_id: &str,
        content: &str,
        author: Option<&str>,
    ) -> Result<HistoryItem, DbError> {
        let _guard = self.lock.lock().await;

        if !self.load_leads().await.iter().any(|r| r.id == lead_id) {
            return Err(DbError::not_found(lead_id));
        }

        let item = HistoryItem::note(
            Uuid::new_v4().to_string(),
            lead_id.to_string(),
            Utc::now(),
            content.to_string(),
            author.map(ToOwned::to_owned),
        );
        let mut history = self.load_history().await;
        history.push(item.clone());
        self.save_history(&history).await?;

        tracing::debug!(lead_id, "note added");
        Ok(item)
    }

    async fn clear_all(&self) -> Result<(), DbError> {
        let _guard = self.lock.lock().await;
        remove_if_exists(&self.history_path).await?;
        remove_if_exists(&self.leads_path).await?;
        tracing::info!(dir = %self.dir.display(), "cleared all local lead data");
        Ok(())
    }
}

#[cfg(test)]
#[path = "local_test.rs"]
mod tests;
