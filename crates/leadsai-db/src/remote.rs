//! Postgres-backed [`LeadStore`] over the `leads` and `history` tables.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadsai_core::{AnalysisResult, CrmStatus, HistoryItem, Lead, MessageSource};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::{BackendMode, LeadStore};
use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `leads` table. `platform` and `crm_status` hold the
/// display labels, e.g. `"LinkedIn Message"` and `"Follow-Up"`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LeadRow {
    pub id: String,
    pub username: String,
    pub platform: String,
    pub message_text: String,
    pub timestamp: DateTime<Utc>,
    pub crm_status: String,
    pub tags: Vec<String>,
    pub analysis: Json<AnalysisResult>,
}

/// A row from the `history` table. The `type` column is selected as `kind`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HistoryRow {
    pub id: String,
    pub lead_id: String,
    pub date: DateTime<Utc>,
    pub kind: String,
    pub content: String,
    pub author: Option<String>,
}

impl LeadRow {
    fn into_lead(self, history: Vec<HistoryItem>) -> Result<Lead, DbError> {
        let platform = self
            .platform
            .parse::<MessageSource>()
            .map_err(|e| DbError::InvalidRow(format!("lead {}: {e}", self.id)))?;
        let crm_status = self
            .crm_status
            .parse::<CrmStatus>()
            .map_err(|e| DbError::InvalidRow(format!("lead {}: {e}", self.id)))?;

        let mut lead = Lead {
            id: self.id,
            username: self.username,
            platform,
            message_text: self.message_text,
            timestamp: self.timestamp,
            analysis: self.analysis.0,
            crm_status,
            tags: self.tags,
            history,
        };
        lead.sort_history_newest_first();
        Ok(lead)
    }
}

impl TryFrom<HistoryRow> for HistoryItem {
    type Error = DbError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let kind = row
            .kind
            .parse()
            .map_err(|e| DbError::InvalidRow(format!("history {}: {e}", row.id)))?;
        Ok(HistoryItem {
            id: row.id,
            lead_id: row.lead_id,
            date: row.date,
            kind,
            content: row.content,
            author: row.author,
        })
    }
}

const LEAD_COLUMNS: &str =
    "id, username, platform, message_text, timestamp, crm_status, tags, analysis";
const HISTORY_COLUMNS: &str = "id, lead_id, date, \"type\" AS kind, content, author";

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert_history<'e, E>(executor: E, item: &HistoryItem) -> Result<(), sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO history (id, lead_id, date, \"type\", content, author) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(&item.id)
    .bind(&item.lead_id)
    .bind(item.date)
    .bind(item.kind.as_str())
    .bind(&item.content)
    .bind(item.author.as_deref())
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl LeadStore for PgLeadStore {
    fn mode(&self) -> BackendMode {
        BackendMode::Remote
    }

    async fn fetch_all(&self) -> Result<Vec<Lead>, DbError> {
        let lead_rows = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads ORDER BY timestamp DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::StoreUnavailable)?;

        let history_rows = sqlx::query_as::<_, HistoryRow>(&format!(
            "SELECT {HISTORY_COLUMNS} FROM history ORDER BY date DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::StoreUnavailable)?;

        let mut by_lead: HashMap<String, Vec<HistoryItem>> = HashMap::new();
        for row in history_rows {
            let item = HistoryItem::try_from(row)?;
            by_lead.entry(item.lead_id.clone()).or_default().push(item);
        }

        lead_rows
            .into_iter()
            .map(|row| {
                let history = by_lead.remove(&row.id).unwrap_or_default();
                row.into_lead(history)
            })
            .collect()
    }

    async fn fetch_one(&self, lead_id: &str) -> Result<Lead, DbError> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1"
        ))
        .bind(lead_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::StoreUnavailable)?
        .ok_or_else(|| DbError::not_found(lead_id))?;

        let history = sqlx::query_as::<_, HistoryRow>(&format!(
            "SELECT {HISTORY_COLUMNS} FROM history WHERE lead_id = $1 ORDER BY date DESC, id DESC"
        ))
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::StoreUnavailable)?
        .into_iter()
        .map(HistoryItem::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        row.into_lead(history)
    }

    async fn create(&self, lead: &Lead) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await.map_err(DbError::StoreUnavailable)?;

        let inserted = sqlx::query(
            "INSERT INTO leads \
                 (id, username, platform, message_text, timestamp, crm_status, tags, analysis) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&lead.id)
        .bind(&lead.username)
        .bind(lead.platform.label())
        .bind(&lead.message_text)
        .bind(lead.timestamp)
        .bind(lead.crm_status.label())
        .bind(&lead.tags)
        .bind(Json(&lead.analysis))
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DbError::DuplicateId(lead.id.clone()));
        }

        for item in &lead.history {
            // Entries always belong to the lead being created, whatever the
            // caller put in `lead_id`.
            let item = HistoryItem {
                lead_id: lead.id.clone(),
                ..item.clone()
            };
            insert_history(&mut *tx, &item).await?;
        }

        tx.commit().await?;
        tracing::debug!(lead_id = %lead.id, platform = %lead.platform, "lead created");
        Ok(())
    }

    async fn update_status(
        &self,
        lead_id: &str,
        status: CrmStatus,
    ) -> Result<HistoryItem, DbError> {
        let mut tx = self.pool.begin().await.map_err(DbError::StoreUnavailable)?;

        let updated = sqlx::query("UPDATE leads SET crm_status = $1 WHERE id = $2")
            .bind(status.label())
            .bind(lead_id)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DbError::not_found(lead_id));
        }

        let item = HistoryItem::status_changed(
            Uuid::new_v4().to_string(),
            lead_id.to_string(),
            Utc::now(),
            status,
        );
        insert_history(&mut *tx, &item).await?;
        tx.commit().await?;

        tracing::debug!(lead_id, status = %status, "lead status updated");
        Ok(item)
    }

    async fn add_note(
        &self,
        lead_id: &str,
        content: &str,
        author: Option<&str>,
    ) -> Result<HistoryItem, DbError> {
        let mut tx = self.pool.begin().await.map_err(DbError::StoreUnavailable)?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM leads WHERE id = $1)")
            .bind(lead_id)
            .fetch_one(&mut *tx)
            .await?;

        if !exists {
            tx.rollback().await?;
            return Err(DbError::not_found(lead_id));
        }

        let item = HistoryItem::note(
            Uuid::new_v4().to_string(),
            lead_id.to_string(),
            Utc::now(),
            content.to_string(),
            author.map(ToOwned::to_owned),
        );
        insert_history(&mut *tx, &item).await?;
        tx.commit().await?;

        tracing::debug!(lead_id, "note added");
        Ok(item)
    }

    async fn clear_all(&self) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await.map_err(DbError::StoreUnavailable)?;
        let history = sqlx::query("DELETE FROM history")
            .execute(&mut *tx)
            .await?;
        let leads = sqlx::query("DELETE FROM leads").execute(&mut *tx).await?;
        tx.commit().await?;

        tracing::info!(
            leads = leads.rows_affected(),
            history = history.rows_affected(),
            "cleared all lead data"
        );
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DbError> {
        crate::ping(&self.pool)
            .await
            .map_err(DbError::StoreUnavailable)
    }
}
