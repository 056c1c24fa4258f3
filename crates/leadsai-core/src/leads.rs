use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AnalysisResult, CoreError};

/// Social channel a message was captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageSource {
    #[serde(rename = "Instagram DM")]
    InstagramDm,
    #[serde(rename = "Instagram Comment")]
    InstagramComment,
    #[serde(rename = "Facebook Messenger")]
    FacebookMessenger,
    #[serde(rename = "LinkedIn Message")]
    LinkedInMessage,
    #[serde(rename = "YouTube Comment")]
    YouTubeComment,
}

impl MessageSource {
    pub const ALL: [MessageSource; 5] = [
        MessageSource::InstagramDm,
        MessageSource::InstagramComment,
        MessageSource::FacebookMessenger,
        MessageSource::LinkedInMessage,
        MessageSource::YouTubeComment,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            MessageSource::InstagramDm => "Instagram DM",
            MessageSource::InstagramComment => "Instagram Comment",
            MessageSource::FacebookMessenger => "Facebook Messenger",
            MessageSource::LinkedInMessage => "LinkedIn Message",
            MessageSource::YouTubeComment => "YouTube Comment",
        }
    }

    /// Kebab-case identifier used on the command line, e.g. `linkedin-message`.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            MessageSource::InstagramDm => "instagram-dm",
            MessageSource::InstagramComment => "instagram-comment",
            MessageSource::FacebookMessenger => "facebook-messenger",
            MessageSource::LinkedInMessage => "linkedin-message",
            MessageSource::YouTubeComment => "youtube-comment",
        }
    }
}

impl std::fmt::Display for MessageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MessageSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_token(s);
        MessageSource::ALL
            .into_iter()
            .find(|source| {
                normalize_token(source.label()) == wanted || source.slug() == wanted
            })
            .ok_or_else(|| CoreError::UnknownVariant {
                kind: "platform",
                value: s.to_string(),
            })
    }
}

/// CRM pipeline status. The only mutable part of a lead besides tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrmStatus {
    New,
    Contacted,
    #[serde(rename = "Follow-Up")]
    FollowUp,
    Qualified,
    Converted,
    Lost,
}

impl CrmStatus {
    pub const ALL: [CrmStatus; 6] = [
        CrmStatus::New,
        CrmStatus::Contacted,
        CrmStatus::FollowUp,
        CrmStatus::Qualified,
        CrmStatus::Converted,
        CrmStatus::Lost,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CrmStatus::New => "New",
            CrmStatus::Contacted => "Contacted",
            CrmStatus::FollowUp => "Follow-Up",
            CrmStatus::Qualified => "Qualified",
            CrmStatus::Converted => "Converted",
            CrmStatus::Lost => "Lost",
        }
    }
}

impl std::fmt::Display for CrmStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CrmStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_token(s);
        CrmStatus::ALL
            .into_iter()
            .find(|status| normalize_token(status.label()) == wanted)
            .ok_or_else(|| CoreError::UnknownVariant {
                kind: "status",
                value: s.to_string(),
            })
    }
}

/// Lowercase, with spaces and underscores folded into hyphens.
fn normalize_token(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            ' ' | '_' => '-',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryType {
    System,
    StatusChange,
    Note,
}

impl HistoryType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HistoryType::System => "system",
            HistoryType::StatusChange => "status_change",
            HistoryType::Note => "note",
        }
    }
}

impl std::fmt::Display for HistoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(HistoryType::System),
            "status_change" => Ok(HistoryType::StatusChange),
            "note" => Ok(HistoryType::Note),
            other => Err(CoreError::UnknownVariant {
                kind: "history type",
                value: other.to_string(),
            }),
        }
    }
}

/// One entry in a lead's activity trail. Entries are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub lead_id: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: HistoryType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl HistoryItem {
    /// The `system` entry seeded when a lead is captured.
    #[must_use]
    pub fn captured(id: String, lead_id: String, date: DateTime<Utc>, platform: MessageSource) -> Self {
        Self {
            id,
            lead_id,
            date,
            kind: HistoryType::System,
            content: format!("Lead captured via {platform}"),
            author: None,
        }
    }

    /// The `status_change` entry appended on every status mutation.
    #[must_use]
    pub fn status_changed(
        id: String,
        lead_id: String,
        date: DateTime<Utc>,
        status: CrmStatus,
    ) -> Self {
        Self {
            id,
            lead_id,
            date,
            kind: HistoryType::StatusChange,
            content: format!("Status updated to {status}"),
            author: None,
        }
    }

    #[must_use]
    pub fn note(
        id: String,
        lead_id: String,
        date: DateTime<Utc>,
        content: String,
        author: Option<String>,
    ) -> Self {
        Self {
            id,
            lead_id,
            date,
            kind: HistoryType::Note,
            content,
            author,
        }
    }
}

/// A captured inbound message plus its classification, CRM status, and
/// activity trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub username: String,
    pub platform: MessageSource,
    pub message_text: String,
    pub timestamp: DateTime<Utc>,
    /// Fixed at creation; never recomputed.
    pub analysis: AnalysisResult,
    pub crm_status: CrmStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Newest first whenever the lead comes out of a store.
    #[serde(default)]
    pub history: Vec<HistoryItem>,
}

impl Lead {
    /// Order the history newest-first. The sort is stable, so entries sharing
    /// a date keep their relative order.
    pub fn sort_history_newest_first(&mut self) {
        self.history.sort_by(|a, b| b.date.cmp(&a.date));
    }
}

/// Order leads by capture time, newest first; ties fall back to id descending.
pub fn sort_leads_newest_first(leads: &mut [Lead]) {
    leads.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
}

/// Reject a simulated message that is blank after trimming.
///
/// # Errors
///
/// Returns [`CoreError::EmptyText`] when `text` is empty or whitespace-only.
pub fn validate_message(text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::EmptyText {
            field: "message_text",
        });
    }
    Ok(())
}

/// Reject a note that is blank after trimming. Callers check this before
/// reaching the store; the store itself accepts any content.
///
/// # Errors
///
/// Returns [`CoreError::EmptyText`] when `content` is empty or whitespace-only.
pub fn validate_note(content: &str) -> Result<(), CoreError> {
    if content.trim().is_empty() {
        return Err(CoreError::EmptyText { field: "note" });
    }
    Ok(())
}

#[cfg(test)]
#[path = "leads_test.rs"]
mod tests;
