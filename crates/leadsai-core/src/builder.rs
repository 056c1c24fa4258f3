//! Assembles a new [`Lead`] from a raw message and its classification.
//!
//! Pure construction: no store or network access. Ids are UUID v4 strings so
//! two leads captured in the same millisecond never collide.

use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::{AnalysisResult, CrmStatus, HistoryItem, Lead, MessageSource};

/// Build a lead captured now, with a fresh id and a placeholder username.
#[must_use]
pub fn build_lead(message_text: &str, platform: MessageSource, analysis: AnalysisResult) -> Lead {
    build_lead_at(
        message_text,
        platform,
        analysis,
        Utc::now(),
        synthesize_username(),
    )
}

/// Build a lead with an explicit capture instant and username.
///
/// The lead and its seed `system` entry share `captured_at`.
#[must_use]
pub fn build_lead_at(
    message_text: &str,
    platform: MessageSource,
    analysis: AnalysisResult,
    captured_at: DateTime<Utc>,
    username: String,
) -> Lead {
    let id = Uuid::new_v4().to_string();
    let seed = HistoryItem::captured(Uuid::new_v4().to_string(), id.clone(), captured_at, platform);

    Lead {
        id,
        username,
        platform,
        message_text: message_text.to_string(),
        timestamp: captured_at,
        analysis,
        crm_status: CrmStatus::New,
        tags: Vec::new(),
        history: vec![seed],
    }
}

/// Human-readable placeholder, `user_0` through `user_999`. Not tied to any
/// real identity.
#[must_use]
pub fn synthesize_username() -> String {
    let n: u16 = rand::rng().random_range(0..1000);
    format!("user_{n}")
}
