//! Behaviour every [`LeadStore`] backend must share. Each check takes a
//! freshly emptied store.

#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use leadsai_core::{
    build_lead_at, AnalysisResult, BuyingIntent, BuyingStage, CrmStatus, HistoryType, Lead,
    LeadCategory, MessageSource, RecommendedAction, Urgency,
};
use leadsai_db::{DbError, LeadStore};

pub fn hot_analysis() -> AnalysisResult {
    AnalysisResult {
        category: LeadCategory::Hot,
        intent: BuyingIntent::Explicit,
        urgency: Urgency::High,
        stage: BuyingStage::Decision,
        product_detected: "Enterprise plan".to_string(),
        recommended_action: RecommendedAction::SendPricing,
        score: 91,
        summary_notes: "Asked for enterprise pricing.".to_string(),
    }
}

pub fn lead_at(minutes: i64, username: &str) -> Lead {
    let base = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
    build_lead_at(
        "How much is the enterprise plan for 40 seats?",
        MessageSource::LinkedInMessage,
        hot_analysis(),
        base + Duration::minutes(minutes),
        username.to_string(),
    )
}

pub async fn create_then_fetch_round_trips(store: &dyn LeadStore) {
    let lead = lead_at(0, "user_42");
    store.create(&lead).await.expect("create failed");

    let leads = store.fetch_all().await.expect("fetch_all failed");
    assert_eq!(leads.len(), 1);
    let stored = &leads[0];
    assert_eq!(stored.id, lead.id);
    assert_eq!(stored.username, "user_42");
    assert_eq!(stored.platform, MessageSource::LinkedInMessage);
    assert_eq!(stored.timestamp, lead.timestamp);
    assert_eq!(stored.analysis, hot_analysis());
    assert_eq!(stored.crm_status, CrmStatus::New);
    assert_eq!(stored.history.len(), 1);
    assert_eq!(stored.history[0].kind, HistoryType::System);
    assert_eq!(stored.history[0].content, "Lead captured via LinkedIn Message");
    assert_eq!(stored.history[0].lead_id, lead.id);
}

pub async fn duplicate_create_is_rejected(store: &dyn LeadStore) {
    let lead = lead_at(0, "user_1");
    store.create(&lead).await.expect("first create failed");

    let result = store.create(&lead).await;
    assert!(
        matches!(result, Err(DbError::DuplicateId(_))),
        "expected DuplicateId, got: {result:?}"
    );
    let leads = store.fetch_all().await.expect("fetch_all failed");
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].history.len(), 1);
}

pub async fn leads_come_back_newest_first(store: &dyn LeadStore) {
    let first = lead_at(0, "user_1");
    let second = lead_at(10, "user_2");
    let third = lead_at(5, "user_3");
    for lead in [&first, &second, &third] {
        store.create(lead).await.expect("create failed");
    }

    let ids: Vec<String> = store
        .fetch_all()
        .await
        .expect("fetch_all failed")
        .into_iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(ids, vec![second.id, third.id, first.id]);
}

pub async fn status_change_appends_history(store: &dyn LeadStore) {
    let lead = lead_at(0, "user_1");
    store.create(&lead).await.expect("create failed");

    let item = store
        .update_status(&lead.id, CrmStatus::FollowUp)
        .await
        .expect("update_status failed");
    assert_eq!(item.kind, HistoryType::StatusChange);
    assert_eq!(item.content, "Status updated to Follow-Up");
    assert_eq!(item.lead_id, lead.id);

    let stored = store.fetch_one(&lead.id).await.expect("fetch_one failed");
    assert_eq!(stored.crm_status, CrmStatus::FollowUp);
    assert_eq!(stored.history.len(), 2);
    assert_eq!(stored.history[0].id, item.id, "newest entry comes first");
}

pub async fn notes_append_without_touching_status(store: &dyn LeadStore) {
    let lead = lead_at(0, "user_1");
    store.create(&lead).await.expect("create failed");

    store
        .add_note(&lead.id, "Prefers email", Some("sam"))
        .await
        .expect("add_note failed");
    store
        .add_note(&lead.id, "Budget approved", None)
        .await
        .expect("add_note failed");

    let stored = store.fetch_one(&lead.id).await.expect("fetch_one failed");
    assert_eq!(stored.crm_status, CrmStatus::New);
    let notes: Vec<&str> = stored
        .history
        .iter()
        .filter(|h| h.kind == HistoryType::Note)
        .map(|h| h.content.as_str())
        .collect();
    assert_eq!(notes, vec!["Budget approved", "Prefers email"]);
}

pub async fn unknown_lead_is_not_found(store: &dyn LeadStore) {
    let status = store.update_status("no-such-lead", CrmStatus::Lost).await;
    assert!(matches!(status, Err(DbError::NotFound { .. })), "{status:?}");

    let note = store.add_note("no-such-lead", "hi", None).await;
    assert!(matches!(note, Err(DbError::NotFound { .. })), "{note:?}");

    let one = store.fetch_one("no-such-lead").await;
    assert!(matches!(one, Err(DbError::NotFound { .. })), "{one:?}");
}

pub async fn clear_all_empties_both_collections(store: &dyn LeadStore) {
    let lead = lead_at(0, "user_1");
    store.create(&lead).await.expect("create failed");
    store
        .add_note(&lead.id, "to be wiped", None)
        .await
        .expect("add_note failed");

    store.clear_all().await.expect("clear_all failed");
    assert!(store.fetch_all().await.expect("fetch_all failed").is_empty());

    // The same id may be reused after a clear.
    store.create(&lead).await.expect("create after clear failed");
    let stored = store.fetch_one(&lead.id).await.expect("fetch_one failed");
    assert_eq!(stored.history.len(), 1);
}
