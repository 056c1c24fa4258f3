use chrono::{Duration, TimeZone};
use leadsai_core::{build_lead_at, HistoryType};

use super::*;

fn sample_lead(username: &str, minutes: i64) -> Lead {
    let captured_at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes);
    build_lead_at(
        "Do you ship to Canada?",
        MessageSource::InstagramDm,
        AnalysisResult::sentinel(),
        captured_at,
        username.to_string(),
    )
}

#[tokio::test]
async fn missing_files_read_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalLeadStore::new(dir.path().join("never-created"));

    let leads = store.fetch_all().await.unwrap();
    assert!(leads.is_empty());
    assert!(!store.dir().exists(), "reads must not create the data dir");
}

#[tokio::test]
async fn corrupt_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(LEADS_FILE), "{not json").unwrap();
    std::fs::write(dir.path().join(HISTORY_FILE), "[1, 2").unwrap();
    let store = LocalLeadStore::new(dir.path());

    assert!(store.fetch_all().await.unwrap().is_empty());

    // A write after corruption replaces the garbage with a valid file.
    store.create(&sample_lead("user_1", 0)).await.unwrap();
    assert_eq!(store.fetch_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn create_splits_lead_and_history_across_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalLeadStore::new(dir.path());
    let lead = sample_lead("user_7", 0);

    store.create(&lead).await.unwrap();

    let leads_raw = std::fs::read_to_string(dir.path().join(LEADS_FILE)).unwrap();
    let history_raw = std::fs::read_to_string(dir.path().join(HISTORY_FILE)).unwrap();
    let leads_json: serde_json::Value = serde_json::from_str(&leads_raw).unwrap();
    let history_json: serde_json::Value = serde_json::from_str(&history_raw).unwrap();

    assert_eq!(leads_json.as_array().map(Vec::len), Some(1));
    assert!(
        leads_json[0].get("history").is_none(),
        "history must not be embedded in leads.json"
    );
    assert_eq!(history_json[0]["lead_id"], lead.id.as_str());
    assert_eq!(history_json[0]["type"], "system");
    assert!(!dir.path().join("leads.json.tmp").exists());
}

#[tokio::test]
async fn create_rejects_duplicate_id_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalLeadStore::new(dir.path());
    let lead = sample_lead("user_7", 0);
    store.create(&lead).await.unwrap();

    let result = store.create(&lead).await;
    assert!(
        matches!(result, Err(DbError::DuplicateId(ref id)) if *id == lead.id),
        "expected DuplicateId, got: {result:?}"
    );

    let leads = store.fetch_all().await.unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].history.len(), 1);
}

#[tokio::test]
async fn fetch_all_orders_leads_and_history_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalLeadStore::new(dir.path());
    let older = sample_lead("user_1", 0);
    let newer = sample_lead("user_2", 30);
    store.create(&older).await.unwrap();
    store.create(&newer).await.unwrap();

    store.add_note(&older.id, "first note", None).await.unwrap();
    store
        .update_status(&older.id, CrmStatus::Contacted)
        .await
        .unwrap();

    let leads = store.fetch_all().await.unwrap();
    assert_eq!(leads[0].id, newer.id);
    assert_eq!(leads[1].id, older.id);

    let kinds: Vec<HistoryType> = leads[1].history.iter().map(|h| h.kind).collect();
    assert_eq!(
        kinds,
        vec![HistoryType::StatusChange, HistoryType::Note, HistoryType::System]
    );
    assert_eq!(leads[1].crm_status, CrmStatus::Contacted);
}

#[tokio::test]
async fn update_status_appends_entry_even_when_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalLeadStore::new(dir.path());
    let lead = sample_lead("user_3", 0);
    store.create(&lead).await.unwrap();

    let first = store.update_status(&lead.id, CrmStatus::New).await.unwrap();
    let second = store.update_status(&lead.id, CrmStatus::New).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.content, "Status updated to New");

    let stored = store.fetch_one(&lead.id).await.unwrap();
    assert_eq!(stored.history.len(), 3);
}

#[tokio::test]
async fn failed_history_write_leaves_status_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalLeadStore::new(dir.path());
    let lead = sample_lead("user_5", 0);
    store.create(&lead).await.unwrap();

    // A directory where the temp file should go makes the history write fail.
    let blocker = dir.path().join("history.json.tmp");
    std::fs::create_dir(&blocker).unwrap();

    let err = store
        .update_status(&lead.id, CrmStatus::Converted)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::LocalIo { .. }), "got {err:?}");

    let stored = store.fetch_one(&lead.id).await.unwrap();
    assert_eq!(stored.crm_status, CrmStatus::New);
    let kinds: Vec<HistoryType> = stored.history.iter().map(|h| h.kind).collect();
    assert_eq!(kinds, vec![HistoryType::System]);

    std::fs::remove_dir(&blocker).unwrap();
    store
        .update_status(&lead.id, CrmStatus::Converted)
        .await
        .unwrap();
    let stored = store.fetch_one(&lead.id).await.unwrap();
    assert_eq!(stored.crm_status, CrmStatus::Converted);
    assert_eq!(stored.history.len(), 2);
}

#[tokio::test]
async fn mutations_on_unknown_lead_are_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalLeadStore::new(dir.path());
    store.create(&sample_lead("user_4", 0)).await.unwrap();

    let status = store.update_status("missing", CrmStatus::Lost).await;
    assert!(matches!(status, Err(DbError::NotFound { .. })));

    let note = store.add_note("missing", "hello", None).await;
    assert!(matches!(note, Err(DbError::NotFound { .. })));

    let one = store.fetch_one("missing").await;
    assert!(matches!(one, Err(DbError::NotFound { .. })));

    let leads = store.fetch_all().await.unwrap();
    assert_eq!(leads[0].history.len(), 1, "no entry may be appended");
}

#[tokio::test]
async fn add_note_keeps_author() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalLeadStore::new(dir.path());
    let lead = sample_lead("user_5", 0);
    store.create(&lead).await.unwrap();

    let item = store
        .add_note(&lead.id, "Called back, wants a demo", Some("dana"))
        .await
        .unwrap();
    assert_eq!(item.kind, HistoryType::Note);
    assert_eq!(item.author.as_deref(), Some("dana"));

    let stored = store.fetch_one(&lead.id).await.unwrap();
    assert_eq!(stored.history[0].author.as_deref(), Some("dana"));
}

#[tokio::test]
async fn clear_all_removes_everything_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalLeadStore::new(dir.path());
    store.create(&sample_lead("user_6", 0)).await.unwrap();

    store.clear_all().await.unwrap();
    assert!(store.fetch_all().await.unwrap().is_empty());
    assert!(!dir.path().join(LEADS_FILE).exists());
    assert!(!dir.path().join(HISTORY_FILE).exists());

    store.clear_all().await.unwrap();
}

#[tokio::test]
async fn concurrent_notes_are_all_kept() {
    let dir = tempfile::tempdir().unwrap();
    let store = std::sync::Arc::new(LocalLeadStore::new(dir.path()));
    let lead = sample_lead("user_8", 0);
    store.create(&lead).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..10 {
        let store = std::sync::Arc::clone(&store);
        let lead_id = lead.id.clone();
        handles.push(tokio::spawn(async move {
            store.add_note(&lead_id, &format!("note {i}"), None).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = store.fetch_one(&lead.id).await.unwrap();
    assert_eq!(stored.history.len(), 11);
}

#[tokio::test]
async fn mode_is_local() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalLeadStore::new(dir.path());
    assert_eq!(store.mode(), BackendMode::Local);
    assert!(store.health_check().await.is_ok());
}
