//! Surface-facing workflows: capture a simulated message as a lead, and
//! attach a note to an existing lead.

use leadsai_core::{build_lead, validate_message, validate_note, HistoryItem, Lead, MessageSource};
use leadsai_db::LeadStore;

use crate::{analyze_message, CaptureError, MessageClassifier};

/// Validate, classify, build, and persist one lead.
///
/// Classification failures do not fail the capture; the lead is stored with
/// the sentinel analysis. The returned lead is the one that was written.
///
/// # Errors
///
/// Returns [`CaptureError::Validation`] for blank text (no classifier or
/// store call is made), or [`CaptureError::Store`] if the create fails.
pub async fn capture_lead(
    store: &dyn LeadStore,
    classifier: &dyn MessageClassifier,
    text: &str,
    platform: MessageSource,
) -> Result<Lead, CaptureError> {
    validate_message(text)?;

    let analysis = analyze_message(classifier, text, platform).await;
    let lead = build_lead(text, platform, analysis);
    store.create(&lead).await?;

    tracing::info!(
        lead_id = %lead.id,
        platform = %lead.platform,
        category = %lead.analysis.category,
        score = lead.analysis.score,
        "lead captured"
    );
    Ok(lead)
}

/// Append a note to a lead after rejecting blank content.
///
/// # Errors
///
/// Returns [`CaptureError::Validation`] for blank content (no store call is
/// made), or [`CaptureError::Store`] if the lead does not exist.
pub async fn record_note(
    store: &dyn LeadStore,
    lead_id: &str,
    content: &str,
    author: Option<&str>,
) -> Result<HistoryItem, CaptureError> {
    validate_note(content)?;
    let item = store.add_note(lead_id, content, author).await?;
    Ok(item)
}
